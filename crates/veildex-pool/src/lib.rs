mod aggregate;
mod claims;
mod epoch;
mod error;
mod pair;
mod queue;
mod settlement;

pub use aggregate::{aggregate, AggregateFlow, FundedEpoch, FundedMint};
pub use claims::{ClaimLedger, ClaimTally};
pub use epoch::EpochClock;
pub use error::{PairError, Result};
pub use pair::{EncryptedPair, EpochOutcome, PairSnapshot, SettlementOutcome};
pub use queue::{BurnOrder, EpochOrders, MintOrder, OrderId, OrderKind, OrderQueue, SwapOrder};
pub use settlement::{mint_entitlement, settle_flows, StagedSettlement};
