mod account;
mod amount;
mod config;
mod epoch;
mod error;

pub use account::AccountId;
pub use amount::Amount;
pub use config::PairConfig;
pub use epoch::{EpochId, EpochPhase};
pub use error::{Result, ValueError};
