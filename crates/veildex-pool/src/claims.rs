use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use veildex_fhe::{EncUint, FheEngine};
use veildex_types::{AccountId, EpochId};

use crate::queue::OrderKind;

/// Encrypted running totals of what has been paid out for one settled epoch
/// Checked against the epoch's settled aggregates so floor-division claims
/// can never overdraw the batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClaimTally {
    pub minted: EncUint,
    pub out0: EncUint,
    pub out1: EncUint,
    pub payout0: EncUint,
    pub payout1: EncUint,
}

impl ClaimTally {
    fn new(fhe: &mut dyn FheEngine) -> Self {
        ClaimTally {
            minted: fhe.zero(),
            out0: fhe.zero(),
            out1: fhe.zero(),
            payout0: fhe.zero(),
            payout1: fhe.zero(),
        }
    }
}

/// Sole writer of claim records: one successful claim per
/// (epoch, account, kind), enforced forever
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimLedger {
    records: BTreeSet<(EpochId, AccountId, OrderKind)>,
    tallies: BTreeMap<EpochId, ClaimTally>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        ClaimLedger::default()
    }

    pub fn is_claimed(&self, epoch: EpochId, account: &AccountId, kind: OrderKind) -> bool {
        self.records
            .contains(&(epoch, account.clone(), kind))
    }

    pub fn record(&mut self, epoch: EpochId, account: AccountId, kind: OrderKind) {
        self.records.insert((epoch, account, kind));
    }

    pub fn claims_for(&self, epoch: EpochId) -> usize {
        self.records.iter().filter(|(e, _, _)| *e == epoch).count()
    }

    /// Running payout tally for an epoch, created on first use
    pub fn tally_mut(&mut self, fhe: &mut dyn FheEngine, epoch: EpochId) -> &mut ClaimTally {
        self.tallies
            .entry(epoch)
            .or_insert_with(|| ClaimTally::new(fhe))
    }
}
