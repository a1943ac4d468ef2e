use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use veildex_fhe::{EncUint, FheEngine};
use veildex_types::{AccountId, EpochId};

/// Order identifier: hex-encoded commitment over (epoch, submitter, kind,
/// ciphertext handles)
pub type OrderId = String;

/// Tag distinguishing the three batched order kinds
/// A tagged variant, not an extension point: the aggregator and claim ledger
/// handle all three exhaustively
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Mint,
    Swap,
    Burn,
}

impl OrderKind {
    fn tag(&self) -> u8 {
        match self {
            OrderKind::Mint => 0,
            OrderKind::Swap => 1,
            OrderKind::Burn => 2,
        }
    }
}

/// Add-liquidity intent: both deposit legs as ciphertexts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MintOrder {
    pub amount0: EncUint,
    pub amount1: EncUint,
}

/// Swap intent; a zero leg is first-class so the direction stays hidden
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwapOrder {
    pub amount_in0: EncUint,
    pub amount_in1: EncUint,
}

/// Remove-liquidity intent
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurnOrder {
    pub liquidity: EncUint,
}

/// All pending orders of one epoch, keyed by submitter within each kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpochOrders {
    pub mints: BTreeMap<AccountId, MintOrder>,
    pub swaps: BTreeMap<AccountId, SwapOrder>,
    pub burns: BTreeMap<AccountId, BurnOrder>,
}

impl EpochOrders {
    pub fn is_empty(&self) -> bool {
        self.mints.is_empty() && self.swaps.is_empty() && self.burns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mints.len() + self.swaps.len() + self.burns.len()
    }
}

/// Per-epoch queue of encrypted order intents
///
/// Recording an intent moves no value; funds are pulled in one batch when the
/// epoch settles. A repeat submission of the same kind in the same epoch folds
/// homomorphically into the existing entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueue {
    epochs: BTreeMap<EpochId, EpochOrders>,
}

impl OrderQueue {
    pub fn new() -> Self {
        OrderQueue {
            epochs: BTreeMap::new(),
        }
    }

    pub fn orders(&self, epoch: EpochId) -> Option<&EpochOrders> {
        self.epochs.get(&epoch)
    }

    pub fn submit_mint(
        &mut self,
        fhe: &mut dyn FheEngine,
        epoch: EpochId,
        submitter: &AccountId,
        amount0: EncUint,
        amount1: EncUint,
    ) -> OrderId {
        let slot = self.epochs.entry(epoch).or_default();
        let order = match slot.mints.get(submitter) {
            Some(existing) => MintOrder {
                amount0: fhe.add(existing.amount0, amount0),
                amount1: fhe.add(existing.amount1, amount1),
            },
            None => MintOrder { amount0, amount1 },
        };
        slot.mints.insert(submitter.clone(), order);
        commitment(
            epoch,
            submitter,
            OrderKind::Mint,
            &[order.amount0.handle(), order.amount1.handle()],
        )
    }

    pub fn submit_swap(
        &mut self,
        fhe: &mut dyn FheEngine,
        epoch: EpochId,
        submitter: &AccountId,
        amount_in0: EncUint,
        amount_in1: EncUint,
    ) -> OrderId {
        let slot = self.epochs.entry(epoch).or_default();
        let order = match slot.swaps.get(submitter) {
            Some(existing) => SwapOrder {
                amount_in0: fhe.add(existing.amount_in0, amount_in0),
                amount_in1: fhe.add(existing.amount_in1, amount_in1),
            },
            None => SwapOrder {
                amount_in0,
                amount_in1,
            },
        };
        slot.swaps.insert(submitter.clone(), order);
        commitment(
            epoch,
            submitter,
            OrderKind::Swap,
            &[order.amount_in0.handle(), order.amount_in1.handle()],
        )
    }

    pub fn submit_burn(
        &mut self,
        fhe: &mut dyn FheEngine,
        epoch: EpochId,
        submitter: &AccountId,
        liquidity: EncUint,
    ) -> OrderId {
        let slot = self.epochs.entry(epoch).or_default();
        let order = match slot.burns.get(submitter) {
            Some(existing) => BurnOrder {
                liquidity: fhe.add(existing.liquidity, liquidity),
            },
            None => BurnOrder { liquidity },
        };
        slot.burns.insert(submitter.clone(), order);
        commitment(
            epoch,
            submitter,
            OrderKind::Burn,
            &[order.liquidity.handle()],
        )
    }
}

/// Commitment to an order's kind and ciphertexts: H(epoch || submitter || tag || handles)
fn commitment(
    epoch: EpochId,
    submitter: &AccountId,
    kind: OrderKind,
    handles: &[u64],
) -> OrderId {
    let mut hasher = Sha256::new();
    hasher.update(epoch.to_be_bytes());
    hasher.update(submitter.as_str().as_bytes());
    hasher.update([kind.tag()]);
    for handle in handles {
        hasher.update(handle.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}
