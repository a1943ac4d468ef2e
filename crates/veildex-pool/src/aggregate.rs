use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use veildex_fhe::{EncUint, FheEngine};
use veildex_types::AccountId;

/// A funded add-liquidity entry: the effective pulled deposits plus the
/// liquidity entitlement priced at the epoch's opening state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FundedMint {
    pub in0: EncUint,
    pub in1: EncUint,
    pub liquidity: EncUint,
}

/// Effective (funded) orders of a closed epoch, after the batched
/// `transfer_from` pulls clamped each entry to what the submitter could cover
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundedEpoch {
    pub mints: BTreeMap<AccountId, FundedMint>,
    pub swaps: BTreeMap<AccountId, (EncUint, EncUint)>,
    pub burns: BTreeMap<AccountId, EncUint>,
}

impl FundedEpoch {
    pub fn is_empty(&self) -> bool {
        self.mints.is_empty() && self.swaps.is_empty() && self.burns.is_empty()
    }
}

/// Encrypted net flow totals of one epoch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregateFlow {
    /// Deposited liquidity per leg
    pub add0: EncUint,
    pub add1: EncUint,
    /// Swap inflows per direction
    pub swap_in0: EncUint,
    pub swap_in1: EncUint,
    /// Liquidity entitlements accrued by the epoch's depositors
    pub minted: EncUint,
    /// Liquidity surrendered by the epoch's removers
    pub burned: EncUint,
}

/// Fold every funded order of the epoch into the six running sums
///
/// Homomorphic addition only: no decryption, no proof checks. Every entry is
/// folded exactly once; addition is commutative, so map order is irrelevant
pub fn aggregate(fhe: &mut dyn FheEngine, funded: &FundedEpoch) -> AggregateFlow {
    let mut add0 = fhe.zero();
    let mut add1 = fhe.zero();
    let mut swap_in0 = fhe.zero();
    let mut swap_in1 = fhe.zero();
    let mut minted = fhe.zero();
    let mut burned = fhe.zero();

    for entry in funded.mints.values() {
        add0 = fhe.add(add0, entry.in0);
        add1 = fhe.add(add1, entry.in1);
        minted = fhe.add(minted, entry.liquidity);
    }
    for (in0, in1) in funded.swaps.values() {
        swap_in0 = fhe.add(swap_in0, *in0);
        swap_in1 = fhe.add(swap_in1, *in1);
    }
    for liquidity in funded.burns.values() {
        burned = fhe.add(burned, *liquidity);
    }

    AggregateFlow {
        add0,
        add1,
        swap_in0,
        swap_in1,
        minted,
        burned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veildex_fhe::ClearEngine;
    use veildex_types::Amount;

    fn amt(units: u32) -> Amount {
        Amount::from_units(units)
    }

    fn funded_fixture(fhe: &mut ClearEngine) -> FundedEpoch {
        let mut funded = FundedEpoch::default();
        for (name, a, b, l) in [("bob", 100, 200, 150), ("carol", 200, 400, 300)] {
            funded.mints.insert(
                AccountId::new(name),
                FundedMint {
                    in0: fhe.encrypt(amt(a)),
                    in1: fhe.encrypt(amt(b)),
                    liquidity: fhe.encrypt(amt(l)),
                },
            );
        }
        let dave_in = (fhe.encrypt(amt(5)), fhe.encrypt(amt(0)));
        funded.swaps.insert(AccountId::new("dave"), dave_in);
        let eve_in = (fhe.encrypt(amt(0)), fhe.encrypt(amt(7)));
        funded.swaps.insert(AccountId::new("eve"), eve_in);
        funded
            .burns
            .insert(AccountId::new("frank"), fhe.encrypt(amt(40)));
        funded
    }

    #[test]
    fn test_every_order_counted_exactly_once() {
        let mut fhe = ClearEngine::new();
        let funded = funded_fixture(&mut fhe);

        let agg = aggregate(&mut fhe, &funded);

        assert_eq!(fhe.expose(agg.add0), amt(300));
        assert_eq!(fhe.expose(agg.add1), amt(600));
        assert_eq!(fhe.expose(agg.minted), amt(450));
        assert_eq!(fhe.expose(agg.swap_in0), amt(5));
        assert_eq!(fhe.expose(agg.swap_in1), amt(7));
        assert_eq!(fhe.expose(agg.burned), amt(40));
    }

    #[test]
    fn test_aggregation_never_checks_a_proof() {
        let mut fhe = ClearEngine::new();
        let funded = funded_fixture(&mut fhe);

        let before = fhe.proof_checks();
        aggregate(&mut fhe, &funded);
        assert_eq!(fhe.proof_checks(), before);
    }

    #[test]
    fn test_empty_epoch_aggregates_to_zero() {
        let mut fhe = ClearEngine::new();
        let agg = aggregate(&mut fhe, &FundedEpoch::default());
        assert_eq!(fhe.expose(agg.add0), Amount::ZERO);
        assert_eq!(fhe.expose(agg.burned), Amount::ZERO);
    }
}
