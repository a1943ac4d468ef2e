use proptest::prelude::*;

use veildex_fhe::{ClearEngine, FheEngine};
use veildex_pool::{aggregate, settle_flows, AggregateFlow, FundedEpoch, FundedMint};
use veildex_types::{AccountId, Amount, PairConfig};

const MAX_RAW: u64 = 1 << 44; // roughly 4000 whole units of headroom per entry

fn enc(fhe: &mut ClearEngine, raw: u64) -> veildex_fhe::EncUint {
    fhe.encrypt(Amount::from_raw(raw))
}

proptest! {
    /// Every order of the epoch contributes to the aggregate exactly once
    #[test]
    fn aggregation_is_complete(
        mints in prop::collection::vec((0..MAX_RAW, 0..MAX_RAW, 0..MAX_RAW), 0..8),
        swaps in prop::collection::vec((0..MAX_RAW, 0..MAX_RAW), 0..8),
        burns in prop::collection::vec(0..MAX_RAW, 0..8),
    ) {
        let mut fhe = ClearEngine::new();
        let mut funded = FundedEpoch::default();

        let mut sums = [0u64; 6]; // add0, add1, minted, in0, in1, burned
        for (i, (a, b, l)) in mints.iter().enumerate() {
            sums[0] += a;
            sums[1] += b;
            sums[2] += l;
            funded.mints.insert(
                AccountId::new(format!("m{i}")),
                FundedMint { in0: enc(&mut fhe, *a), in1: enc(&mut fhe, *b), liquidity: enc(&mut fhe, *l) },
            );
        }
        for (i, (a, b)) in swaps.iter().enumerate() {
            sums[3] += a;
            sums[4] += b;
            funded.swaps.insert(
                AccountId::new(format!("s{i}")),
                (enc(&mut fhe, *a), enc(&mut fhe, *b)),
            );
        }
        for (i, l) in burns.iter().enumerate() {
            sums[5] += l;
            funded.burns.insert(AccountId::new(format!("b{i}")), enc(&mut fhe, *l));
        }

        let agg = aggregate(&mut fhe, &funded);
        prop_assert_eq!(fhe.expose(agg.add0).raw(), sums[0]);
        prop_assert_eq!(fhe.expose(agg.add1).raw(), sums[1]);
        prop_assert_eq!(fhe.expose(agg.minted).raw(), sums[2]);
        prop_assert_eq!(fhe.expose(agg.swap_in0).raw(), sums[3]);
        prop_assert_eq!(fhe.expose(agg.swap_in1).raw(), sums[4]);
        prop_assert_eq!(fhe.expose(agg.burned).raw(), sums[5]);
    }

    /// reserve0 * reserve1 never shrinks across a swap-only settlement
    #[test]
    fn constant_product_non_decrease_for_swap_only_epochs(
        r0 in 1u64..MAX_RAW,
        r1 in 1u64..MAX_RAW,
        in0 in 0u64..MAX_RAW,
        in1 in 0u64..MAX_RAW,
    ) {
        let mut fhe = ClearEngine::new();
        let config = PairConfig::default();
        let supply = enc(&mut fhe, r0 / 2 + r1 / 2);
        let zero = fhe.zero();
        let agg = AggregateFlow {
            add0: zero,
            add1: zero,
            swap_in0: enc(&mut fhe, in0),
            swap_in1: enc(&mut fhe, in1),
            minted: zero,
            burned: zero,
        };

        let staged = settle_flows(
            &mut fhe,
            &config,
            (Amount::from_raw(r0), Amount::from_raw(r1)),
            supply,
            &agg,
        );

        let n0 = fhe.expose(staged.new_reserve0).raw() as u128;
        let n1 = fhe.expose(staged.new_reserve1).raw() as u128;
        prop_assert!(n0 * n1 >= (r0 as u128) * (r1 as u128));
    }

    /// Floor-division pro-rata shares can never overdraw the settled total,
    /// no matter how the total splits across claimants
    #[test]
    fn pro_rata_floor_shares_never_overdraw(
        parts in prop::collection::vec(0u64..MAX_RAW, 1..10),
        payout in 0u64..MAX_RAW,
    ) {
        let mut fhe = ClearEngine::new();
        let total: u64 = parts.iter().sum();
        let total_ct = enc(&mut fhe, total);
        let payout_ct = enc(&mut fhe, payout);

        let mut claimed: u128 = 0;
        for part in &parts {
            let part_ct = enc(&mut fhe, *part);
            let share = fhe.mul_div(part_ct, payout_ct, total_ct);
            claimed += fhe.expose(share).raw() as u128;
        }
        prop_assert!(claimed <= payout as u128);
    }

    /// A deposit-only settlement moves exactly the deposits into the reserves
    #[test]
    fn deposits_land_in_reserves_verbatim(
        r0 in 0u64..MAX_RAW,
        r1 in 0u64..MAX_RAW,
        add0 in 0u64..MAX_RAW,
        add1 in 0u64..MAX_RAW,
    ) {
        let mut fhe = ClearEngine::new();
        let config = PairConfig::default();
        let supply = fhe.zero();
        let zero = fhe.zero();
        let agg = AggregateFlow {
            add0: enc(&mut fhe, add0),
            add1: enc(&mut fhe, add1),
            swap_in0: zero,
            swap_in1: zero,
            minted: enc(&mut fhe, add0 / 2 + add1 / 2),
            burned: zero,
        };

        let staged = settle_flows(
            &mut fhe,
            &config,
            (Amount::from_raw(r0), Amount::from_raw(r1)),
            supply,
            &agg,
        );

        prop_assert_eq!(fhe.expose(staged.new_reserve0).raw(), r0 + add0);
        prop_assert_eq!(fhe.expose(staged.new_reserve1).raw(), r1 + add1);
    }
}
