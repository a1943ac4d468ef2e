use serde::{Deserialize, Serialize};
use veildex_fhe::{EncUint, FheEngine};
use veildex_types::{Amount, PairConfig};

use crate::aggregate::AggregateFlow;

const BPS_SCALE: u64 = 10_000;

/// Liquidity entitlement for a funded deposit, priced at the epoch's opening
/// state so every depositor in the batch gets the same rate
///
/// Bootstrap pools (both public reserves zero) mint `(in0 + in1) / 2`, the
/// homomorphic analogue of the geometric mean; otherwise the standard
/// minimum-of-two-ratios rule with floor division applies
pub fn mint_entitlement(
    fhe: &mut dyn FheEngine,
    in0: EncUint,
    in1: EncUint,
    reserves: (Amount, Amount),
    total_liquidity: EncUint,
) -> EncUint {
    if reserves.0.is_zero() && reserves.1.is_zero() {
        let sum = fhe.add(in0, in1);
        let one = fhe.trivial(Amount::from_raw(1));
        let two = fhe.trivial(Amount::from_raw(2));
        return fhe.mul_div(sum, one, two);
    }
    let r0 = fhe.trivial(reserves.0);
    let r1 = fhe.trivial(reserves.1);
    let by0 = fhe.mul_div(in0, total_liquidity, r0);
    let by1 = fhe.mul_div(in1, total_liquidity, r1);
    fhe.min(by0, by1)
}

/// Ciphertext results of settling one epoch's aggregate flows
/// Only `new_reserve0`/`new_reserve1` are ever submitted for decryption
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StagedSettlement {
    pub new_reserve0: EncUint,
    pub new_reserve1: EncUint,
    pub swap_out0: EncUint,
    pub swap_out1: EncUint,
    pub burn_payout0: EncUint,
    pub burn_payout1: EncUint,
    pub new_total_liquidity: EncUint,
}

/// Constant-product settlement over the aggregate flows, entirely under
/// encryption
///
/// Deposits land first, then both swap directions are priced against the same
/// post-deposit reserves (opposite flows net implicitly in the reserve
/// update), then burns leave pro-rata from the post-swap reserves. The fee is
/// retained on the input side: only `(1 - fee)` of each inflow participates
/// in pricing while the full inflow joins the reserves
pub fn settle_flows(
    fhe: &mut dyn FheEngine,
    config: &PairConfig,
    reserves: (Amount, Amount),
    total_liquidity: EncUint,
    agg: &AggregateFlow,
) -> StagedSettlement {
    let r0 = fhe.trivial(reserves.0);
    let r1 = fhe.trivial(reserves.1);
    let ra0 = fhe.add(r0, agg.add0);
    let ra1 = fhe.add(r1, agg.add1);
    let supply = fhe.add(total_liquidity, agg.minted);

    let keep = fhe.trivial(Amount::from_raw(BPS_SCALE - config.fee_bps as u64));
    let scale = fhe.trivial(Amount::from_raw(BPS_SCALE));
    let in0_kept = fhe.mul_div(agg.swap_in0, keep, scale);
    let in1_kept = fhe.mul_div(agg.swap_in1, keep, scale);

    let denom0 = fhe.add(ra0, in0_kept);
    let swap_out1 = fhe.mul_div(in0_kept, ra1, denom0);
    let denom1 = fhe.add(ra1, in1_kept);
    let swap_out0 = fhe.mul_div(in1_kept, ra0, denom1);

    let grown0 = fhe.add(ra0, agg.swap_in0);
    let rs0 = fhe.sub(grown0, swap_out0);
    let grown1 = fhe.add(ra1, agg.swap_in1);
    let rs1 = fhe.sub(grown1, swap_out1);

    let burn_payout0 = fhe.mul_div(agg.burned, rs0, supply);
    let burn_payout1 = fhe.mul_div(agg.burned, rs1, supply);
    let new_reserve0 = fhe.sub(rs0, burn_payout0);
    let new_reserve1 = fhe.sub(rs1, burn_payout1);
    let new_total_liquidity = fhe.sub(supply, agg.burned);

    StagedSettlement {
        new_reserve0,
        new_reserve1,
        swap_out0,
        swap_out1,
        burn_payout0,
        burn_payout1,
        new_total_liquidity,
    }
}
