use serde::{Deserialize, Serialize};

use crate::Amount;

/// Public protocol parameters for a pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Swap fee on the input side, in basis points
    pub fee_bps: u16,
    /// Liquidity permanently locked out of bootstrap-epoch mint claims
    pub minimum_liquidity: Amount,
}

impl Default for PairConfig {
    fn default() -> Self {
        PairConfig {
            fee_bps: 30,
            minimum_liquidity: Amount::from_units(100),
        }
    }
}
