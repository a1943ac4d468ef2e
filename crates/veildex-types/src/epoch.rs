use serde::{Deserialize, Serialize};

/// Trading epoch identifier (sequential counter)
pub type EpochId = u64;

/// Lifecycle phase of a single trading epoch
/// No epoch ever moves backwards through these phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpochPhase {
    /// Accepting order submissions
    Open,
    /// Closed and aggregated; threshold decryption of the reserve pair requested
    AwaitingReveal,
    /// Reserves public; per-user claims enabled
    OpenForClaims,
    /// Claim arithmetic invariant breached; claims rejected
    Halted,
}

impl EpochPhase {
    pub fn accepts_orders(&self) -> bool {
        matches!(self, EpochPhase::Open)
    }

    pub fn claimable(&self) -> bool {
        matches!(self, EpochPhase::OpenForClaims)
    }
}
