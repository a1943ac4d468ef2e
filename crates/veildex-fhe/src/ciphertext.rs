use serde::{Deserialize, Serialize};

/// Handle to a ciphertext encrypting a bounded non-negative 64-bit integer
/// The handle itself carries no information about the plaintext; all
/// arithmetic goes through an engine implementing [`crate::FheEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EncUint(u64);

impl EncUint {
    pub(crate) fn new(slot: u64) -> Self {
        EncUint(slot)
    }

    pub(crate) fn slot(&self) -> u64 {
        self.0
    }

    /// Opaque handle value, usable as commitment input
    pub fn handle(&self) -> u64 {
        self.0
    }
}

/// Handle to an encrypted comparison result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncBool(u64);

impl EncBool {
    pub(crate) fn new(slot: u64) -> Self {
        EncBool(slot)
    }

    pub(crate) fn slot(&self) -> u64 {
        self.0
    }
}
