use std::sync::{Arc, Mutex};

use veildex_types::Amount;

use crate::ciphertext::{EncBool, EncUint};
use crate::engine::FheEngine;

/// Backing store shared between a [`ClearEngine`] and the decryption quorum
/// built over it
#[derive(Debug, Default)]
pub(crate) struct ClearState {
    uints: Vec<u64>,
    bools: Vec<bool>,
    proof_checks: usize,
}

impl ClearState {
    pub(crate) fn plaintext(&self, ct: EncUint) -> u64 {
        self.uints[ct.slot() as usize]
    }
}

/// Plaintext-backed engine for tests and development
///
/// Values live behind the same opaque handles a real scheme would hand out;
/// library code holding `&mut dyn FheEngine` cannot reach the plaintexts.
/// The scheme-internal accessors ([`ClearEngine::expose`]) and the
/// instrumentation counters are inherent methods on the concrete type only.
#[derive(Debug, Clone)]
pub struct ClearEngine {
    state: Arc<Mutex<ClearState>>,
}

impl ClearEngine {
    pub fn new() -> Self {
        ClearEngine {
            state: Arc::new(Mutex::new(ClearState::default())),
        }
    }

    pub(crate) fn shared(&self) -> Arc<Mutex<ClearState>> {
        Arc::clone(&self.state)
    }

    fn push_uint(&mut self, value: u64) -> EncUint {
        let mut state = self.state.lock().unwrap();
        state.uints.push(value);
        EncUint::new(state.uints.len() as u64 - 1)
    }

    fn uint(&self, ct: EncUint) -> u64 {
        self.state.lock().unwrap().uints[ct.slot() as usize]
    }

    /// Client-side encryption of a private input
    ///
    /// In the cleartext scheme this coincides with [`FheEngine::trivial`],
    /// but callers should use it for user-supplied values so intent stays
    /// readable when a real scheme is dropped in.
    pub fn encrypt(&mut self, value: Amount) -> EncUint {
        self.push_uint(value.raw())
    }

    /// Scheme-internal plaintext access, as an owner's reencryption gateway
    /// would provide. Test code only.
    pub fn expose(&self, ct: EncUint) -> Amount {
        Amount::from_raw(self.uint(ct))
    }

    /// Number of comparison proofs checked so far
    pub fn proof_checks(&self) -> usize {
        self.state.lock().unwrap().proof_checks
    }
}

impl Default for ClearEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FheEngine for ClearEngine {
    fn trivial(&mut self, value: Amount) -> EncUint {
        self.push_uint(value.raw())
    }

    fn add(&mut self, a: EncUint, b: EncUint) -> EncUint {
        let sum = self.uint(a).wrapping_add(self.uint(b));
        self.push_uint(sum)
    }

    fn sub(&mut self, a: EncUint, b: EncUint) -> EncUint {
        let diff = self.uint(a).saturating_sub(self.uint(b));
        self.push_uint(diff)
    }

    fn min(&mut self, a: EncUint, b: EncUint) -> EncUint {
        let m = self.uint(a).min(self.uint(b));
        self.push_uint(m)
    }

    fn mul_div(&mut self, a: EncUint, b: EncUint, den: EncUint) -> EncUint {
        let d = self.uint(den);
        let value = if d == 0 {
            0
        } else {
            ((self.uint(a) as u128) * (self.uint(b) as u128) / (d as u128)) as u64
        };
        self.push_uint(value)
    }

    fn le(&mut self, a: EncUint, b: EncUint) -> EncBool {
        let bit = self.uint(a) <= self.uint(b);
        let mut state = self.state.lock().unwrap();
        state.bools.push(bit);
        EncBool::new(state.bools.len() as u64 - 1)
    }

    fn select(&mut self, cond: EncBool, then_ct: EncUint, else_ct: EncUint) -> EncUint {
        let bit = self.state.lock().unwrap().bools[cond.slot() as usize];
        let value = if bit { self.uint(then_ct) } else { self.uint(else_ct) };
        self.push_uint(value)
    }

    fn verify(&mut self, proof: EncBool) -> bool {
        let mut state = self.state.lock().unwrap();
        state.proof_checks += 1;
        state.bools[proof.slot() as usize]
    }
}
