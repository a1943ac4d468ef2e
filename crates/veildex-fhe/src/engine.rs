use veildex_types::Amount;

use crate::ciphertext::{EncBool, EncUint};

/// Homomorphic arithmetic over encrypted amounts
///
/// All operations are total: an FHE circuit cannot branch or fail on the data
/// it computes over, so underflow clamps to zero and division by zero yields
/// zero. Guards are expressed with [`FheEngine::le`] and
/// [`FheEngine::select`], never with errors.
///
/// Implementations are swappable; the rest of the system only ever holds
/// `&mut dyn FheEngine` and cannot observe plaintexts through it.
pub trait FheEngine {
    /// Lift a public constant into a ciphertext
    fn trivial(&mut self, value: Amount) -> EncUint;

    fn add(&mut self, a: EncUint, b: EncUint) -> EncUint;

    /// Subtraction floored at zero
    fn sub(&mut self, a: EncUint, b: EncUint) -> EncUint;

    fn min(&mut self, a: EncUint, b: EncUint) -> EncUint;

    /// floor(a * b / den); den == 0 yields zero
    /// Fused so the widened intermediate product never leaves the circuit
    fn mul_div(&mut self, a: EncUint, b: EncUint, den: EncUint) -> EncUint;

    /// Encrypted comparison a <= b
    fn le(&mut self, a: EncUint, b: EncUint) -> EncBool;

    /// cmux: cond ? then_ct : else_ct
    fn select(&mut self, cond: EncBool, then_ct: EncUint, else_ct: EncUint) -> EncUint;

    /// Check a scalar comparison proof
    ///
    /// Reveals exactly the one boolean and nothing about the compared
    /// magnitudes. Callers that fold confidential aggregates must not use
    /// this per order.
    fn verify(&mut self, proof: EncBool) -> bool;

    fn zero(&mut self) -> EncUint {
        self.trivial(Amount::ZERO)
    }
}
