//! # Backend Interface — Opaque Ciphertexts and Evaluation Methods
//!
//! The trait boundary between the engine and whatever cryptosystem backs
//! it. The engine holds [`Ciphertext`] values it cannot read and asks the
//! backend to combine them; the backend never sees handles, principals, or
//! permissions.
//!
//! ## Security Invariant
//!
//! `Ciphertext` exposes its bytes only for storage and digest purposes.
//! There is no accessor that interprets them — interpretation is the
//! backend's exclusive right, and the engine's one call into it
//! (`decrypt`) sits behind the permission registry's reveal gate.

use serde::{Deserialize, Serialize};

use cove_core::{BackendError, PlainValue};

/// An opaque encrypted value, as produced by an [`EncryptionBackend`].
///
/// The engine stores and forwards these byte strings without interpreting
/// them. Equality is byte equality — two ciphertexts of the same plaintext
/// are not expected to compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// Wrap raw backend-produced bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes, for storage and digest computation only.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Binary boolean operations: operands and result are encrypted booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolBinary {
    /// Logical conjunction.
    And,
    /// Logical disjunction.
    Or,
    /// Exclusive or.
    Xor,
}

/// Binary arithmetic over equal-width encrypted unsigned integers.
///
/// Semantics are wrapping (mod 2^width). Division by an encrypted zero
/// cannot be rejected at call time; backends must define a total result
/// (the `ClearBackend` yields the all-ones value of the width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithBinary {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
    /// Integer division (all-ones on a zero divisor).
    Div,
}

/// Comparisons over equal-width encrypted unsigned integers; the result
/// is an encrypted boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Strictly greater.
    Gt,
    /// Strictly less.
    Lt,
    /// Greater or equal.
    Gte,
    /// Less or equal.
    Lte,
}

/// The cryptographic collaborator the engine computes through.
///
/// Implementations must make every evaluation method total over
/// well-typed operands: by the time the backend is called the engine has
/// already validated types and authorization, and a failure here aborts
/// the operation with no state change.
pub trait EncryptionBackend {
    /// Encrypt a plaintext, producing a fresh opaque ciphertext.
    fn encrypt(&mut self, value: PlainValue) -> Result<Ciphertext, BackendError>;

    /// Decrypt a ciphertext this backend produced.
    ///
    /// Only the engine's reveal path calls this, and only after a
    /// `Reveal` grant has been checked.
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<PlainValue, BackendError>;

    /// Evaluate a binary boolean operation on two encrypted booleans.
    fn bool_binary(
        &mut self,
        op: BoolBinary,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError>;

    /// Evaluate logical NOT on an encrypted boolean.
    fn bool_not(&mut self, a: &Ciphertext) -> Result<Ciphertext, BackendError>;

    /// Evaluate wrapping arithmetic on two equal-width encrypted integers.
    fn arith_binary(
        &mut self,
        op: ArithBinary,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError>;

    /// Compare two equal-width encrypted integers into an encrypted boolean.
    fn compare(
        &mut self,
        op: Comparison,
        a: &Ciphertext,
        b: &Ciphertext,
    ) -> Result<Ciphertext, BackendError>;

    /// Branch on an encrypted boolean: yields a ciphertext equal in
    /// plaintext to `if_true` when the condition holds, `if_false`
    /// otherwise. The only branching construct in the model.
    fn select(
        &mut self,
        condition: &Ciphertext,
        if_true: &Ciphertext,
        if_false: &Ciphertext,
    ) -> Result<Ciphertext, BackendError>;
}
