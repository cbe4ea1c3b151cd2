//! # cove-backend — Encryption Backend Seam
//!
//! The Cove engine is scheme-agnostic: it never performs cryptography
//! itself and never inspects ciphertext content. Everything cryptographic
//! flows through the [`EncryptionBackend`] trait defined here:
//!
//! - **encrypt**: plaintext in, opaque [`Ciphertext`] out.
//! - **decrypt**: opaque ciphertext in, plaintext out — called only by the
//!   engine's reveal path, after the permission registry has approved.
//! - **evaluate**: typed homomorphic evaluation methods (boolean algebra,
//!   wrapping modular arithmetic, comparisons, and `select`) over opaque
//!   ciphertexts, producing new opaque ciphertexts.
//!
//! ## ClearBackend
//!
//! [`ClearBackend`] is the shipped reference implementation: a
//! nonce-tagged plaintext table with **no confidentiality whatsoever**. It
//! exists so the engine, its tests, and development builds run without a
//! real FHE scheme behind them. Production deployments substitute a real
//! backend behind the same trait.
//!
//! ## Crate Policy
//!
//! - Depends only on `cove-core` internally.
//! - Evaluation is total over well-typed operands: the backend defines a
//!   result even for division by an encrypted zero (the all-ones value of
//!   the width), because it cannot refuse without learning the operand.

pub mod clear;
pub mod interface;

pub use clear::ClearBackend;
pub use interface::{ArithBinary, BoolBinary, Ciphertext, Comparison, EncryptionBackend};
