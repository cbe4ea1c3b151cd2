//! # cove-engine — Confidential Value Engine Core
//!
//! The three components every confidential application in this workspace
//! builds on:
//!
//! - **Ciphertext Store** (`store.rs`): owns every encrypted-value handle.
//!   A handle is an immutable descriptor — one ciphertext, one declared
//!   type, forever. The store exposes no decryption primitive.
//!
//! - **Permission Registry** (`permissions.rs`): the single
//!   `(handle, principal, scope)` capability table. `InternalUse` lets the
//!   engine consume a handle as an operand; `Reveal` lets a principal
//!   obtain plaintext through the reveal path. Nothing else ever sees a
//!   plaintext.
//!
//! - **Operation Engine** (`engine.rs`): the fixed homomorphic algebra —
//!   boolean AND/OR/XOR/NOT, wrapping ADD/SUB/MUL/DIV, the five
//!   comparisons, and `select`, the only construct allowed to branch on
//!   an encrypted boolean. Every operation validates types and operand
//!   authorization before any effect, and auto-grants its result
//!   `InternalUse` for the engine's own context so no ciphertext is ever
//!   unreachable downstream.
//!
//! ## Crate Policy
//!
//! - Depends on `cove-core` and `cove-backend` internally.
//! - A failed call changes nothing: all validation precedes all effects.
//! - No plaintext crosses the public surface except through
//!   `Engine::reveal`, behind an explicit `Reveal` grant.

pub mod engine;
pub mod permissions;
pub mod store;

pub use engine::Engine;
pub use permissions::{PermissionRegistry, Scope};
pub use store::CiphertextStore;

// The operation selectors are part of this crate's public vocabulary.
pub use cove_backend::{ArithBinary, BoolBinary, Comparison};
