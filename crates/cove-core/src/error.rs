//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the Cove engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure is recoverable by the caller: a failed call leaves all
//!   engine state as if it had not been invoked.
//! - Errors carry the offending identifiers, not prose alone.
//! - The cryptographic seam has its own `BackendError`, bridged into
//!   `EngineError` so callers handle one type at the public surface.

use thiserror::Error;

use crate::identity::{ContainerId, HandleId, PrincipalId, WorkflowId};
use crate::value::ValueType;

/// Top-level error type for the Cove engine.
///
/// One variant per user-visible failure kind. None of these leaves the
/// engine in an unrecoverable state; retries, if any, belong to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The handle was never issued by this store instance.
    #[error("unknown handle {0}")]
    UnknownHandle(HandleId),

    /// Operand types disagree in width or kind.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the operation required (a concrete type, or a kind such
        /// as "unsigned integers of equal width").
        expected: String,
        /// The type the operand actually carries.
        actual: ValueType,
    },

    /// An operand handle lacks an internal-use grant for the engine context.
    #[error("operand {0} is not authorized for computation")]
    UnauthorizedOperand(HandleId),

    /// The container is not accepting new submissions.
    #[error("container {0} is closed to new submissions")]
    ProgramClosed(ContainerId),

    /// The container is at capacity.
    #[error("container {0} is full (capacity {1})")]
    ProgramFull(ContainerId, u32),

    /// The workflow has already been finalized (or derivation re-attempted).
    #[error("workflow {0} is already processed")]
    AlreadyProcessed(WorkflowId),

    /// The caller is not the administrator or submitter this action requires,
    /// or lacks a reveal grant on the handle it is trying to read.
    #[error("principal {0} is not authorized for this action")]
    Unauthorized(PrincipalId),

    /// A container or workflow reference does not resolve.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Finalization was attempted before the workflow's derived values exist.
    #[error("workflow {0} has no derived value yet")]
    NotDerived(WorkflowId),

    /// The encryption backend failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Error at the encryption backend seam.
///
/// The engine is scheme-agnostic; whatever cryptosystem sits behind the
/// `EncryptionBackend` trait reports its failures through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The ciphertext is not one this backend produced, or is corrupted.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// The backend does not support the requested evaluation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IntWidth;

    #[test]
    fn test_display_carries_ids() {
        let h = HandleId::new();
        let msg = EngineError::UnknownHandle(h).to_string();
        assert!(msg.contains(&h.to_string()));
    }

    #[test]
    fn test_type_mismatch_display() {
        let e = EngineError::TypeMismatch {
            expected: ValueType::Uint(IntWidth::W8).to_string(),
            actual: ValueType::Bool,
        };
        assert_eq!(e.to_string(), "type mismatch: expected u8, got bool");
    }

    #[test]
    fn test_backend_error_bridges() {
        let e: EngineError = BackendError::DecryptionFailed("bad tag".into()).into();
        assert!(matches!(e, EngineError::Backend(_)));
    }
}
