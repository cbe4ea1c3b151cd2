//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Cove engine.
//! These prevent accidental identifier confusion — you cannot pass
//! a `WorkflowId` where a `HandleId` is expected.
//!
//! ## Security Invariant
//!
//! Handles, principals, containers, and workflows live in distinct
//! identifier namespaces. Type-level separation prevents substitution
//! of one kind of identifier for another, which in a permission table
//! keyed by `(handle, principal, scope)` would be an access-control
//! defect, not a cosmetic bug.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for an encrypted value handle.
///
/// A handle is an immutable value descriptor: it refers to one ciphertext
/// with one declared type, forever. It is never reused and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

/// Identifier for a principal: any party that may submit, administer,
/// or be granted visibility into encrypted values. The operation engine
/// itself holds a principal id for its own evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

/// Identifier for a capacity-bounded container of workflow instances
/// (a scholarship program, auction lot, proposal, or game).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub Uuid);

/// Identifier for one submitted workflow instance
/// (an application, ballot, bid, guess, or record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub Uuid);

impl HandleId {
    /// Generate a new random handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl PrincipalId {
    /// Generate a new random principal identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl ContainerId {
    /// Generate a new random container identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl WorkflowId {
    /// Generate a new random workflow identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handle:{}", self.0)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "container:{}", self.0)
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "workflow:{}", self.0)
    }
}
