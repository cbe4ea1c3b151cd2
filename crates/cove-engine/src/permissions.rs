//! # Permission Registry
//!
//! The single capability table of the engine: a set of
//! `(handle, principal, scope)` grants. Every ad hoc "allow this party"
//! mechanism of a confidential application resolves to one row here.
//!
//! - `grant` is idempotent: granting an existing row is a no-op, not an
//!   error.
//! - `check` is a pure, total lookup: unknown handles and principals
//!   simply answer `false`.
//! - `revoke` removes a row if present and is otherwise a no-op.
//!
//! Grants are monotone in the default lifecycle: nothing in
//! submit/derive/finalize ever revokes. Revocation exists as an explicit
//! administrative act only.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cove_core::{HandleId, PrincipalId};

/// What a grant permits its principal to do with a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// The engine may consume the handle as an operand. Until this is
    /// granted to the engine's own context, the value has not been
    /// authorized for computation.
    InternalUse,
    /// The principal may obtain plaintext through the reveal path.
    Reveal,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::InternalUse => f.write_str("internal-use"),
            Scope::Reveal => f.write_str("reveal"),
        }
    }
}

/// The grant table.
#[derive(Debug, Default)]
pub struct PermissionRegistry {
    grants: HashSet<(HandleId, PrincipalId, Scope)>,
}

impl PermissionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            grants: HashSet::new(),
        }
    }

    /// Record a grant. Returns `true` if the grant is new, `false` if it
    /// already existed (idempotent).
    pub fn grant(&mut self, handle: HandleId, principal: PrincipalId, scope: Scope) -> bool {
        let fresh = self.grants.insert((handle, principal, scope));
        if fresh {
            tracing::debug!(%handle, %principal, %scope, "grant recorded");
        }
        fresh
    }

    /// Whether a grant is present. Never fails; unknown rows are `false`.
    pub fn check(&self, handle: HandleId, principal: PrincipalId, scope: Scope) -> bool {
        self.grants.contains(&(handle, principal, scope))
    }

    /// Remove a grant if present. Returns `true` if a row was removed.
    pub fn revoke(&mut self, handle: HandleId, principal: PrincipalId, scope: Scope) -> bool {
        let removed = self.grants.remove(&(handle, principal, scope));
        if removed {
            tracing::debug!(%handle, %principal, %scope, "grant revoked");
        }
        removed
    }

    /// Number of grants recorded.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterate over all grants.
    pub fn iter(&self) -> impl Iterator<Item = (HandleId, PrincipalId, Scope)> + '_ {
        self.grants.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_false_until_granted() {
        let mut reg = PermissionRegistry::new();
        let (h, p) = (HandleId::new(), PrincipalId::new());
        assert!(!reg.check(h, p, Scope::Reveal));
        reg.grant(h, p, Scope::Reveal);
        assert!(reg.check(h, p, Scope::Reveal));
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut reg = PermissionRegistry::new();
        let (h, p) = (HandleId::new(), PrincipalId::new());
        assert!(reg.grant(h, p, Scope::InternalUse));
        assert!(!reg.grant(h, p, Scope::InternalUse));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut reg = PermissionRegistry::new();
        let (h, p) = (HandleId::new(), PrincipalId::new());
        reg.grant(h, p, Scope::InternalUse);
        assert!(!reg.check(h, p, Scope::Reveal));
    }

    #[test]
    fn test_revoke_removes_and_is_noop_when_absent() {
        let mut reg = PermissionRegistry::new();
        let (h, p) = (HandleId::new(), PrincipalId::new());
        reg.grant(h, p, Scope::Reveal);
        assert!(reg.revoke(h, p, Scope::Reveal));
        assert!(!reg.check(h, p, Scope::Reveal));
        assert!(!reg.revoke(h, p, Scope::Reveal));
    }

    #[test]
    fn test_grants_are_per_principal() {
        let mut reg = PermissionRegistry::new();
        let h = HandleId::new();
        let (alice, bob) = (PrincipalId::new(), PrincipalId::new());
        reg.grant(h, alice, Scope::Reveal);
        assert!(reg.check(h, alice, Scope::Reveal));
        assert!(!reg.check(h, bob, Scope::Reveal));
    }
}
