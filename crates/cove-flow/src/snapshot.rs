//! # State Snapshot — Four Flat Tables
//!
//! The engine's whole persisted state fits in four flat, append-mostly
//! tables: handles, grants, containers, workflow instances. No derived
//! indices are required for correctness, so none are exported.
//!
//! Ciphertexts themselves are not serialized — a snapshot carries the
//! SHA-256 of each ciphertext as an opaque reference, enough to key an
//! external ciphertext store without this layer learning anything.
//!
//! Rows are sorted by identifier so two snapshots of the same state are
//! byte-identical.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cove_backend::EncryptionBackend;
use cove_core::{HandleId, PrincipalId, ValueType};
use cove_engine::Scope;

use crate::container::Container;
use crate::flow::WorkflowEngine;
use crate::workflow::WorkflowInstance;

/// One row of the handle table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleRow {
    /// The handle.
    pub handle: HandleId,
    /// Its declared type.
    pub value_type: ValueType,
    /// Lowercase-hex SHA-256 of the opaque ciphertext bytes.
    pub ciphertext_sha256: String,
}

/// One row of the grant table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRow {
    /// The handle the grant covers.
    pub handle: HandleId,
    /// The granted principal.
    pub principal: PrincipalId,
    /// What the grant permits.
    pub scope: Scope,
}

/// The full engine state as four flat tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Handle table: id, type, ciphertext reference.
    pub handles: Vec<HandleRow>,
    /// Grant table.
    pub grants: Vec<GrantRow>,
    /// Container table.
    pub containers: Vec<Container>,
    /// Workflow-instance table.
    pub workflows: Vec<WorkflowInstance>,
}

impl<B: EncryptionBackend> WorkflowEngine<B> {
    /// Export the engine's state as four sorted flat tables.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut handles: Vec<HandleRow> = self
            .engine()
            .store()
            .iter()
            .map(|(handle, value_type, ciphertext)| HandleRow {
                handle,
                value_type,
                ciphertext_sha256: sha256_hex(ciphertext.as_bytes()),
            })
            .collect();
        handles.sort_by_key(|r| r.handle.0);

        let mut grants: Vec<GrantRow> = self
            .engine()
            .permissions()
            .iter()
            .map(|(handle, principal, scope)| GrantRow {
                handle,
                principal,
                scope,
            })
            .collect();
        grants.sort_by_key(|r| (r.handle.0, r.principal.0, r.scope.to_string()));

        let mut containers: Vec<Container> = self.containers().iter().cloned().collect();
        containers.sort_by_key(|c| c.id.0);

        let mut workflows: Vec<WorkflowInstance> = self.workflows().cloned().collect();
        workflows.sort_by_key(|w| w.id.0);

        EngineSnapshot {
            handles,
            grants,
            containers,
            workflows,
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
