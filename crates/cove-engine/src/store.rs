//! # Ciphertext Store
//!
//! The handle table: every encrypted value in the system is registered
//! here as an opaque ciphertext with a declared type, addressed by a
//! fresh `HandleId`. Handles are never destroyed and never mutated —
//! the table only grows.
//!
//! ## Security Invariant
//!
//! The store has no decryption primitive. Plaintext leaves the system
//! only through the engine's reveal path, which consults the permission
//! registry first. The store will hand out ciphertext references, but a
//! ciphertext without the backend is an opaque byte string.

use std::collections::HashMap;

use cove_backend::{Ciphertext, EncryptionBackend};
use cove_core::{EngineError, HandleId, PlainValue, ValueType};

/// One registered encrypted value: declared type plus opaque ciphertext.
#[derive(Debug, Clone)]
struct HandleEntry {
    value_type: ValueType,
    ciphertext: Ciphertext,
}

/// The table of all ciphertext handles issued by this engine instance.
#[derive(Debug, Default)]
pub struct CiphertextStore {
    handles: HashMap<HandleId, HandleEntry>,
}

impl CiphertextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Encrypt a plaintext through the backend and register the result
    /// under a fresh handle. Always succeeds for supported types.
    pub fn encrypt_with<B: EncryptionBackend>(
        &mut self,
        backend: &mut B,
        value: PlainValue,
    ) -> Result<HandleId, EngineError> {
        let value_type = value.value_type();
        let ciphertext = backend.encrypt(value)?;
        Ok(self.register(value_type, ciphertext))
    }

    /// Encrypt a batch of plaintexts, registering handles only after
    /// every encryption has succeeded. A backend failure on any input
    /// registers nothing.
    pub fn encrypt_batch_with<B: EncryptionBackend>(
        &mut self,
        backend: &mut B,
        values: Vec<PlainValue>,
    ) -> Result<Vec<HandleId>, EngineError> {
        let mut sealed = Vec::with_capacity(values.len());
        for value in values {
            let value_type = value.value_type();
            let ciphertext = backend.encrypt(value)?;
            sealed.push((value_type, ciphertext));
        }
        Ok(sealed
            .into_iter()
            .map(|(value_type, ciphertext)| self.register(value_type, ciphertext))
            .collect())
    }

    /// Register an already-produced ciphertext (an operation result)
    /// under a fresh handle.
    pub(crate) fn register(&mut self, value_type: ValueType, ciphertext: Ciphertext) -> HandleId {
        let id = HandleId::new();
        self.handles.insert(
            id,
            HandleEntry {
                value_type,
                ciphertext,
            },
        );
        tracing::trace!(handle = %id, %value_type, "handle registered");
        id
    }

    /// The declared type of a handle.
    ///
    /// # Errors
    ///
    /// `UnknownHandle` if the handle was never issued by this store.
    pub fn type_of(&self, handle: HandleId) -> Result<ValueType, EngineError> {
        self.handles
            .get(&handle)
            .map(|e| e.value_type)
            .ok_or(EngineError::UnknownHandle(handle))
    }

    /// The opaque ciphertext behind a handle.
    ///
    /// # Errors
    ///
    /// `UnknownHandle` if the handle was never issued by this store.
    pub fn ciphertext(&self, handle: HandleId) -> Result<&Ciphertext, EngineError> {
        self.handles
            .get(&handle)
            .map(|e| &e.ciphertext)
            .ok_or(EngineError::UnknownHandle(handle))
    }

    /// Whether the store issued this handle.
    pub fn contains(&self, handle: HandleId) -> bool {
        self.handles.contains_key(&handle)
    }

    /// Number of handles issued.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handle has been issued yet.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterate over all handles with their types and ciphertexts.
    pub fn iter(&self) -> impl Iterator<Item = (HandleId, ValueType, &Ciphertext)> {
        self.handles
            .iter()
            .map(|(id, e)| (*id, e.value_type, &e.ciphertext))
    }
}
