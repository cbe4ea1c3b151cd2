//! # Operation Engine
//!
//! The restricted algebra over ciphertext handles. Operands are looked up
//! in the store, validated for type compatibility and computation
//! authorization, evaluated through the backend, and the result is
//! registered as a fresh handle.
//!
//! Every operation follows the same discipline:
//!
//! 1. `TypeMismatch` if operand types disagree in width or kind.
//! 2. `UnauthorizedOperand` if any operand lacks an `InternalUse` grant
//!    for the engine's own context principal.
//! 3. On success the result handle is auto-granted `InternalUse` for the
//!    engine context — and nothing else. Nobody can reveal a result until
//!    an explicit `Reveal` grant names them.
//!
//! The auto-grant keeps every result usable downstream (no unreachable
//! ciphertexts) while the missing `Reveal` keeps every result invisible
//! until someone with authority opts a recipient in.
//!
//! ## Security Invariant
//!
//! `select` is the only branch on an encrypted boolean. There is no path
//! by which a caller can observe an encrypted condition and take a
//! plaintext `if` on it: conditions stay ciphertext from encryption to an
//! authorized reveal.

use cove_backend::{ArithBinary, BoolBinary, Ciphertext, Comparison, EncryptionBackend};
use cove_core::{EngineError, HandleId, PlainValue, PrincipalId, ValueType};

use crate::permissions::{PermissionRegistry, Scope};
use crate::store::CiphertextStore;

/// The confidential value engine: store, permissions, backend, and the
/// engine's own evaluation context principal.
pub struct Engine<B: EncryptionBackend> {
    store: CiphertextStore,
    permissions: PermissionRegistry,
    backend: B,
    context: PrincipalId,
}

impl<B: EncryptionBackend> Engine<B> {
    /// Create an engine over the given backend, with a fresh context
    /// principal for its own `InternalUse` grants.
    pub fn new(backend: B) -> Self {
        let context = PrincipalId::new();
        tracing::debug!(%context, "engine created");
        Self {
            store: CiphertextStore::new(),
            permissions: PermissionRegistry::new(),
            backend,
            context,
        }
    }

    /// The engine's own context principal.
    pub fn context(&self) -> PrincipalId {
        self.context
    }

    /// Read access to the handle store.
    pub fn store(&self) -> &CiphertextStore {
        &self.store
    }

    /// Read access to the grant table.
    pub fn permissions(&self) -> &PermissionRegistry {
        &self.permissions
    }

    // ─── Store surface ───────────────────────────────────────────────

    /// Encrypt a plaintext into a fresh handle.
    ///
    /// The new handle carries **no grants** — not even `InternalUse`.
    /// Callers (normally the workflow layer) authorize it explicitly
    /// before it can participate in computation.
    pub fn encrypt(&mut self, value: PlainValue) -> Result<HandleId, EngineError> {
        let handle = self.store.encrypt_with(&mut self.backend, value)?;
        tracing::debug!(%handle, "plaintext encrypted");
        Ok(handle)
    }

    /// Encrypt a batch of plaintexts into fresh handles, all or none:
    /// no handle is registered until every encryption has succeeded, so
    /// a backend failure midway leaks nothing. Like [`Engine::encrypt`],
    /// the new handles carry no grants.
    pub fn encrypt_batch(
        &mut self,
        values: Vec<PlainValue>,
    ) -> Result<Vec<HandleId>, EngineError> {
        let handles = self.store.encrypt_batch_with(&mut self.backend, values)?;
        tracing::debug!(count = handles.len(), "plaintext batch encrypted");
        Ok(handles)
    }

    /// The declared type of a handle.
    pub fn type_of(&self, handle: HandleId) -> Result<ValueType, EngineError> {
        self.store.type_of(handle)
    }

    // ─── Permission surface ──────────────────────────────────────────

    /// Authorize a handle for computation: grant `InternalUse` to the
    /// engine's own context.
    pub fn authorize(&mut self, handle: HandleId) -> Result<bool, EngineError> {
        self.grant(handle, self.context, Scope::InternalUse)
    }

    /// Record a grant. Idempotent; fails only if the handle is unknown.
    pub fn grant(
        &mut self,
        handle: HandleId,
        principal: PrincipalId,
        scope: Scope,
    ) -> Result<bool, EngineError> {
        if !self.store.contains(handle) {
            return Err(EngineError::UnknownHandle(handle));
        }
        Ok(self.permissions.grant(handle, principal, scope))
    }

    /// Whether a grant is present. Total: unknown rows answer `false`.
    pub fn check(&self, handle: HandleId, principal: PrincipalId, scope: Scope) -> bool {
        self.permissions.check(handle, principal, scope)
    }

    /// Remove a grant if present; no-op otherwise.
    pub fn revoke(&mut self, handle: HandleId, principal: PrincipalId, scope: Scope) -> bool {
        self.permissions.revoke(handle, principal, scope)
    }

    // ─── Operation algebra ───────────────────────────────────────────

    /// Binary boolean operation: AND, OR, XOR.
    pub fn bool_binary(
        &mut self,
        op: BoolBinary,
        a: HandleId,
        b: HandleId,
    ) -> Result<HandleId, EngineError> {
        self.require_bool(a)?;
        self.require_bool(b)?;
        self.require_operand(a)?;
        self.require_operand(b)?;
        let ca = self.store.ciphertext(a)?;
        let cb = self.store.ciphertext(b)?;
        let ct = self.backend.bool_binary(op, ca, cb)?;
        Ok(self.finish(ValueType::Bool, ct))
    }

    /// Logical NOT of an encrypted boolean.
    pub fn bool_not(&mut self, a: HandleId) -> Result<HandleId, EngineError> {
        self.require_bool(a)?;
        self.require_operand(a)?;
        let ca = self.store.ciphertext(a)?;
        let ct = self.backend.bool_not(ca)?;
        Ok(self.finish(ValueType::Bool, ct))
    }

    /// Wrapping arithmetic over equal-width unsigned handles; the result
    /// keeps the operand width.
    ///
    /// A DIV by a value that may encrypt to zero is **not** checked here —
    /// the engine cannot inspect the operand. The backend's quotient for a
    /// zero divisor is the all-ones value of the width; the containing
    /// workflow interprets it at the revealed-result stage.
    pub fn arith(
        &mut self,
        op: ArithBinary,
        a: HandleId,
        b: HandleId,
    ) -> Result<HandleId, EngineError> {
        let width = self.require_uint_pair(a, b)?;
        self.require_operand(a)?;
        self.require_operand(b)?;
        let ca = self.store.ciphertext(a)?;
        let cb = self.store.ciphertext(b)?;
        let ct = self.backend.arith_binary(op, ca, cb)?;
        Ok(self.finish(ValueType::Uint(width), ct))
    }

    /// Comparison over equal-width unsigned handles; boolean result.
    pub fn compare(
        &mut self,
        op: Comparison,
        a: HandleId,
        b: HandleId,
    ) -> Result<HandleId, EngineError> {
        self.require_uint_pair(a, b)?;
        self.require_operand(a)?;
        self.require_operand(b)?;
        let ca = self.store.ciphertext(a)?;
        let cb = self.store.ciphertext(b)?;
        let ct = self.backend.compare(op, ca, cb)?;
        Ok(self.finish(ValueType::Bool, ct))
    }

    /// Branch on an encrypted boolean: the confidential substitute for a
    /// conditional statement. Both branches must carry the same type; the
    /// result carries it too.
    pub fn select(
        &mut self,
        condition: HandleId,
        if_true: HandleId,
        if_false: HandleId,
    ) -> Result<HandleId, EngineError> {
        self.require_bool(condition)?;
        let tt = self.store.type_of(if_true)?;
        let tf = self.store.type_of(if_false)?;
        if tt != tf {
            return Err(EngineError::TypeMismatch {
                expected: tt.to_string(),
                actual: tf,
            });
        }
        self.require_operand(condition)?;
        self.require_operand(if_true)?;
        self.require_operand(if_false)?;
        let cc = self.store.ciphertext(condition)?;
        let ct = self.store.ciphertext(if_true)?;
        let cf = self.store.ciphertext(if_false)?;
        let out = self.backend.select(cc, ct, cf)?;
        Ok(self.finish(tt, out))
    }

    // ─── Reveal path ─────────────────────────────────────────────────

    /// Decrypt a handle's plaintext for a principal holding a `Reveal`
    /// grant. The only way plaintext ever leaves the engine.
    pub fn reveal(
        &self,
        handle: HandleId,
        principal: PrincipalId,
    ) -> Result<PlainValue, EngineError> {
        let ciphertext = self.store.ciphertext(handle)?;
        if !self.permissions.check(handle, principal, Scope::Reveal) {
            return Err(EngineError::Unauthorized(principal));
        }
        let plain = self.backend.decrypt(ciphertext)?;
        tracing::debug!(%handle, %principal, "plaintext revealed");
        Ok(plain)
    }

    // ─── Validation helpers ──────────────────────────────────────────

    fn require_bool(&self, handle: HandleId) -> Result<(), EngineError> {
        let t = self.store.type_of(handle)?;
        if t != ValueType::Bool {
            return Err(EngineError::TypeMismatch {
                expected: ValueType::Bool.to_string(),
                actual: t,
            });
        }
        Ok(())
    }

    fn require_uint_pair(&self, a: HandleId, b: HandleId) -> Result<cove_core::IntWidth, EngineError> {
        let ta = self.store.type_of(a)?;
        let tb = self.store.type_of(b)?;
        let width = match ta.width() {
            Some(w) => w,
            None => {
                return Err(EngineError::TypeMismatch {
                    expected: "an unsigned integer".to_string(),
                    actual: ta,
                })
            }
        };
        if ta != tb {
            return Err(EngineError::TypeMismatch {
                expected: ta.to_string(),
                actual: tb,
            });
        }
        Ok(width)
    }

    fn require_operand(&self, handle: HandleId) -> Result<(), EngineError> {
        if !self
            .permissions
            .check(handle, self.context, Scope::InternalUse)
        {
            return Err(EngineError::UnauthorizedOperand(handle));
        }
        Ok(())
    }

    fn finish(&mut self, value_type: ValueType, ciphertext: Ciphertext) -> HandleId {
        let out = self.store.register(value_type, ciphertext);
        // Result handles stay usable downstream, but invisible: InternalUse
        // for the engine context, Reveal for nobody.
        self.permissions.grant(out, self.context, Scope::InternalUse);
        tracing::debug!(handle = %out, %value_type, "operation result registered");
        out
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use cove_backend::ClearBackend;
    use cove_core::IntWidth;
    use proptest::prelude::*;

    proptest! {
        /// GT through the full handle pipeline agrees with plain order,
        /// and selecting on it yields the maximum.
        #[test]
        fn gt_and_select_agree_with_plain(x in any::<u32>(), y in any::<u32>()) {
            let mut e = Engine::new(ClearBackend::with_seed(0));
            let admin = PrincipalId::new();
            let a = e.encrypt(PlainValue::uint(u64::from(x), IntWidth::W32)).unwrap();
            let b = e.encrypt(PlainValue::uint(u64::from(y), IntWidth::W32)).unwrap();
            e.authorize(a).unwrap();
            e.authorize(b).unwrap();
            let gt = e.compare(Comparison::Gt, a, b).unwrap();
            let max = e.select(gt, a, b).unwrap();
            e.grant(gt, admin, crate::Scope::Reveal).unwrap();
            e.grant(max, admin, crate::Scope::Reveal).unwrap();
            prop_assert_eq!(e.reveal(gt, admin).unwrap(), PlainValue::bool(x > y));
            prop_assert_eq!(
                e.reveal(max, admin).unwrap(),
                PlainValue::uint(u64::from(x.max(y)), IntWidth::W32)
            );
        }
    }
}
