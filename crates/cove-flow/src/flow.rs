//! # Workflow Engine
//!
//! The orchestrator tying the engine core to containers and workflow
//! instances. It owns the one `submit → derive → finalize` lifecycle that
//! every confidential application shares:
//!
//! - **submit**: encrypt the inputs, authorize them for computation,
//!   count the instance against its container, record it `Open`.
//! - **derive**: freeze the workflow's derived handles — the output of
//!   whatever engine computation the application ran for this kind
//!   (an AND for an eligibility check, a comparison plus `select` fold
//!   for an auction, an EQ for a guessing game). An empty derivation
//!   marks a record-keeping workflow: the inputs themselves become the
//!   derived set.
//! - **finalize**: administrator-only. Grants `Reveal` on the derived
//!   handles to the parties owed visibility, marks the instance
//!   processed, and closes the lifecycle for good.
//!
//! Winner determination across competing instances (an auction's highest
//! bid, a game's correct guess) is deliberately **not** computed here:
//! picking one global winner from still-opaque handles requires a reveal,
//! so it stays an explicit reveal-and-compare act by an authorized party.
//!
//! Each mutating call validates everything before touching state, so a
//! failed call leaves the engine exactly as it found it.

use std::collections::HashMap;

use cove_backend::EncryptionBackend;
use cove_core::{ContainerId, EngineError, HandleId, PlainValue, PrincipalId, WorkflowId};
use cove_engine::{Engine, Scope};

use crate::container::{Container, ContainerRegistry};
use crate::workflow::{WorkflowInstance, WorkflowState};

/// The full confidential workflow engine.
pub struct WorkflowEngine<B: EncryptionBackend> {
    engine: Engine<B>,
    containers: ContainerRegistry,
    workflows: HashMap<WorkflowId, WorkflowInstance>,
}

impl<B: EncryptionBackend> WorkflowEngine<B> {
    /// Create a workflow engine over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            engine: Engine::new(backend),
            containers: ContainerRegistry::new(),
            workflows: HashMap::new(),
        }
    }

    /// Read access to the engine core.
    pub fn engine(&self) -> &Engine<B> {
        &self.engine
    }

    /// Mutable access to the engine core, for running the operation
    /// algebra during a workflow's derivation step.
    pub fn engine_mut(&mut self) -> &mut Engine<B> {
        &mut self.engine
    }

    /// Read access to the container registry.
    pub fn containers(&self) -> &ContainerRegistry {
        &self.containers
    }

    // ─── Containers ──────────────────────────────────────────────────

    /// Create a container. Always succeeds.
    pub fn create_container(
        &mut self,
        admin: PrincipalId,
        name: impl Into<String>,
        description: impl Into<String>,
        capacity: u32,
    ) -> ContainerId {
        self.containers.create(admin, name, description, capacity)
    }

    /// Flip a container's active flag. Admin-only.
    pub fn toggle_container(
        &mut self,
        id: ContainerId,
        caller: PrincipalId,
    ) -> Result<bool, EngineError> {
        self.containers.toggle(id, caller)
    }

    /// Look up a container.
    pub fn container(&self, id: ContainerId) -> Result<&Container, EngineError> {
        self.containers.get(id)
    }

    // ─── Workflow lifecycle ──────────────────────────────────────────

    /// Submit a workflow instance: encrypt every input, authorize each
    /// for computation, and record the instance `Open`.
    ///
    /// # Errors
    ///
    /// `ProgramClosed` / `ProgramFull` if the container does not accept
    /// the submission, and `Backend` if any input fails to encrypt — in
    /// every failure case nothing is created: no handles, no grants, no
    /// count change. Inputs are encrypted as a batch, so a backend
    /// failure on a later input cannot leave earlier ones behind.
    pub fn submit(
        &mut self,
        container: ContainerId,
        submitter: PrincipalId,
        inputs: Vec<PlainValue>,
    ) -> Result<WorkflowId, EngineError> {
        self.containers.ensure_open(container)?;
        let handles = self.engine.encrypt_batch(inputs)?;
        for &handle in &handles {
            self.engine.authorize(handle)?;
        }
        self.containers.add_instance(container)?;
        let instance = WorkflowInstance::new(container, submitter, handles);
        let id = instance.id;
        tracing::debug!(workflow = %id, %container, %submitter, inputs = instance.inputs.len(), "workflow submitted");
        self.workflows.insert(id, instance);
        Ok(id)
    }

    /// Freeze a workflow's derived handles, moving `Open → Derived`.
    ///
    /// Pass the handles produced by this workflow kind's computation. An
    /// empty list marks a record-keeping workflow: the inputs themselves
    /// become the derived set. Derived values are immutable once
    /// recorded; re-deriving fails `AlreadyProcessed`.
    pub fn derive(
        &mut self,
        workflow: WorkflowId,
        derived: Vec<HandleId>,
    ) -> Result<(), EngineError> {
        let instance = self.lookup(workflow)?;
        if instance.state != WorkflowState::Open {
            return Err(EngineError::AlreadyProcessed(workflow));
        }
        for &handle in &derived {
            if !self.engine.store().contains(handle) {
                return Err(EngineError::UnknownHandle(handle));
            }
            if !self
                .engine
                .check(handle, self.engine.context(), Scope::InternalUse)
            {
                return Err(EngineError::UnauthorizedOperand(handle));
            }
        }
        let instance = self.lookup_mut(workflow)?;
        instance.derived = if derived.is_empty() {
            instance.inputs.clone()
        } else {
            derived
        };
        instance.transition(WorkflowState::Derived);
        tracing::debug!(%workflow, derived = instance.derived.len(), "workflow derived");
        Ok(())
    }

    /// Finalize a workflow, moving `Derived → Finalized`. Terminal.
    ///
    /// Admin-only. Grants `Reveal` on every derived handle to every
    /// principal in `reveal_to` (the submitter, the administrator, or
    /// both, depending on workflow kind), and marks the instance
    /// processed. A second call fails `AlreadyProcessed` and re-grants
    /// nothing.
    pub fn finalize(
        &mut self,
        workflow: WorkflowId,
        caller: PrincipalId,
        reveal_to: &[PrincipalId],
    ) -> Result<(), EngineError> {
        let instance = self.lookup(workflow)?;
        let (container, state, derived) =
            (instance.container, instance.state, instance.derived.clone());
        if caller != self.containers.get(container)?.admin {
            return Err(EngineError::Unauthorized(caller));
        }
        match state {
            WorkflowState::Finalized => return Err(EngineError::AlreadyProcessed(workflow)),
            WorkflowState::Open => return Err(EngineError::NotDerived(workflow)),
            WorkflowState::Derived => {}
        }
        for &handle in &derived {
            for &principal in reveal_to {
                self.engine.grant(handle, principal, Scope::Reveal)?;
            }
        }
        let instance = self.lookup_mut(workflow)?;
        instance.processed = true;
        instance.transition(WorkflowState::Finalized);
        tracing::debug!(%workflow, recipients = reveal_to.len(), "workflow finalized");
        Ok(())
    }

    /// Look up a workflow instance.
    pub fn workflow(&self, id: WorkflowId) -> Result<&WorkflowInstance, EngineError> {
        self.lookup(id)
    }

    /// Iterate over all workflow instances.
    pub fn workflows(&self) -> impl Iterator<Item = &WorkflowInstance> {
        self.workflows.values()
    }

    /// Reveal a handle's plaintext for a principal holding a `Reveal`
    /// grant. Delegates to the engine's gated reveal path.
    pub fn reveal(
        &self,
        handle: HandleId,
        principal: PrincipalId,
    ) -> Result<PlainValue, EngineError> {
        self.engine.reveal(handle, principal)
    }

    fn lookup(&self, id: WorkflowId) -> Result<&WorkflowInstance, EngineError> {
        self.workflows
            .get(&id)
            .ok_or_else(|| EngineError::InvalidReference(id.to_string()))
    }

    fn lookup_mut(&mut self, id: WorkflowId) -> Result<&mut WorkflowInstance, EngineError> {
        self.workflows
            .get_mut(&id)
            .ok_or_else(|| EngineError::InvalidReference(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cove_backend::{ArithBinary, BoolBinary, Ciphertext, ClearBackend, Comparison};
    use cove_core::{BackendError, IntWidth};

    fn flow() -> WorkflowEngine<ClearBackend> {
        WorkflowEngine::new(ClearBackend::with_seed(99))
    }

    /// A backend that refuses to encrypt after a fixed number of
    /// plaintexts, delegating everything else to `ClearBackend`.
    struct RejectingBackend {
        inner: ClearBackend,
        allow: usize,
    }

    impl RejectingBackend {
        fn new(allow: usize) -> Self {
            Self {
                inner: ClearBackend::with_seed(7),
                allow,
            }
        }
    }

    impl EncryptionBackend for RejectingBackend {
        fn encrypt(&mut self, value: PlainValue) -> Result<Ciphertext, BackendError> {
            if self.allow == 0 {
                return Err(BackendError::Unsupported("plaintext rejected".to_string()));
            }
            self.allow -= 1;
            self.inner.encrypt(value)
        }

        fn decrypt(&self, ciphertext: &Ciphertext) -> Result<PlainValue, BackendError> {
            self.inner.decrypt(ciphertext)
        }

        fn bool_binary(
            &mut self,
            op: BoolBinary,
            a: &Ciphertext,
            b: &Ciphertext,
        ) -> Result<Ciphertext, BackendError> {
            self.inner.bool_binary(op, a, b)
        }

        fn bool_not(&mut self, a: &Ciphertext) -> Result<Ciphertext, BackendError> {
            self.inner.bool_not(a)
        }

        fn arith_binary(
            &mut self,
            op: ArithBinary,
            a: &Ciphertext,
            b: &Ciphertext,
        ) -> Result<Ciphertext, BackendError> {
            self.inner.arith_binary(op, a, b)
        }

        fn compare(
            &mut self,
            op: Comparison,
            a: &Ciphertext,
            b: &Ciphertext,
        ) -> Result<Ciphertext, BackendError> {
            self.inner.compare(op, a, b)
        }

        fn select(
            &mut self,
            condition: &Ciphertext,
            if_true: &Ciphertext,
            if_false: &Ciphertext,
        ) -> Result<Ciphertext, BackendError> {
            self.inner.select(condition, if_true, if_false)
        }
    }

    fn bools(values: &[bool]) -> Vec<PlainValue> {
        values.iter().map(|&b| PlainValue::bool(b)).collect()
    }

    #[test]
    fn test_submit_encrypts_and_authorizes_inputs() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let applicant = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, applicant, bools(&[true, false])).unwrap();
        let instance = f.workflow(w).unwrap();
        assert_eq!(instance.state, WorkflowState::Open);
        assert_eq!(instance.inputs.len(), 2);
        let ctx = f.engine().context();
        for &h in &f.workflow(w).unwrap().inputs.clone() {
            assert!(f.engine().check(h, ctx, Scope::InternalUse));
        }
        assert_eq!(f.container(c).unwrap().instance_count, 1);
    }

    #[test]
    fn test_submit_to_full_container_changes_nothing() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "one-slot", "", 1);
        f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        let handles_before = f.engine().store().len();
        let err = f.submit(c, PrincipalId::new(), bools(&[true]));
        assert_eq!(err, Err(EngineError::ProgramFull(c, 1)));
        assert_eq!(f.container(c).unwrap().instance_count, 1);
        assert_eq!(f.engine().store().len(), handles_before);
    }

    #[test]
    fn test_failed_input_encryption_leaves_no_state() {
        // Backend accepts the first plaintext and rejects the second:
        // the whole submission must leave no handle, grant, count, or
        // instance behind.
        let mut f = WorkflowEngine::new(RejectingBackend::new(1));
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let result = f.submit(c, PrincipalId::new(), bools(&[true, true]));
        assert!(matches!(result, Err(EngineError::Backend(_))));
        assert_eq!(f.engine().store().len(), 0);
        assert_eq!(f.engine().permissions().len(), 0);
        assert_eq!(f.container(c).unwrap().instance_count, 0);
        assert_eq!(f.workflows().count(), 0);
    }

    #[test]
    fn test_submit_to_inactive_container_fails_closed() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "paused", "", 5);
        f.toggle_container(c, admin).unwrap();
        assert_eq!(
            f.submit(c, PrincipalId::new(), bools(&[true])),
            Err(EngineError::ProgramClosed(c))
        );
    }

    #[test]
    fn test_derive_freezes_computed_handles() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true, true])).unwrap();
        let inputs = f.workflow(w).unwrap().inputs.clone();
        let and = f
            .engine_mut()
            .bool_binary(BoolBinary::And, inputs[0], inputs[1])
            .unwrap();
        f.derive(w, vec![and]).unwrap();
        let instance = f.workflow(w).unwrap();
        assert_eq!(instance.state, WorkflowState::Derived);
        assert_eq!(instance.derived, vec![and]);
    }

    #[test]
    fn test_empty_derivation_uses_inputs() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "records", "", 10);
        let w = f
            .submit(
                c,
                PrincipalId::new(),
                vec![PlainValue::uint(120, IntWidth::W16)],
            )
            .unwrap();
        f.derive(w, vec![]).unwrap();
        let instance = f.workflow(w).unwrap();
        assert_eq!(instance.derived, instance.inputs);
        assert_eq!(instance.state, WorkflowState::Derived);
    }

    #[test]
    fn test_rederive_rejected() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        f.derive(w, vec![]).unwrap();
        assert_eq!(f.derive(w, vec![]), Err(EngineError::AlreadyProcessed(w)));
    }

    #[test]
    fn test_derive_rejects_unknown_handle() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        let stranger = HandleId::new();
        assert_eq!(
            f.derive(w, vec![stranger]),
            Err(EngineError::UnknownHandle(stranger))
        );
        assert_eq!(f.workflow(w).unwrap().state, WorkflowState::Open);
    }

    #[test]
    fn test_finalize_is_admin_only() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        f.derive(w, vec![]).unwrap();
        let outsider = PrincipalId::new();
        assert_eq!(
            f.finalize(w, outsider, &[]),
            Err(EngineError::Unauthorized(outsider))
        );
    }

    #[test]
    fn test_finalize_before_derive_fails() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        assert_eq!(f.finalize(w, admin, &[]), Err(EngineError::NotDerived(w)));
    }

    #[test]
    fn test_second_finalize_fails_and_regrants_nothing() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let submitter = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, submitter, bools(&[true])).unwrap();
        f.derive(w, vec![]).unwrap();
        f.finalize(w, admin, &[submitter, admin]).unwrap();
        let grants = f.engine().permissions().len();
        let transitions = f.workflow(w).unwrap().transitions.len();
        assert_eq!(
            f.finalize(w, admin, &[submitter, admin]),
            Err(EngineError::AlreadyProcessed(w))
        );
        assert_eq!(f.engine().permissions().len(), grants);
        assert_eq!(f.workflow(w).unwrap().transitions.len(), transitions);
    }

    #[test]
    fn test_finalize_works_on_inactive_container() {
        let mut f = flow();
        let admin = PrincipalId::new();
        let c = f.create_container(admin, "program", "", 10);
        let w = f.submit(c, PrincipalId::new(), bools(&[true])).unwrap();
        f.derive(w, vec![]).unwrap();
        f.toggle_container(c, admin).unwrap();
        assert!(f.finalize(w, admin, &[admin]).is_ok());
        assert!(f.workflow(w).unwrap().processed);
    }
}
