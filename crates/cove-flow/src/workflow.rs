//! # Workflow Instances
//!
//! One submitted record — an application, ballot, bid, guess, or health
//! record — moving through `Open → Derived → Finalized`. Instances are
//! append-only audit records: created on submission, transitioned at most
//! twice, never deleted.
//!
//! Every transition is appended to the instance's transition log with its
//! timestamp, so the lifecycle of a submission can be audited after the
//! fact without trusting anyone's memory of it.

use serde::{Deserialize, Serialize};

use cove_core::{ContainerId, HandleId, PrincipalId, Timestamp, WorkflowId};

/// Processing state of a workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Submitted; inputs encrypted and authorized for computation.
    Open,
    /// The derived value(s) for this workflow kind exist and are frozen.
    Derived,
    /// Finalized by the administrator; reveal grants issued. Terminal.
    Finalized,
}

impl WorkflowState {
    /// Canonical state name.
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Open => "OPEN",
            WorkflowState::Derived => "DERIVED",
            WorkflowState::Finalized => "FINALIZED",
        }
    }

    /// Whether no further transitions are permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Finalized)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry in a workflow's transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from: WorkflowState,
    /// State after the transition.
    pub to: WorkflowState,
    /// When the transition happened.
    pub at: Timestamp,
}

/// A submitted workflow instance, owned by exactly one container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// Opaque workflow identifier.
    pub id: WorkflowId,
    /// The owning container.
    pub container: ContainerId,
    /// The submitting principal.
    pub submitter: PrincipalId,
    /// The fixed ordered set of encrypted input handles.
    pub inputs: Vec<HandleId>,
    /// Derived handles, frozen once recorded. For record-keeping
    /// workflow kinds these are the inputs themselves.
    pub derived: Vec<HandleId>,
    /// Current processing state.
    pub state: WorkflowState,
    /// Whether the administrator has finalized this instance.
    pub processed: bool,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Append-only transition log.
    pub transitions: Vec<TransitionRecord>,
}

impl WorkflowInstance {
    /// Create a freshly submitted instance in the `Open` state.
    pub(crate) fn new(
        container: ContainerId,
        submitter: PrincipalId,
        inputs: Vec<HandleId>,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            container,
            submitter,
            inputs,
            derived: Vec::new(),
            state: WorkflowState::Open,
            processed: false,
            submitted_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    /// Move to `to`, appending a transition record.
    pub(crate) fn transition(&mut self, to: WorkflowState) {
        let from = self.state;
        self.state = to;
        self.transitions.push(TransitionRecord {
            from,
            to,
            at: Timestamp::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_instance_is_open() {
        let w = WorkflowInstance::new(ContainerId::new(), PrincipalId::new(), vec![]);
        assert_eq!(w.state, WorkflowState::Open);
        assert!(!w.processed);
        assert!(w.transitions.is_empty());
    }

    #[test]
    fn test_transition_appends_to_log() {
        let mut w = WorkflowInstance::new(ContainerId::new(), PrincipalId::new(), vec![]);
        w.transition(WorkflowState::Derived);
        w.transition(WorkflowState::Finalized);
        assert_eq!(w.transitions.len(), 2);
        assert_eq!(w.transitions[0].from, WorkflowState::Open);
        assert_eq!(w.transitions[1].to, WorkflowState::Finalized);
    }

    #[test]
    fn test_only_finalized_is_terminal() {
        assert!(!WorkflowState::Open.is_terminal());
        assert!(!WorkflowState::Derived.is_terminal());
        assert!(WorkflowState::Finalized.is_terminal());
    }
}
