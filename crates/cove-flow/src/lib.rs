//! # cove-flow — Confidential Workflow Layer
//!
//! The lifecycle layer over the Cove engine core:
//!
//! - **Container registry** (`container.rs`): capacity-bounded containers
//!   of workflow instances — a scholarship program, an auction lot, a
//!   proposal, a game. Admin-gated toggling, per-container instance
//!   counts, no global counters.
//!
//! - **Workflow instances** (`workflow.rs`): `Open → Derived → Finalized`
//!   append-only records with a timestamped transition log.
//!
//! - **Workflow engine** (`flow.rs`): the submit/derive/finalize
//!   orchestration — inputs encrypted and authorized on submission,
//!   derived handles frozen once, reveal grants issued only at
//!   administrator finalization.
//!
//! - **Snapshot** (`snapshot.rs`): the engine's entire state as four
//!   flat, append-mostly serde tables (handles, grants, containers,
//!   workflows).
//!
//! ## Crate Policy
//!
//! - Depends on `cove-core`, `cove-backend`, and `cove-engine` internally.
//! - No plaintext access anywhere in this crate except via the engine's
//!   gated reveal path.
//! - Mutating calls are all-or-nothing: validation precedes every effect.

pub mod container;
pub mod flow;
pub mod snapshot;
pub mod workflow;

pub use container::{Container, ContainerRegistry};
pub use flow::WorkflowEngine;
pub use snapshot::{EngineSnapshot, GrantRow, HandleRow};
pub use workflow::{TransitionRecord, WorkflowInstance, WorkflowState};
