//! # cove-core — Foundational Types for the Cove Engine
//!
//! This crate is the bedrock of the Cove confidential value engine. It defines
//! the type-system primitives the rest of the workspace builds on. Every other
//! crate depends on `cove-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `HandleId`, `PrincipalId`,
//!    `ContainerId`, `WorkflowId` — all UUID newtypes. No bare strings or
//!    integers for identifiers, so a workflow id can never be passed where a
//!    handle id is expected.
//!
//! 2. **A closed value-type lattice.** Encrypted values are booleans or
//!    unsigned integers of a bounded width set (8/16/32/64 bits). `ValueType`
//!    is the declared type of a handle and never changes after creation;
//!    `PlainValue` is the plaintext shape that crosses the backend seam, with
//!    constructors that mask out-of-range integers at construction.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with seconds
//!    precision; non-UTC inputs are rejected at parse time, not converted
//!    silently.
//!
//! 4. **Structured errors.** One `EngineError` enum carries every
//!    caller-recoverable failure kind of the engine; `BackendError` covers
//!    the cryptographic seam. All errors carry the offending identifiers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cove-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{BackendError, EngineError};
pub use identity::{ContainerId, HandleId, PrincipalId, WorkflowId};
pub use temporal::Timestamp;
pub use value::{IntWidth, PlainValue, ValueType};
