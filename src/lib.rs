//! Cadence - transactional command-execution core for case orchestration
//!
//! Every operation is a command run through one pipeline: logging,
//! optimistic-lock retry, unit-of-work management and authorization, then
//! the command itself. Each command is one atomic unit of work.
//!
//! # Quick Start
//!
//! ```ignore
//! use cadence::{Cadence, Caller, Variables, VariableMutations};
//!
//! let engine = Cadence::builder()
//!     .configure(|b| b.with_definitions(definitions))
//!     .build()?;
//!
//! let case = engine.create_case_instance("loan", Some("LN-1"), Variables::new())?;
//!
//! let kermit = engine.as_user(Caller::user("kermit"));
//! kermit.claim_task(&task_id, "kermit")?;
//! kermit.complete_task(&task_id, VariableMutations::new().set("approved", true))?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`CommandExecutor`], which provides the
//! command-based API. The [`Cadence`] struct provides a typed high-level
//! interface over it.
//!
//! Sessions, the entity store and the interceptors live in the internal
//! crates; only what callers and custom commands need is re-exported.

// Re-export the public API from cadence-executor
pub use cadence_executor::*;
