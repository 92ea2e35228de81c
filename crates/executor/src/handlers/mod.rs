//! Command handlers organized by entity.
//!
//! | Module | Commands | Entity |
//! |--------|----------|--------|
//! | `case_execution` | 9 | CaseExecution transitions |
//! | `case_instance` | 1 | CaseExecution tree from a definition |
//! | `task` | 2 | Task |
//! | `job` | 1 | Job |
//! | `read` | 4 | all |
//!
//! Each module also declares the permission checks of its commands.

pub mod case_execution;
pub mod case_instance;
pub mod job;
pub mod read;
pub mod task;
