//! Job operations.

use cadence_core::{EngineError, EngineResult, Job};

use super::Cadence;
use crate::{EngineCommand, Output};

impl Cadence {
    /// Change a job's priority.
    pub fn set_job_priority(&self, job_id: &str, priority: i64) -> EngineResult<()> {
        match self.execute(&EngineCommand::SetJobPriority {
            job_id: job_id.to_string(),
            priority,
        })? {
            Output::Unit => Ok(()),
            _ => Err(EngineError::internal("Unexpected output for SetJobPriority")),
        }
    }

    /// Load a job.
    pub fn job(&self, job_id: &str) -> EngineResult<Job> {
        match self.execute(&EngineCommand::GetJob {
            job_id: job_id.to_string(),
        })? {
            Output::Job(job) => Ok(job),
            _ => Err(EngineError::internal("Unexpected output for GetJob")),
        }
    }
}
