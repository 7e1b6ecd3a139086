//! Errors - エラー型と分類
//!
//! Rejection of a duplicate submission is not represented here: it is a
//! normal outcome (`EnvelopeState::Rejected`), not a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StewardError {
    /// The ambient context could not be snapshotted. Fatal to the submission.
    #[error("context capture failed: {0}")]
    ContextCapture(String),

    /// The job body itself failed.
    #[error("job '{job}' failed: {message}")]
    Job { job: String, message: String },

    /// The tenant collaborator refused or failed to run the job.
    #[error("tenant '{0}' unavailable: {1}")]
    Tenant(String, String),

    /// The scheduler did not accept the unit of work.
    #[error("schedule rejected: {0}")]
    Schedule(String),
}

impl StewardError {
    pub fn job(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Job {
            job: job.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StewardError {
    fn from(e: serde_json::Error) -> Self {
        Self::ContextCapture(format!("snapshot round trip: {e}"))
    }
}
