//! Abstract document-analysis service capability.
//!
//! The submitter, poller and fetcher all talk to the service through this
//! trait so the transport (REST, RPC, SDK) stays out of the wait protocol.
//! The backend is always an explicit injected dependency; there is no
//! process-wide service handle.

use async_trait::async_trait;

use crate::job::{AnalysisOutput, DocumentLocation, FeatureType, JobId, StatusSnapshot};

/// Why a submission was rejected.
///
/// All variants are caller-correctable, not transient; submission is never
/// retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),

    #[error("not authorized to start analysis: {0}")]
    Unauthorized(String),

    #[error("submission throttled by service: {0}")]
    Throttled(String),

    #[error("service error during submission: {0}")]
    Service(String),
}

/// Why a status query failed.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Network blip, throttling - worth retrying on the next poll.
    #[error("transient status query failure: {0}")]
    Transient(String),

    /// Malformed response, unknown job - retrying cannot help.
    #[error("fatal status query failure: {0}")]
    Fatal(String),
}

impl QueryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// The service could not return the result of an already-succeeded job.
///
/// Inconsistent external state; not retried at this layer. The caller may
/// choose to retry the entire wait.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("result not available for succeeded job: {0}")]
    Inconsistent(String),

    #[error("service error fetching result: {0}")]
    Service(String),
}

/// The three operations the wait protocol needs from the external service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Start an analysis job for the document at `location`.
    async fn start_analysis(
        &self,
        location: &DocumentLocation,
        features: &[FeatureType],
    ) -> Result<JobId, SubmitError>;

    /// Query the current status of a job.
    async fn describe_status(&self, job_id: &JobId) -> Result<StatusSnapshot, QueryError>;

    /// Retrieve the full output of a job. Only meaningful once the job
    /// has been observed `Succeeded`.
    async fn fetch_result(&self, job_id: &JobId) -> Result<AnalysisOutput, FetchError>;
}
