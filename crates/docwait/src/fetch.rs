//! Final result retrieval.

use std::sync::Arc;

use crate::backend::{AnalysisBackend, FetchError};
use crate::job::{AnalysisOutput, JobId, JobStatus};

/// Performs the single final query that retrieves the full output after a
/// job has been observed `Succeeded`.
pub struct ResultFetcher {
    backend: Arc<dyn AnalysisBackend>,
}

impl ResultFetcher {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, job_id: &JobId) -> Result<AnalysisOutput, FetchError> {
        let output = self.backend.fetch_result(job_id).await?;
        if output.status != JobStatus::Succeeded {
            // The status endpoint said succeeded but the result endpoint
            // disagrees; the external state is inconsistent.
            return Err(FetchError::Inconsistent(format!(
                "result endpoint reports status {}",
                output.status.as_str()
            )));
        }
        tracing::debug!(%job_id, "Analysis results collected");
        Ok(output)
    }
}
