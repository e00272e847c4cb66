//! Job submission.

use std::sync::Arc;

use crate::backend::{AnalysisBackend, SubmitError};
use crate::job::{DocumentLocation, FeatureType, JobId};

/// Issues the initial start request and returns the opaque job id.
///
/// Submission failures propagate immediately to the caller; no poller is
/// started and nothing is retried here.
pub struct Submitter {
    backend: Arc<dyn AnalysisBackend>,
}

impl Submitter {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub async fn submit(
        &self,
        location: &DocumentLocation,
        features: &[FeatureType],
    ) -> Result<JobId, SubmitError> {
        if features.is_empty() {
            return Err(SubmitError::InvalidRequest(
                "at least one feature type is required".to_string(),
            ));
        }

        let job_id = self.backend.start_analysis(location, features).await?;
        tracing::info!(
            %job_id,
            bucket = %location.bucket,
            key = %location.key,
            "Analysis job started"
        );
        Ok(job_id)
    }
}
