//! Scripted in-memory backend for exercising the wait protocol in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;

use crate::backend::{AnalysisBackend, FetchError, QueryError, SubmitError};
use crate::job::{AnalysisOutput, DocumentLocation, FeatureType, JobId, JobStatus, StatusSnapshot};

/// Backend whose responses are scripted up front.
///
/// Status responses are consumed front to back; once the script runs out,
/// every further query reports `InProgress` so deadline paths can be tested
/// against a job that never finishes.
pub(crate) struct ScriptedBackend {
    job_id: String,
    start_error: Mutex<Option<SubmitError>>,
    statuses: Mutex<VecDeque<Result<StatusSnapshot, QueryError>>>,
    hang_status: bool,
    result_status: JobStatus,
    output: serde_json::Value,
    fetch_error: Mutex<Option<FetchError>>,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    status_query_times: Mutex<Vec<Instant>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            job_id: "job-1".to_string(),
            start_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            hang_status: false,
            result_status: JobStatus::Succeeded,
            output: serde_json::json!({"blocks": []}),
            fetch_error: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            status_query_times: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_job_id(mut self, id: impl Into<String>) -> Self {
        self.job_id = id.into();
        self
    }

    pub(crate) fn with_start_error(self, err: SubmitError) -> Self {
        *self.start_error.lock().unwrap() = Some(err);
        self
    }

    pub(crate) fn with_statuses(
        self,
        statuses: Vec<Result<StatusSnapshot, QueryError>>,
    ) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Status queries never resolve. For grace-period paths.
    pub(crate) fn with_hanging_status(mut self) -> Self {
        self.hang_status = true;
        self
    }

    pub(crate) fn with_result_status(mut self, status: JobStatus) -> Self {
        self.result_status = status;
        self
    }

    pub(crate) fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = output;
        self
    }

    pub(crate) fn with_fetch_error(self, err: FetchError) -> Self {
        *self.fetch_error.lock().unwrap() = Some(err);
        self
    }

    pub(crate) fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_query_times(&self) -> Vec<Instant> {
        self.status_query_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn start_analysis(
        &self,
        _location: &DocumentLocation,
        _features: &[FeatureType],
    ) -> Result<JobId, SubmitError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.start_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(JobId::new(self.job_id.clone()))
    }

    async fn describe_status(&self, _job_id: &JobId) -> Result<StatusSnapshot, QueryError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_query_times.lock().unwrap().push(Instant::now());
        if self.hang_status {
            std::future::pending::<()>().await;
        }
        match self.statuses.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok(StatusSnapshot::new(JobStatus::InProgress)),
        }
    }

    async fn fetch_result(&self, _job_id: &JobId) -> Result<AnalysisOutput, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fetch_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(AnalysisOutput {
            status: self.result_status,
            output: self.output.clone(),
        })
    }
}
