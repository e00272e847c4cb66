//! Background status poller.
//!
//! One poller task per outstanding wait. The poller is the single producer
//! onto its completion signal: it pushes exactly one event and terminates.
//! Transient query failures are absorbed here up to a consecutive budget;
//! everything else is forwarded to the waiter through the signal.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::backend::AnalysisBackend;
use crate::backoff::{Backoff, FixedInterval};
use crate::job::{JobId, StatusSnapshot};

/// Polling cadence and retry budget.
#[derive(Clone)]
pub struct PollConfig {
    pub backoff: Arc<dyn Backoff>,
    /// Consecutive transient query failures tolerated before escalation.
    pub max_transient_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            backoff: Arc::new(FixedInterval::default()),
            max_transient_failures: 3,
        }
    }
}

impl PollConfig {
    /// Replace the backoff policy with a fixed interval between queries.
    pub fn with_interval(mut self, interval: std::time::Duration) -> Self {
        self.backoff = Arc::new(FixedInterval::new(interval));
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_transient_failures(mut self, max: u32) -> Self {
        self.max_transient_failures = max;
        self
    }
}

/// The one event a poller delivers on its completion signal.
#[derive(Debug)]
pub enum PollEvent {
    /// The job reached `Succeeded` or `Failed`.
    Terminal(StatusSnapshot),
    /// A fatal query failure, or the transient retry budget ran out.
    HardError(String),
    /// The cancellation token fired before the next query was issued.
    Cancelled,
}

pub struct StatusPoller {
    backend: Arc<dyn AnalysisBackend>,
    config: PollConfig,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: PollConfig) -> Self {
        Self { backend, config }
    }

    /// Poll until a terminal status, a hard error, or cancellation, then
    /// deliver exactly one event on `signal` and return.
    pub async fn run(
        self,
        job_id: JobId,
        signal: oneshot::Sender<PollEvent>,
        cancel: CancellationToken,
    ) {
        let event = self.poll_until_terminal(&job_id, &cancel).await;
        if signal.send(event).is_err() {
            tracing::debug!(%job_id, "Wait abandoned before poll event delivery");
        }
    }

    async fn poll_until_terminal(&self, job_id: &JobId, cancel: &CancellationToken) -> PollEvent {
        let mut queries: u32 = 0;
        let mut consecutive_transient: u32 = 0;

        loop {
            // No delay ahead of the first query.
            if queries > 0 {
                let delay = self.config.backoff.delay(queries);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return PollEvent::Cancelled,
                }
            }

            // Cancellation is honored before a query, never mid-flight.
            if cancel.is_cancelled() {
                return PollEvent::Cancelled;
            }

            queries += 1;
            match self.backend.describe_status(job_id).await {
                Ok(snapshot) if snapshot.status.is_terminal() => {
                    tracing::debug!(
                        %job_id,
                        status = snapshot.status.as_str(),
                        queries,
                        "Job reached terminal status"
                    );
                    return PollEvent::Terminal(snapshot);
                }
                Ok(snapshot) => {
                    consecutive_transient = 0;
                    tracing::debug!(%job_id, status = snapshot.status.as_str(), "Job still running");
                }
                Err(e) if e.is_transient() => {
                    consecutive_transient += 1;
                    if consecutive_transient > self.config.max_transient_failures {
                        tracing::warn!(
                            %job_id,
                            failures = consecutive_transient,
                            "Transient failure budget exhausted"
                        );
                        return PollEvent::HardError(format!(
                            "status query failed {consecutive_transient} consecutive times: {e}"
                        ));
                    }
                    tracing::warn!(
                        %job_id,
                        failures = consecutive_transient,
                        error = %e,
                        "Transient status query failure, retrying"
                    );
                }
                Err(e) => {
                    tracing::error!(%job_id, error = %e, "Fatal status query failure");
                    return PollEvent::HardError(e.to_string());
                }
            }
        }
    }
}
