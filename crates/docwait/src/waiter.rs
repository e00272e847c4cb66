//! Wait orchestration.
//!
//! `Waiter::wait_for_completion` spawns one poller task, races its
//! completion signal against the deadline, cancels on timeout, and fetches
//! the result exactly once on success. The per-call `WaitContext` owns the
//! poller task and cancellation token; dropping it on any exit path cancels
//! the token and aborts the task, so no background work outlives the call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::AnalysisBackend;
use crate::fetch::ResultFetcher;
use crate::job::{AnalysisOutput, JobId, JobStatus};
use crate::poller::{PollConfig, PollEvent, StatusPoller};

#[derive(Clone, Default)]
pub struct WaitConfig {
    pub poll: PollConfig,
    /// How long to wait after cancellation for the poller to acknowledge
    /// and exit. Defaults to one poll interval.
    pub grace: Option<Duration>,
}

impl WaitConfig {
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    fn effective_grace(&self) -> Duration {
        self.grace.unwrap_or_else(|| self.poll.backoff.delay(1))
    }
}

/// Result of one full wait invocation.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The job succeeded and its output was fetched.
    Completed(AnalysisOutput),
    /// No terminal status within the deadline. Inconclusive, not a failure;
    /// the job may still be running on the service.
    TimedOut,
    /// The caller's cancellation token fired before a terminal status.
    Cancelled,
    /// The job failed, a query failed fatally, or the fetch failed.
    Failed(String),
}

impl WaitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Per-call state: one poller task, one cancellation token.
///
/// Dropped when the wait returns, on every exit path.
struct WaitContext {
    cancel: CancellationToken,
    poller: JoinHandle<()>,
}

impl Drop for WaitContext {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.poller.abort();
    }
}

pub struct Waiter {
    backend: Arc<dyn AnalysisBackend>,
    fetcher: ResultFetcher,
    config: WaitConfig,
}

impl Waiter {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: WaitConfig) -> Self {
        Self {
            fetcher: ResultFetcher::new(Arc::clone(&backend)),
            backend,
            config,
        }
    }

    /// Wait until the job completes or `timeout` elapses.
    pub async fn wait_for_completion(&self, job_id: &JobId, timeout: Duration) -> WaitOutcome {
        self.wait_with_cancellation(job_id, timeout, CancellationToken::new())
            .await
    }

    /// Like [`Waiter::wait_for_completion`], with a caller-supplied token
    /// for external abort. The token is set at most once per wait (by the
    /// caller or by the deadline, whichever comes first).
    pub async fn wait_with_cancellation(
        &self,
        job_id: &JobId,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> WaitOutcome {
        let (signal_tx, signal_rx) = oneshot::channel();
        let poller = StatusPoller::new(Arc::clone(&self.backend), self.config.poll.clone());
        let mut ctx = WaitContext {
            cancel: cancel.clone(),
            poller: tokio::spawn(poller.run(job_id.clone(), signal_tx, cancel)),
        };

        // The signal is single-producer/single-consumer: the poller pushes
        // exactly one event, so at most one terminal event is ever observed.
        tokio::select! {
            event = signal_rx => match event {
                Ok(event) => self.resolve(job_id, event).await,
                // Poller panicked between spawn and send.
                Err(_) => {
                    tracing::error!(%job_id, "Status poller dropped its completion signal");
                    WaitOutcome::Failed("status poller exited without reporting".to_string())
                }
            },
            _ = tokio::time::sleep(timeout) => self.expire(job_id, &mut ctx).await,
        }
    }

    async fn resolve(&self, job_id: &JobId, event: PollEvent) -> WaitOutcome {
        match event {
            PollEvent::Terminal(snapshot) if snapshot.status == JobStatus::Succeeded => {
                // The single fetch of this wait.
                match self.fetcher.fetch(job_id).await {
                    Ok(output) => WaitOutcome::Completed(output),
                    Err(e) => WaitOutcome::Failed(e.to_string()),
                }
            }
            PollEvent::Terminal(snapshot) => WaitOutcome::Failed(
                snapshot
                    .message
                    .unwrap_or_else(|| "analysis job failed".to_string()),
            ),
            PollEvent::HardError(reason) => WaitOutcome::Failed(reason),
            PollEvent::Cancelled => WaitOutcome::Cancelled,
        }
    }

    /// Deadline elapsed: cancel the poller and give it a bounded grace
    /// period to exit. The grace bound guarantees this call returns even if
    /// the poller is wedged in a query that never resolves.
    async fn expire(&self, job_id: &JobId, ctx: &mut WaitContext) -> WaitOutcome {
        ctx.cancel.cancel();
        let grace = self.config.effective_grace();
        match tokio::time::timeout(grace, &mut ctx.poller).await {
            Ok(_) => {
                tracing::info!(%job_id, "Wait deadline elapsed, poller stopped");
                WaitOutcome::TimedOut
            }
            Err(_) => {
                tracing::error!(
                    %job_id,
                    grace_ms = grace.as_millis() as u64,
                    "Status poller failed to stop within grace period"
                );
                ctx.poller.abort();
                WaitOutcome::Failed(
                    "status poller failed to stop within grace period".to_string(),
                )
            }
        }
    }
}
