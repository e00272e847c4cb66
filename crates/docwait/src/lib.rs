//! docwait: completion-waiting client for long-running document analysis jobs.
//!
//! Submit a job, then wait for it: a background poller queries the service
//! until the job reaches a terminal status, the waiter races that poller
//! against a deadline, and the result is fetched exactly once on success.

mod backend;
mod backoff;
mod fetch;
mod job;
mod poller;
mod submit;
mod waiter;

pub mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use tokio_util::sync::CancellationToken;

pub use backend::{AnalysisBackend, FetchError, QueryError, SubmitError};
pub use backoff::{Backoff, ExponentialBackoff, FixedInterval};
pub use fetch::ResultFetcher;
pub use job::{AnalysisOutput, DocumentLocation, FeatureType, JobId, JobStatus, StatusSnapshot};
pub use poller::{PollConfig, PollEvent, StatusPoller};
pub use submit::Submitter;
pub use waiter::{WaitConfig, WaitOutcome, Waiter};
