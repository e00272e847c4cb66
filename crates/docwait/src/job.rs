//! Job identity and status domain types.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a submitted analysis job.
///
/// Assigned by the external service at submission time; carries no behavior,
/// only identity used for subsequent status and result queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by the external service.
///
/// The service is the sole authority on status; nothing in this crate
/// infers status on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// One status observation for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    /// Service-provided detail, set on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn with_message(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }
}

/// Full output of a succeeded job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Terminal status echoed by the result endpoint.
    pub status: JobStatus,
    /// Opaque analysis payload; the waiter never looks inside it.
    pub output: serde_json::Value,
}

/// Where the document to analyze lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub bucket: String,
    pub key: String,
}

impl DocumentLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Analysis features that can be requested at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    Forms,
    Tables,
    Queries,
    Signatures,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forms => "forms",
            Self::Tables => "tables",
            Self::Queries => "queries",
            Self::Signatures => "signatures",
        }
    }
}
