//! HTTP implementation of the analysis backend.
//!
//! Talks to a JSON-over-HTTP document-analysis API:
//! - `POST {base}/v1/analyses` starts a job
//! - `GET  {base}/v1/analyses/{id}` reports status
//! - `GET  {base}/v1/analyses/{id}/result` returns the full output
//!
//! Transport errors and 429/5xx status responses classify as transient so
//! the poller's retry budget absorbs them; everything else is fatal.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{AnalysisBackend, FetchError, QueryError, SubmitError};
use crate::job::{AnalysisOutput, DocumentLocation, FeatureType, JobId, StatusSnapshot};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token attached to every request when set.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

pub struct AnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct StartAnalysisRequest<'a> {
    bucket: &'a str,
    key: &'a str,
    feature_types: &'a [FeatureType],
}

#[derive(Deserialize)]
struct StartAnalysisResponse {
    job_id: JobId,
}

impl AnalysisClient {
    pub fn new(config: ClientConfig) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = config.auth_token
            && let Ok(value) = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
        {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body)
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn start_analysis(
        &self,
        location: &DocumentLocation,
        features: &[FeatureType],
    ) -> Result<JobId, SubmitError> {
        let url = format!("{}/v1/analyses", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&StartAnalysisRequest {
                bucket: &location.bucket,
                key: &location.key,
                feature_types: features,
            })
            .send()
            .await
            .map_err(|e| SubmitError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = error_body(response).await;
            return Err(match status.as_u16() {
                401 | 403 => SubmitError::Unauthorized(reason),
                400 | 422 => SubmitError::InvalidRequest(reason),
                429 => SubmitError::Throttled(reason),
                _ => SubmitError::Service(reason),
            });
        }

        let body: StartAnalysisResponse = response
            .json()
            .await
            .map_err(|e| SubmitError::Service(format!("malformed submission response: {}", e)))?;
        Ok(body.job_id)
    }

    async fn describe_status(&self, job_id: &JobId) -> Result<StatusSnapshot, QueryError> {
        let url = format!("{}/v1/analyses/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QueryError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = error_body(response).await;
            return if status.as_u16() == 429 || status.is_server_error() {
                Err(QueryError::Transient(reason))
            } else {
                Err(QueryError::Fatal(reason))
            };
        }

        response
            .json()
            .await
            .map_err(|e| QueryError::Fatal(format!("malformed status response: {}", e)))
    }

    async fn fetch_result(&self, job_id: &JobId) -> Result<AnalysisOutput, FetchError> {
        let url = format!("{}/v1/analyses/{}/result", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = error_body(response).await;
            return if status.as_u16() == 404 || status.as_u16() == 409 {
                Err(FetchError::Inconsistent(reason))
            } else {
                Err(FetchError::Service(reason))
            };
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Service(format!("malformed result response: {}", e)))
    }
}
