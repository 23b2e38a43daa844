use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::protocol::{SubmitFormRequest, SubmitFormResponse};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// The backend as seen by the form engine.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn submit_form(
        &self,
        payload: &SubmitFormRequest,
    ) -> Result<SubmitFormResponse, TransportError>;

    /// Liveness probe; the body is opaque text.
    async fn health_check(&self) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    api_url: String,
}

impl HttpTransport {
    /// `api_url` is the base URL without a trailing slash, as produced by
    /// [`crate::settings::ClientSettings::api_url`].
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    /// Uses a caller-configured client (proxy, TLS or pool settings).
    pub fn with_client(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn submit_form(
        &self,
        payload: &SubmitFormRequest,
    ) -> Result<SubmitFormResponse, TransportError> {
        let url = format!("{}/submit-form", self.api_url);
        debug!(%url, "posting hazard assessment");
        let res = self.http.post(&url).json(payload).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn health_check(&self) -> Result<String, TransportError> {
        let res = self
            .http
            .get(format!("{}/health", self.api_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(res.text().await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
