use crate::models::{EnumerationSet, JobRequest, PreviewResponse, StatusReport};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from the label backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Request never produced a response (connection refused, DNS, ...)
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Backend answered 2xx with a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Text shown after `Failure: ` in the banner.
    ///
    /// For rejections this is the raw response body, which is where the
    /// backend puts its validation message.
    pub fn detail(&self) -> String {
        match self {
            BackendError::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The four backend endpoints the panel talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelBackend: Send + Sync {
    /// `GET /config`
    async fn fetch_config(&self) -> BackendResult<EnumerationSet>;

    /// `GET /status`
    async fn fetch_status(&self) -> BackendResult<StatusReport>;

    /// `PUT /print`
    async fn print(&self, request: &JobRequest) -> BackendResult<()>;

    /// `PUT /preview?max_width=<max_width>`
    async fn preview(&self, request: &JobRequest, max_width: u32) -> BackendResult<PreviewResponse>;
}

/// [`LabelBackend`] over HTTP.
///
/// No client-side timeout is configured; a slow backend leaves the banner as
/// it was until the transport itself gives up.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read body of {} response: {}", status, e);
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            }
        };
        tracing::debug!("Backend rejected request: {} {}", status, body);
        Err(BackendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let bytes = Self::check(response).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LabelBackend for HttpBackend {
    async fn fetch_config(&self) -> BackendResult<EnumerationSet> {
        let response = self.client.get(self.url("/config")).send().await?;
        Self::decode(response).await
    }

    async fn fetch_status(&self) -> BackendResult<StatusReport> {
        let response = self.client.get(self.url("/status")).send().await?;
        Self::decode(response).await
    }

    async fn print(&self, request: &JobRequest) -> BackendResult<()> {
        let response = self
            .client
            .put(self.url("/print"))
            .json(request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn preview(&self, request: &JobRequest, max_width: u32) -> BackendResult<PreviewResponse> {
        let response = self
            .client
            .put(self.url("/preview"))
            .query(&[("max_width", max_width)])
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }
}
