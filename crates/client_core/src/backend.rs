//! HTTP seam to the summarization service.

use async_trait::async_trait;
use reqwest::{
    header::COOKIE,
    multipart::{Form, Part},
    Client, RequestBuilder, Response, StatusCode,
};
use shared::{
    error::ErrorPayload,
    protocol::{AnalysisRequest, AnalysisResult, ANALYZE_PATH, UPLOAD_FIELD, UPLOAD_PATH},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::page::SelectedFile;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeReply {
    Completed(AnalysisResult),
    Rejected { status: u16, payload: ErrorPayload },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    Document(Vec<u8>),
    Unauthorized,
    Rejected { status: u16, payload: ErrorPayload },
}

#[async_trait]
pub trait SummarizerBackend: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyzeReply, BackendError>;
    async fn upload(&self, file: SelectedFile) -> Result<UploadReply, BackendError>;
}

/// Trims surrounding whitespace and trailing slashes and checks the result parses.
pub fn normalize_server_url(raw: &str) -> Result<String, BackendError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| BackendError::InvalidServerUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BackendError::InvalidServerUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

pub struct HttpBackend {
    http: Client,
    server_url: String,
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(server_url: &str) -> Result<Self, BackendError> {
        Ok(Self {
            http: Client::new(),
            server_url: normalize_server_url(server_url)?,
            session_cookie: None,
        })
    }

    /// Forwards an externally established session so `/upload` sees the login.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.http.post(format!("{}{path}", self.server_url));
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.as_str()),
            None => request,
        }
    }
}

/// Failure bodies are optional JSON; anything undecodable falls back to an empty payload.
async fn read_error_payload(response: Response) -> ErrorPayload {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => serde_json::from_slice(&body).unwrap_or_else(|err| {
            warn!(%status, %err, "failure response body is not an error payload");
            ErrorPayload::default()
        }),
        Err(err) => {
            warn!(%status, %err, "failed to read failure response body");
            ErrorPayload::default()
        }
    }
}

#[async_trait]
impl SummarizerBackend for HttpBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyzeReply, BackendError> {
        debug!(chars = request.text.chars().count(), "posting analyze request");
        let response = self.post(ANALYZE_PATH).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let payload = read_error_payload(response).await;
            return Ok(AnalyzeReply::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        let body = response.bytes().await?;
        let result: AnalysisResult = serde_json::from_slice(&body)
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        Ok(AnalyzeReply::Completed(result))
    }

    async fn upload(&self, file: SelectedFile) -> Result<UploadReply, BackendError> {
        debug!(
            file_name = %file.file_name,
            size_bytes = file.bytes.len(),
            "posting upload request"
        );
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime_type) = file.mime_type.as_deref() {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.post(UPLOAD_PATH).multipart(form).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(UploadReply::Unauthorized);
        }
        if !status.is_success() {
            let payload = read_error_payload(response).await;
            return Ok(UploadReply::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        let bytes = response.bytes().await?;
        Ok(UploadReply::Document(bytes.to_vec()))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
