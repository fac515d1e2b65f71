//! HTTP client for the feedback backend.
//!
//! Both endpoints answer with the [`ApiResponse`] envelope. The client unwraps
//! it and classifies every failure into one of the [`ClientError`] variants so
//! callers can tell "backend not reachable" apart from "backend said no".

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::WallConfig;
use crate::models::*;

/// Path of the feedback resource, relative to the base URL.
pub const FEEDBACK_PATH: &str = "/api/feedback";

/// Header that tells the tunnelling proxy in front of the backend to skip its
/// browser interstitial page.
pub const TUNNEL_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

const LIST_FALLBACK: &str = "Failed to fetch feedback";
const CREATE_FALLBACK: &str = "Failed to submit feedback";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response: connection refused, DNS failure, timeout.
    #[error("Cannot connect to server. Please check if the backend is running.")]
    Unreachable(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    /// The backend answered `success: false`.
    #[error("{0}")]
    Application(String),

    #[error("Server reported success without data")]
    MissingData,

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// HTTP client for the feedback endpoints.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    base_url: String,
    client: Client,
}

impl FeedbackClient {
    /// Create a client for the backend at `base_url` (scheme, host and port).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &WallConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request carrying the headers every call needs.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header(TUNNEL_WARNING_HEADER, "true")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "feedback backend unreachable");
            ClientError::Unreachable(e)
        })
    }

    /// Check the status, then unwrap the envelope.
    ///
    /// `fallback` is used when the backend reports failure without an error text.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let status = response.status();
        tracing::debug!(status = %status, url = %response.url(), "feedback response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(body = %body, "error response body");
            return Err(ClientError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        if !envelope.success {
            let reason = envelope.error.unwrap_or_else(|| fallback.to_string());
            return Err(ClientError::Application(reason));
        }

        envelope.data.ok_or(ClientError::MissingData)
    }

    /// Fetch the whole wall, in the order the backend returns it.
    pub async fn list_feedback(&self) -> Result<Vec<FeedbackEntry>, ClientError> {
        tracing::debug!(base_url = %self.base_url, "fetching feedback list");
        let response = self
            .send(self.request(Method::GET, FEEDBACK_PATH))
            .await?;
        self.handle_response(response, LIST_FALLBACK).await
    }

    /// Post a new entry and return the backend's canonical record of it.
    pub async fn create_feedback(
        &self,
        input: &CreateFeedbackInput,
    ) -> Result<FeedbackEntry, ClientError> {
        tracing::debug!(base_url = %self.base_url, "posting feedback");
        let response = self
            .send(self.request(Method::POST, FEEDBACK_PATH).json(input))
            .await?;
        self.handle_response(response, CREATE_FALLBACK).await
    }
}
