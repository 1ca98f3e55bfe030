//! Emotion inference service client.
//!
//! The service classifies one WAV recording per request.
//!
//! # API Reference
//!
//! - Endpoint: `POST {INFERENCE_URL}/predict/`
//! - Body: `multipart/form-data` with a single `file` field (`audio/wav`)
//! - Response: `{"emotion": "<label>", "confidence": <0..1>}`

mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::InferenceConfig;

/// Path of the prediction endpoint, relative to the service base URL.
const PREDICT_PATH: &str = "predict/";

/// Errors that can occur when calling the inference service.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Service is overloaded.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body was not a valid prediction.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Base URL cannot be joined with the endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Inference service client.
#[derive(Clone)]
pub struct InferenceClient {
    inner: Arc<InferenceClientInner>,
}

struct InferenceClientInner {
    client: reqwest::Client,
    predict_url: Url,
}

impl InferenceClient {
    /// Create a new inference client.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Arc::new(InferenceClientInner {
                client,
                predict_url: predict_url(&config.url)?,
            }),
        })
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn predict_url(&self) -> &Url {
        &self.inner.predict_url
    }

    /// Classify one WAV recording.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` on transport failure, a non-success status,
    /// or a response with an unknown emotion or out-of-range confidence.
    #[instrument(skip(self, wav), fields(bytes = wav.len()))]
    pub async fn predict(&self, wav: Vec<u8>) -> Result<Prediction, InferenceError> {
        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = Form::new().part("file", part);

        let response = self
            .inner
            .client
            .post(self.inner.predict_url.clone())
            .multipart(form)
            .send()
            .await?;

        let raw: RawPrediction = self.handle_response(response).await?;
        let prediction = Prediction::try_from(raw)?;
        tracing::info!(
            emotion = %prediction.emotion,
            confidence = prediction.confidence,
            "Inference completed"
        );
        Ok(prediction)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, InferenceError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| {
                InferenceError::InvalidResponse(format!("Failed to parse response: {e}"))
            });
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the inference service.
    async fn parse_error(&self, response: reqwest::Response) -> InferenceError {
        let status = response.status().as_u16();

        if status == 429 || status == 503 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(5);
            return InferenceError::RateLimited(retry_after);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status, %message, "Inference service error response");

        InferenceError::Api { status, message }
    }
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("predict_url", &self.inner.predict_url.as_str())
            .finish_non_exhaustive()
    }
}

/// `{base}/predict/`, keeping any path prefix on the base URL.
fn predict_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(PREDICT_PATH)
}
