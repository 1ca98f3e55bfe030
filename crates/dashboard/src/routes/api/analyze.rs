//! Audio analysis API.
//!
//! Accepts one recording as multipart form data, either a WAV file in the
//! `audio` field or raw float32 PCM in `pcm` with `sample_rate` and
//! `channels`. PCM is encoded to 16-bit WAV before it is sent to the
//! inference service.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use ser_core::audio::{PcmAudio, encode_wav, validate_wav};
use ser_core::{AnalysisId, Emotion};

use crate::{
    db::{AnalysisRepository, NewAnalysis},
    error::AppError,
    middleware::RequireUser,
    state::AppState,
};

/// Shown when the prediction succeeded but could not be stored.
const NOT_SAVED_MESSAGE: &str = "Analysis finished but could not be saved. Please try again.";

/// Build the analyze router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

/// Response for a finished analysis.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub emotion: Emotion,
    pub label: &'static str,
    pub confidence: f64,
    /// Whether the result was stored in the caller's log.
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AnalysisId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Audio as it arrived in the form.
#[derive(Debug, Default)]
struct UploadForm {
    audio: Option<Vec<u8>>,
    pcm: Option<Vec<u8>>,
    sample_rate: Option<String>,
    channels: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "audio" => form.audio = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
                "pcm" => form.pcm = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
                "sample_rate" => form.sample_rate = Some(field.text().await.map_err(multipart_error)?),
                "channels" => form.channels = Some(field.text().await.map_err(multipart_error)?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Validate the upload and produce the WAV sent for inference.
    fn into_wav(self, limit: usize) -> Result<Vec<u8>, AppError> {
        if let Some(wav) = self.audio {
            validate_wav(&wav, limit)?;
            return Ok(wav);
        }

        let Some(pcm) = self.pcm else {
            return Err(AppError::BadRequest(
                "No audio provided. Send a WAV file as `audio` or PCM samples as `pcm`."
                    .to_string(),
            ));
        };
        let sample_rate = parse_field::<u32>("sample_rate", self.sample_rate.as_deref())?;
        let channels = parse_field::<u16>("channels", self.channels.as_deref())?;

        let audio = PcmAudio::from_le_bytes(&pcm, sample_rate, channels, limit)?;
        Ok(encode_wav(&audio)?)
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<T, AppError> {
    let value = value
        .ok_or_else(|| AppError::BadRequest(format!("Missing `{name}` for PCM upload")))?;
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid `{name}`: {value}")))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Classify an uploaded recording and store the result.
///
/// # Errors
///
/// Returns `AppError::Audio`/`BadRequest`/`PayloadTooLarge` for a rejected
/// upload (nothing is sent or stored), or `AppError::Inference` if the
/// inference service fails. A failed save is not an error: the prediction is
/// returned with `saved: false`.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn analyze(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let form = UploadForm::read(multipart).await?;
    let wav = form.into_wav(state.config().max_upload_bytes)?;

    let prediction = state.inference().predict(wav).await?;

    let record = NewAnalysis {
        user_id: user.id.clone(),
        emotion: prediction.emotion,
        confidence: prediction.confidence,
    };
    let (saved, id, message) = match AnalysisRepository::new(state.pool()).insert(&record).await {
        Ok(log) => (true, Some(log.id), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save analysis");
            (false, None, Some(NOT_SAVED_MESSAGE.to_string()))
        }
    };

    let status = if saved { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(AnalyzeResponse {
            emotion: prediction.emotion,
            label: prediction.emotion.label(),
            confidence: prediction.confidence,
            saved,
            id,
            message,
        }),
    ))
}
