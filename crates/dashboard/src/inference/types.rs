//! Inference request/response types.

use serde::{Deserialize, Serialize};

use ser_core::Emotion;

use super::InferenceError;

/// Prediction exactly as the service returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub emotion: String,
    pub confidence: f64,
}

/// A validated prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub emotion: Emotion,
    pub confidence: f64,
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = InferenceError;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        let emotion = raw
            .emotion
            .parse()
            .map_err(|e| InferenceError::InvalidResponse(format!("{e}")))?;
        if !(0.0..=1.0).contains(&raw.confidence) {
            return Err(InferenceError::InvalidResponse(format!(
                "confidence {} outside [0, 1]",
                raw.confidence
            )));
        }
        Ok(Self {
            emotion,
            confidence: raw.confidence,
        })
    }
}
