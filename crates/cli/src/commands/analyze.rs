//! Classify a WAV file with the inference service.

use std::path::Path;
use std::time::Duration;

use url::Url;

use ser_core::audio::{DEFAULT_MAX_UPLOAD_BYTES, validate_wav};
use ser_dashboard::config::InferenceConfig;
use ser_dashboard::inference::InferenceClient;

use super::CommandError;

/// Validate `file` and print the predicted emotion.
pub async fn run(file: &Path, inference_url: &str, timeout_secs: u64) -> Result<(), CommandError> {
    let url = Url::parse(inference_url)
        .map_err(|e| CommandError::InvalidArgument(format!("inference URL: {e}")))?;

    let bytes = tokio::fs::read(file).await?;
    let info = validate_wav(&bytes, DEFAULT_MAX_UPLOAD_BYTES)?;
    tracing::info!(
        path = %file.display(),
        channels = info.channels,
        sample_rate = info.sample_rate,
        bytes = bytes.len(),
        "WAV file accepted"
    );

    let client = InferenceClient::new(&InferenceConfig {
        url,
        timeout: Duration::from_secs(timeout_secs),
    })?;
    let prediction = client.predict(bytes).await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{} ({:.0}% confidence)",
            prediction.emotion.label(),
            prediction.confidence * 100.0
        );
    }
    Ok(())
}
