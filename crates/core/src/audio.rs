//! Audio payload validation and 16-bit PCM WAV encoding.
//!
//! The inference service only accepts WAV. Uploaded files are checked for a
//! RIFF/WAVE container before they are forwarded; browser recordings arrive
//! as decoded float32 PCM and are encoded here.

use serde::Serialize;

/// Default upload limit (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Size of the canonical RIFF/WAVE/fmt/data header.
pub const WAV_HEADER_LEN: usize = 44;

/// Accepted sample-rate range for raw PCM.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=192_000;

const BITS_PER_SAMPLE: u16 = 16;

/// Rejected audio input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio payload is empty")]
    Empty,

    #[error("audio payload is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("audio is not a RIFF/WAVE file")]
    NotWav,

    #[error("unsupported channel count {0}, expected mono or stereo")]
    UnsupportedChannels(u16),

    #[error("unsupported sample rate {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("PCM payload of {0} bytes is not a whole number of float32 samples")]
    MisalignedPcm(usize),

    #[error("{samples} samples do not divide into {channels}-channel frames")]
    PartialFrame { samples: usize, channels: u16 },

    #[error("audio too long for a WAV data chunk")]
    TooLong,
}

impl AudioError {
    /// True when the payload was rejected for size alone.
    #[must_use]
    pub const fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }
}

/// Format fields read from a WAV `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavInfo {
    pub format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

fn check_size(len: usize, limit: usize) -> Result<(), AudioError> {
    if len == 0 {
        return Err(AudioError::Empty);
    }
    if len > limit {
        return Err(AudioError::TooLarge { size: len, limit });
    }
    Ok(())
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(at..at.checked_add(2)?)?.try_into().ok()?;
    Some(u16::from_le_bytes(raw))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(at..at.checked_add(4)?)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Check an uploaded file is a RIFF/WAVE container within `limit` bytes.
///
/// Walks the chunk list until it finds `fmt `; the sample data itself is
/// not inspected.
///
/// # Errors
///
/// Returns [`AudioError::Empty`], [`AudioError::TooLarge`] or
/// [`AudioError::NotWav`].
pub fn validate_wav(bytes: &[u8], limit: usize) -> Result<WavInfo, AudioError> {
    check_size(bytes.len(), limit)?;
    if bytes.get(0..4) != Some(b"RIFF".as_slice()) || bytes.get(8..12) != Some(b"WAVE".as_slice())
    {
        return Err(AudioError::NotWav);
    }

    let mut offset = 12usize;
    while let (Some(id), Some(size)) = (bytes.get(offset..offset + 4), read_u32(bytes, offset + 4))
    {
        let body = offset + 8;
        if id == b"fmt " && size >= 16 {
            return Ok(WavInfo {
                format: read_u16(bytes, body).ok_or(AudioError::NotWav)?,
                channels: read_u16(bytes, body + 2).ok_or(AudioError::NotWav)?,
                sample_rate: read_u32(bytes, body + 4).ok_or(AudioError::NotWav)?,
                bits_per_sample: read_u16(bytes, body + 14).ok_or(AudioError::NotWav)?,
            });
        }
        // Chunks are word aligned.
        let padded = usize::try_from(size)
            .ok()
            .and_then(|s| s.checked_add(s & 1))
            .ok_or(AudioError::NotWav)?;
        offset = body.checked_add(padded).ok_or(AudioError::NotWav)?;
    }
    Err(AudioError::NotWav)
}

/// Interleaved float samples with their format.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl PcmAudio {
    /// Wrap interleaved samples.
    ///
    /// # Errors
    ///
    /// Fails on an empty buffer, a channel count other than 1 or 2, a sample
    /// rate outside [`SAMPLE_RATE_RANGE`], or a trailing partial frame.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if samples.is_empty() {
            return Err(AudioError::Empty);
        }
        if !(1..=2).contains(&channels) {
            return Err(AudioError::UnsupportedChannels(channels));
        }
        if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
            return Err(AudioError::UnsupportedSampleRate(sample_rate));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(AudioError::PartialFrame {
                samples: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Decode little-endian float32 bytes as posted by the recorder page.
    ///
    /// # Errors
    ///
    /// Size and alignment errors, then everything [`Self::new`] rejects.
    pub fn from_le_bytes(
        bytes: &[u8],
        sample_rate: u32,
        channels: u16,
        limit: usize,
    ) -> Result<Self, AudioError> {
        check_size(bytes.len(), limit)?;
        if bytes.len() % 4 != 0 {
            return Err(AudioError::MisalignedPcm(bytes.len()));
        }
        let samples = bytes
            .chunks_exact(4)
            .map(|chunk| <[u8; 4]>::try_from(chunk).map(f32::from_le_bytes))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| AudioError::MisalignedPcm(bytes.len()))?;
        Self::new(samples, sample_rate, channels)
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Encode interleaved PCM as a 16-bit WAV file.
///
/// Samples are clamped to `[-1, 1]`, scaled by `32767` and truncated toward
/// zero. NaN encodes as silence.
///
/// # Errors
///
/// Returns [`AudioError::TooLong`] when the data chunk would overflow a
/// 32-bit size field.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_wav(audio: &PcmAudio) -> Result<Vec<u8>, AudioError> {
    let channels = audio.channels;
    let block_align = channels * BITS_PER_SAMPLE / 8;
    let byte_rate = audio.sample_rate * u32::from(block_align);
    let data_size = audio
        .samples
        .len()
        .checked_mul(2)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or(AudioError::TooLong)?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + audio.samples.len() * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&audio.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in &audio.samples {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }

    Ok(out)
}
