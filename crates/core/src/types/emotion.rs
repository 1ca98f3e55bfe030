//! The fixed set of emotions the inference service can report.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a label is not one of the known emotions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion: {0}")]
pub struct EmotionParseError(pub String);

/// Emotion category assigned to a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Neutral,
    Excited,
    Calm,
    Fearful,
    Disgust,
    Surprised,
}

impl Emotion {
    /// Every emotion, in display order.
    pub const ALL: [Self; 9] = [
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Neutral,
        Self::Excited,
        Self::Calm,
        Self::Fearful,
        Self::Disgust,
        Self::Surprised,
    ];

    /// Lowercase wire/storage name (`"happy"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Neutral => "neutral",
            Self::Excited => "excited",
            Self::Calm => "calm",
            Self::Fearful => "fearful",
            Self::Disgust => "disgust",
            Self::Surprised => "surprised",
        }
    }

    /// Capitalized label for table cells and filter options.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Neutral => "Neutral",
            Self::Excited => "Excited",
            Self::Calm => "Calm",
            Self::Fearful => "Fearful",
            Self::Disgust => "Disgust",
            Self::Surprised => "Surprised",
        }
    }

    /// Chart color used for the distribution legend.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Happy => "#4ade80",
            Self::Sad => "#60a5fa",
            Self::Angry => "#ef4444",
            Self::Neutral => "#94a3b8",
            Self::Excited => "#ec4899",
            Self::Calm => "#8b5cf6",
            Self::Fearful => "#f59e0b",
            Self::Disgust => "#10b981",
            Self::Surprised => "#f472b6",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EmotionParseError;

    /// Parses case-insensitively; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EmotionParseError(s.to_string()))
    }
}
