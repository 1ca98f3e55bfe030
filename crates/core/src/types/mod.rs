//! Core types for the SER dashboard.
//!
//! This module provides type-safe wrappers for the domain concepts shown in
//! the dashboard tables.

pub mod emotion;
pub mod id;
pub mod record;

pub use emotion::{Emotion, EmotionParseError};
pub use id::*;
pub use record::{ACTIVE_WINDOW_DAYS, EmotionLog, UserProfile, UserRecord, UserStatus};
