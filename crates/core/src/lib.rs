//! SER Core - Shared types and pure logic for the speech-emotion dashboard.
//!
//! This crate provides the pieces used by every SER component:
//! - `dashboard` - Web dashboard (record/upload page, user and admin views)
//! - `cli` - Command-line tools for migrations, seeding and ad-hoc analysis
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Every table recomposition, aggregation and WAV
//! encoding is a deterministic function of its inputs.
//!
//! # Modules
//!
//! - [`types`] - Emotion enum, emotion-log and user records, type-safe IDs
//! - [`table`] - Filter, sort and paginate engine plus the view controller
//! - [`stats`] - Emotion distribution and daily-active-user reductions
//! - [`audio`] - Upload validation and 16-bit PCM WAV encoding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod audio;
pub mod stats;
pub mod table;
pub mod types;

pub use types::*;
