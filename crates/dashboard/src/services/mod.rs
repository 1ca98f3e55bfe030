//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `snapshots` - Last-known table snapshots (moka)
//! - `stats` - Chart aggregates and the admin users table

pub mod snapshots;
pub mod stats;

pub use snapshots::{Snapshot, SnapshotCache, SnapshotKey};
