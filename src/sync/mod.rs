//! Directory snapshot module
//!
//! Provides capture, persistence and comparison of directory snapshots:
//! - Per-file size and content hash
//! - Compact binary encoding through byte views
//! - JSON export for inspection
//! - Added/modified/deleted detection between two snapshots

mod snapshot;

pub use snapshot::*;
