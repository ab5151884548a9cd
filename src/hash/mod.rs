//! Content hashing module
//!
//! Provides the XXH3 digest used for byte views, buffers and snapshot
//! entries, along with the [`ZERO_HASH`] sentinel for empty content.

mod engine;

pub use engine::*;
