//! File system helpers
//!
//! Directory enumeration, well-known folder lookup and path sanitization
//! used by the snapshot layer and the CLI.

mod paths;

pub use paths::*;
