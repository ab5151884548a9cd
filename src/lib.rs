//! # PatchKit - Directory Snapshot and Patch Toolkit
//!
//! PatchKit is built on a small byte-buffer core: [`memory::ByteView`], a
//! non-owning, bounds-checked window over bytes owned by a
//! [`memory::Buffer`]. Views are cheap `(pointer, length)` pairs; copying one
//! or slicing it with `subrange` never copies the bytes themselves.
//!
//! ## Features
//!
//! - **Bounds-checked views**: every access is validated before memory is touched
//! - **Typed I/O**: little-endian fixed-layout values and length-prefixed strings
//! - **Content hashing**: XXH3 digests of any view, with a sentinel for empty data
//! - **Directory snapshots**: per-file hashes, binary and JSON persistence
//! - **Snapshot diff**: added, modified and deleted files between two states
//!
//! ## Quick Start
//!
//! ```
//! use patchkit::memory::Buffer;
//!
//! let mut buffer = Buffer::new(64);
//! let view = buffer.view();
//! view.in_type("Hello World", 0).unwrap();
//!
//! let mut text = String::new();
//! view.out_type(&mut text, 0).unwrap();
//! assert_eq!(text, "Hello World");
//!
//! let header = view.subrange(0, 8).unwrap();
//! assert_eq!(header.read::<u64>(0).unwrap(), 11);
//! ```
//!
//! ## Snapshots
//!
//! ```no_run
//! use patchkit::config::SnapshotConfig;
//! use patchkit::sync::{DirectorySnapshot, SnapshotDiff};
//! use std::path::Path;
//!
//! let config = SnapshotConfig::default();
//! let before = DirectorySnapshot::load(Path::new("before.snap")).unwrap();
//! let after = DirectorySnapshot::capture(Path::new("/data"), &config).unwrap();
//!
//! let diff = SnapshotDiff::calculate(&before, &after);
//! diff.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod fs;
pub mod hash;
pub mod memory;
pub mod sync;

// Re-export commonly used types
pub use error::{PatchKitError, Result, ViewError};
pub use hash::{HashValue, ZERO_HASH};
pub use memory::{Buffer, ByteView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```
    //! use patchkit::prelude::*;
    //! ```

    pub use crate::config::SnapshotConfig;
    pub use crate::error::{PatchKitError, Result, ViewError};
    pub use crate::fs::{get_file_paths, sanitize_path, WalkOptions};
    pub use crate::hash::{hash, HashValue, ZERO_HASH};
    pub use crate::memory::{Buffer, ByteView, Decode, Encode, FixedLayout, ViewCursor};
    pub use crate::sync::{DirectorySnapshot, SnapshotDiff, SnapshotEntry};
}
