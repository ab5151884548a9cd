//! Directory snapshots
//!
//! A snapshot records the relative path, size and content hash of every file
//! in a tree. It is persisted in a compact binary form written entirely
//! through [`ViewCursor`], or as JSON for inspection.
//!
//! Binary layout (all integers little-endian, strings length-prefixed):
//!
//! ```text
//! magic [u8; 8] | version u32 | root str | created u64 | count u64
//! count x (path str | size u64 | hash u64)
//! checksum u64   -- hash of every preceding byte
//! ```

use crate::config::SnapshotConfig;
use crate::error::{IoResultExt, PatchKitError, Result};
use crate::fs::{get_file_paths, relative_path, sanitize_path};
use crate::hash::HashValue;
use crate::memory::{Buffer, ByteView, Encode, FixedLayout, ViewCursor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// One file in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Sanitized path relative to the snapshot root
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Content hash
    pub hash: HashValue,
}

impl SnapshotEntry {
    fn encoded_len(&self) -> usize {
        self.path.encoded_len() + u64::SIZE + HashValue::SIZE
    }
}

/// State of a directory tree at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Format version
    pub version: u32,
    /// Root the entries are relative to
    pub root: String,
    /// Creation timestamp (Unix seconds)
    pub created: u64,
    /// File entries, sorted by path
    pub entries: Vec<SnapshotEntry>,
}

impl DirectorySnapshot {
    /// Current format version
    pub const VERSION: u32 = 1;

    /// Leading bytes of the binary form
    pub const MAGIC: [u8; 8] = *b"PKSNAP\0\x01";

    /// Create an empty snapshot
    pub fn new(root: &str) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            version: Self::VERSION,
            root: sanitize_path(root),
            created,
            entries: Vec::new(),
        }
    }

    /// Walk `root` and hash every file
    pub fn capture(root: &Path, config: &SnapshotConfig) -> Result<Self> {
        let start = std::time::Instant::now();
        let files = get_file_paths(root, &config.walk_options())
            .map_err(|e| e.with_context(format!("capturing snapshot of {}", root.display())))?;

        let mut snapshot = Self::new(&root.to_string_lossy());
        for file in files {
            let size = std::fs::metadata(&file).with_path(&file)?.len();
            if !config.accepts_size(size) {
                tracing::warn!("Skipping {} ({} bytes exceeds limit)", file.display(), size);
                continue;
            }
            let mut buffer = Buffer::read_file(&file)?;
            let entry = SnapshotEntry {
                path: relative_path(&file, root),
                size: buffer.len() as u64,
                hash: buffer.hash(),
            };
            tracing::debug!("{} ({} bytes) {}", entry.path, entry.size, entry.hash);
            snapshot.entries.push(entry);
        }
        snapshot.entries.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!(
            "Captured {} files ({}) from {} in {:?}",
            snapshot.len(),
            humansize::format_size(snapshot.total_size(), humansize::BINARY),
            root.display(),
            start.elapsed()
        );
        Ok(snapshot)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the snapshot has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry sizes
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Find entry by path
    pub fn find(&self, path: &str) -> Option<&SnapshotEntry> {
        let path = sanitize_path(path);
        self.entries.iter().find(|e| e.path == path)
    }

    /// Build a lookup map by path
    pub fn as_map(&self) -> HashMap<&str, &SnapshotEntry> {
        self.entries.iter().map(|e| (e.path.as_str(), e)).collect()
    }

    /// Size of the binary form
    pub fn encoded_len(&self) -> usize {
        Self::MAGIC.len()
            + u32::SIZE
            + self.root.encoded_len()
            + u64::SIZE
            + u64::SIZE
            + self.entries.iter().map(SnapshotEntry::encoded_len).sum::<usize>()
            + HashValue::SIZE
    }

    /// Encode into a freshly allocated buffer
    pub fn to_buffer(&self) -> Result<Buffer> {
        let mut buffer = Buffer::new(self.encoded_len());
        let view = buffer.view();
        let mut cursor = ViewCursor::new(view);

        cursor.write(&Self::MAGIC)?;
        cursor.write(&self.version)?;
        cursor.write(self.root.as_str())?;
        cursor.write(&self.created)?;
        cursor.write(&(self.entries.len() as u64))?;
        for entry in &self.entries {
            cursor.write(entry.path.as_str())?;
            cursor.write(&entry.size)?;
            cursor.write(&entry.hash)?;
        }

        let checksum = view.subrange(0, cursor.position())?.hash();
        cursor.write(&checksum)?;
        Ok(buffer)
    }

    /// Decode the binary form
    pub fn from_view(view: ByteView<'_>) -> Result<Self> {
        let mut cursor = ViewCursor::new(view);

        let magic: [u8; 8] = cursor.read()?;
        if magic != Self::MAGIC {
            return Err(PatchKitError::snapshot("bad magic"));
        }
        let version: u32 = cursor.read()?;
        if version != Self::VERSION {
            return Err(PatchKitError::snapshot(format!(
                "unsupported version {} (expected {})",
                version,
                Self::VERSION
            )));
        }
        let root: String = cursor.read()?;
        let created: u64 = cursor.read()?;
        let count: u64 = cursor.read()?;

        // Each entry needs at least a prefix, a size and a hash
        let min_entry = crate::memory::LENGTH_PREFIX_SIZE + u64::SIZE + HashValue::SIZE;
        if count > (cursor.remaining() / min_entry) as u64 {
            return Err(PatchKitError::snapshot(format!(
                "entry count {} exceeds available data",
                count
            )));
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(SnapshotEntry {
                path: cursor.read()?,
                size: cursor.read()?,
                hash: cursor.read()?,
            });
        }

        let body_len = cursor.position();
        let stored: HashValue = cursor.read()?;
        let actual = view.subrange(0, body_len)?.hash();
        if stored != actual {
            return Err(PatchKitError::snapshot(format!(
                "checksum mismatch: expected {}, got {}",
                stored, actual
            )));
        }
        if cursor.remaining() != 0 {
            return Err(PatchKitError::snapshot(format!(
                "{} trailing bytes",
                cursor.remaining()
            )));
        }

        Ok(Self {
            version,
            root,
            created,
            entries,
        })
    }

    /// Save snapshot to file (binary)
    pub fn save(&self, path: &Path) -> Result<()> {
        let buffer = self.to_buffer()?;
        std::fs::write(path, buffer.as_slice()).with_path(path)?;
        Ok(())
    }

    /// Load snapshot from binary file
    pub fn load(path: &Path) -> Result<Self> {
        let mut buffer = Buffer::read_file(path)?;
        Self::from_view(buffer.view())
            .map_err(|e| e.with_context(format!("loading {}", path.display())))
    }

    /// Save snapshot to file (JSON)
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_path(path)?;
        Ok(())
    }

    /// Load snapshot from JSON file
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("=== Directory Snapshot ===");
        println!("Version: {}", self.version);
        println!("Root:    {}", self.root);
        println!("Files:   {}", self.len());
        println!("Size:    {}", humansize::format_size(self.total_size(), humansize::BINARY));
        println!("Created: {}", format_timestamp(self.created));
    }
}

fn format_timestamp(ts: u64) -> String {
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Differences between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Paths only in the newer snapshot
    pub added: Vec<String>,
    /// Paths whose size or hash changed
    pub modified: Vec<String>,
    /// Paths only in the older snapshot
    pub deleted: Vec<String>,
    /// Paths with identical content
    pub unchanged: Vec<String>,
}

impl SnapshotDiff {
    /// Compare `old` against `new`
    pub fn calculate(old: &DirectorySnapshot, new: &DirectorySnapshot) -> Self {
        let old_map = old.as_map();
        let new_map = new.as_map();
        let paths: BTreeSet<&str> = old_map.keys().chain(new_map.keys()).copied().collect();

        let mut diff = Self::default();
        for path in paths {
            match (old_map.get(path), new_map.get(path)) {
                (Some(before), Some(after)) => {
                    if before.size == after.size && before.hash == after.hash {
                        diff.unchanged.push(path.to_string());
                    } else {
                        diff.modified.push(path.to_string());
                    }
                }
                (None, Some(_)) => diff.added.push(path.to_string()),
                (Some(_), None) => diff.deleted.push(path.to_string()),
                (None, None) => {}
            }
        }
        diff
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty() || !self.deleted.is_empty()
    }

    /// Get total number of changes
    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("=== Snapshot Diff ===");
        println!("Added:     {}", self.added.len());
        println!("Modified:  {}", self.modified.len());
        println!("Deleted:   {}", self.deleted.len());
        println!("Unchanged: {}", self.unchanged.len());
    }
}
