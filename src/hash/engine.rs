//! XXH3 content hashing
//!
//! A stateless one-shot hash for plain slices, a cell-aware variant for byte
//! views, and a streaming [`Hasher`] that yields the same digest as the
//! one-shot form for the same input.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Bytes copied out of a cell slice per hasher update
const CELL_CHUNK: usize = 4096;

/// Fixed-width content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashValue(u64);

/// Sentinel denoting "no content"; reported for empty views.
///
/// No content digest ever equals it: a raw XXH3 result of 0 is reported as 1.
pub const ZERO_HASH: HashValue = HashValue(0);

/// Wrap a raw XXH3 result, keeping it clear of [`ZERO_HASH`]
const fn content_digest(raw: u64) -> HashValue {
    if raw == 0 {
        HashValue(1)
    } else {
        HashValue(raw)
    }
}

impl HashValue {
    /// Wrap a raw digest
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw digest value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this is the [`ZERO_HASH`] sentinel
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse the 16-digit hex form produced by `Display`
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 16 {
            return None;
        }
        u64::from_str_radix(s, 16).ok().map(Self)
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for HashValue {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Hash a byte slice
pub fn hash(data: &[u8]) -> HashValue {
    content_digest(xxh3_64(data))
}

/// Hash bytes held in cells, as exposed by a byte view
pub fn hash_cells(cells: &[Cell<u8>]) -> HashValue {
    let mut hasher = Hasher::new();
    hasher.update_cells(cells);
    hasher.finish()
}

/// Streaming hasher
pub struct Hasher {
    inner: Xxh3,
}

impl Hasher {
    /// Create a new hasher
    pub fn new() -> Self {
        Self { inner: Xxh3::new() }
    }

    /// Feed more data
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Feed bytes held in cells
    pub fn update_cells(&mut self, cells: &[Cell<u8>]) {
        let mut chunk = [0u8; CELL_CHUNK];
        for block in cells.chunks(CELL_CHUNK) {
            for (dst, cell) in chunk.iter_mut().zip(block) {
                *dst = cell.get();
            }
            self.inner.update(&chunk[..block.len()]);
        }
    }

    /// Produce the digest of everything fed so far
    pub fn finish(&self) -> HashValue {
        content_digest(self.inner.digest())
    }

    /// Reset for reuse
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
