//! Owning byte storage that hands out views

use crate::error::{IoResultExt, Result};
use crate::hash::HashValue;
use crate::memory::ByteView;
use std::path::Path;

/// Heap allocation backing one or more [`ByteView`]s
///
/// Views borrow the buffer, so none of them can outlive it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Box<[u8]>,
}

impl Buffer {
    /// Allocate `size` zeroed bytes
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Take ownership of existing bytes
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// Load a whole file
    pub fn read_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).with_path(path)?;
        Ok(Self::from_vec(data))
    }

    /// Number of owned bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is allocated
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View over the whole allocation
    pub fn view(&mut self) -> ByteView<'_> {
        ByteView::new(&mut self.data)
    }

    /// Borrow the bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Give the bytes back
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }

    /// Content hash of the whole allocation
    pub fn hash(&mut self) -> HashValue {
        self.view().hash()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}
