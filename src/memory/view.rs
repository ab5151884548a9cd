//! Non-owning, bounds-checked window over externally owned bytes
//!
//! A [`ByteView`] is nothing more than a `(pointer, length)` pair. It is
//! backed by a slice of [`Cell<u8>`] so that copies and sub-views can alias
//! and mutate the same storage without `unsafe`, while the lifetime `'a`
//! keeps every view inside the borrow of the allocation that owns the bytes.
//! `Cell` is not `Sync`, so a view can never be shared across threads.

use crate::error::ViewError;
use crate::hash::{hash_cells, HashValue, ZERO_HASH};
use crate::memory::codec::FixedLayout;
use std::cell::Cell;
use std::ffi::c_char;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice::ChunksExact;

/// Aliasing view over a contiguous byte range
///
/// `ByteView` is `Copy`. Moving it and copying it are the same operation:
/// there is no resource to hand over, so the source of a move stays valid and
/// keeps aliasing the same bytes as the destination.
///
/// ```
/// use patchkit::memory::ByteView;
///
/// let mut storage = [0u8; 8];
/// let view = ByteView::new(&mut storage);
/// let alias = view;
/// alias.set(0, 7).unwrap();
/// assert_eq!(view.get(0).unwrap(), 7);
/// ```
#[derive(Clone, Copy, Default)]
pub struct ByteView<'a> {
    cells: &'a [Cell<u8>],
}

impl<'a> ByteView<'a> {
    /// Create a view over mutable storage
    pub fn new(storage: &'a mut [u8]) -> Self {
        Self {
            cells: Cell::from_mut(storage).as_slice_of_cells(),
        }
    }

    /// Create a view over storage that is already shared as cells
    pub fn from_cells(cells: &'a [Cell<u8>]) -> Self {
        Self { cells }
    }

    /// True if the view addresses no bytes
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Logical negation of [`is_empty`](Self::is_empty)
    pub fn has_data(&self) -> bool {
        !self.is_empty()
    }

    /// Number of addressable bytes
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Address of the first byte, or null when empty
    pub fn bytes(&self) -> *const u8 {
        if self.is_empty() {
            std::ptr::null()
        } else {
            self.cells.as_ptr().cast::<u8>()
        }
    }

    /// Same address as [`bytes`](Self::bytes), typed as C characters
    pub fn char_array(&self) -> *const c_char {
        self.bytes().cast::<c_char>()
    }

    /// Underlying cells
    pub fn as_cells(&self) -> &'a [Cell<u8>] {
        self.cells
    }

    /// Reference to byte `index`, usable for both reads and writes
    pub fn at(&self, index: usize) -> Result<&'a Cell<u8>, ViewError> {
        self.cells
            .get(index)
            .ok_or_else(|| ViewError::out_of_range(index, 1, self.len()))
    }

    /// Read byte `index`
    pub fn get(&self, index: usize) -> Result<u8, ViewError> {
        self.at(index).map(Cell::get)
    }

    /// Overwrite byte `index`
    pub fn set(&self, index: usize, value: u8) -> Result<(), ViewError> {
        self.at(index).map(|cell| cell.set(value))
    }

    /// Derive a view over `[offset, offset + length)` of this one
    ///
    /// An empty source always fails, even for a zero-length request.
    pub fn subrange(&self, offset: usize, length: usize) -> Result<ByteView<'a>, ViewError> {
        if self.is_empty() {
            return Err(ViewError::out_of_range(offset, length, 0));
        }
        let end = self.checked_end(offset, length)?;
        Ok(Self {
            cells: &self.cells[offset..end],
        })
    }

    /// Iterate over every byte; each item can be written through `Cell::set`
    pub fn iter(&self) -> std::slice::Iter<'a, Cell<u8>> {
        self.cells.iter()
    }

    /// Reinterpret the bytes as consecutive `T` values
    ///
    /// Yields `len() / T::SIZE` items. Trailing bytes that do not fill a
    /// whole `T` are skipped. A zero-sized `T` yields nothing.
    pub fn elements<T: FixedLayout>(&self) -> Elements<'a, T> {
        let cells = if T::SIZE == 0 { &self.cells[..0] } else { self.cells };
        Elements {
            chunks: cells.chunks_exact(T::SIZE.max(1)),
            _marker: PhantomData,
        }
    }

    /// Set every byte to `value`
    pub fn fill(&self, value: u8) {
        self.cells.iter().for_each(|cell| cell.set(value));
    }

    /// Copy the viewed bytes into a new vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.cells.iter().map(Cell::get).collect()
    }

    /// Content hash, or [`ZERO_HASH`] for an empty view
    pub fn hash(&self) -> HashValue {
        if self.is_empty() {
            return ZERO_HASH;
        }
        hash_cells(self.cells)
    }

    /// End offset of `[offset, offset + length)`, if it fits in the view
    pub(crate) fn checked_end(&self, offset: usize, length: usize) -> Result<usize, ViewError> {
        offset
            .checked_add(length)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| ViewError::out_of_range(offset, length, self.len()))
    }
}

impl std::fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteView")
            .field("ptr", &self.bytes())
            .field("len", &self.len())
            .finish()
    }
}

impl<'a> IntoIterator for ByteView<'a> {
    type Item = &'a Cell<u8>;
    type IntoIter = std::slice::Iter<'a, Cell<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl<'a> From<&'a mut [u8]> for ByteView<'a> {
    fn from(storage: &'a mut [u8]) -> Self {
        Self::new(storage)
    }
}

/// Read-only iterator over fixed-layout values, see [`ByteView::elements`]
pub struct Elements<'a, T> {
    chunks: ChunksExact<'a, Cell<u8>>,
    _marker: PhantomData<T>,
}

impl<T: FixedLayout> Iterator for Elements<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.chunks.next().map(T::load)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<T: FixedLayout> ExactSizeIterator for Elements<'_, T> {}

impl<T: FixedLayout> FusedIterator for Elements<'_, T> {}
