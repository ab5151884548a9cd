//! Raw and typed reads/writes through a [`ByteView`]
//!
//! # Encoding
//!
//! * Fixed-layout values ([`FixedLayout`]) are written packed and
//!   little-endian, `SIZE` bytes each. `usize`/`isize` use the host width.
//! * Strings are written as a `u64` little-endian byte count followed by the
//!   UTF-8 payload, with no terminator.
//!
//! Every operation validates the whole request before writing, so a failed
//! call leaves the view untouched.

use crate::error::ViewError;
use crate::hash::HashValue;
use crate::memory::ByteView;
use std::cell::Cell;

/// Width of the length prefix written in front of string payloads
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// A value with a fixed, packed byte representation
pub trait FixedLayout: Copy {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write the value into exactly `SIZE` cells
    fn store(&self, dst: &[Cell<u8>]);

    /// Read a value from exactly `SIZE` cells
    fn load(src: &[Cell<u8>]) -> Self;
}

/// Types that can be written with [`ByteView::in_type`]
pub trait Encode {
    /// Number of bytes [`encode`](Self::encode) writes
    fn encoded_len(&self) -> usize;

    /// Write into exactly `encoded_len()` cells
    fn encode(&self, dst: &[Cell<u8>]);
}

/// Types that can be read with [`ByteView::out_type`]
pub trait Decode: Sized {
    /// Read a value starting at `offset` of a non-empty view
    fn decode(view: ByteView<'_>, offset: usize) -> Result<Self, ViewError>;
}

#[inline]
fn store_bytes(dst: &[Cell<u8>], src: &[u8]) {
    for (cell, &byte) in dst.iter().zip(src) {
        cell.set(byte);
    }
}

#[inline]
fn load_bytes(src: &[Cell<u8>], dst: &mut [u8]) {
    for (byte, cell) in dst.iter_mut().zip(src) {
        *byte = cell.get();
    }
}

macro_rules! impl_fixed_numeric {
    ($($type:ty),* $(,)?) => {
        $(
            impl FixedLayout for $type {
                const SIZE: usize = std::mem::size_of::<$type>();

                #[inline]
                fn store(&self, dst: &[Cell<u8>]) {
                    store_bytes(dst, &self.to_le_bytes());
                }

                #[inline]
                fn load(src: &[Cell<u8>]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$type>()];
                    load_bytes(src, &mut raw);
                    <$type>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_fixed_numeric!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl<const N: usize> FixedLayout for [u8; N] {
    const SIZE: usize = N;

    fn store(&self, dst: &[Cell<u8>]) {
        store_bytes(dst, self);
    }

    fn load(src: &[Cell<u8>]) -> Self {
        let mut raw = [0u8; N];
        load_bytes(src, &mut raw);
        raw
    }
}

impl FixedLayout for HashValue {
    const SIZE: usize = u64::SIZE;

    fn store(&self, dst: &[Cell<u8>]) {
        self.value().store(dst);
    }

    fn load(src: &[Cell<u8>]) -> Self {
        HashValue::new(u64::load(src))
    }
}

impl<T: FixedLayout> Encode for T {
    fn encoded_len(&self) -> usize {
        T::SIZE
    }

    fn encode(&self, dst: &[Cell<u8>]) {
        self.store(dst);
    }
}

impl<T: FixedLayout> Decode for T {
    fn decode(view: ByteView<'_>, offset: usize) -> Result<Self, ViewError> {
        let end = view.checked_end(offset, T::SIZE)?;
        Ok(T::load(&view.as_cells()[offset..end]))
    }
}

impl Encode for str {
    fn encoded_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.len()
    }

    fn encode(&self, dst: &[Cell<u8>]) {
        let (prefix, payload) = dst.split_at(LENGTH_PREFIX_SIZE);
        (self.len() as u64).store(prefix);
        store_bytes(payload, self.as_bytes());
    }
}

impl Encode for String {
    fn encoded_len(&self) -> usize {
        self.as_str().encoded_len()
    }

    fn encode(&self, dst: &[Cell<u8>]) {
        self.as_str().encode(dst);
    }
}

impl Decode for String {
    fn decode(view: ByteView<'_>, offset: usize) -> Result<Self, ViewError> {
        let declared = u64::decode(view, offset)?;
        // The prefix fit, so this cannot overflow
        let start = offset + LENGTH_PREFIX_SIZE;
        let len = usize::try_from(declared)
            .map_err(|_| ViewError::out_of_range(start, usize::MAX, view.len()))?;
        let end = view.checked_end(start, len)?;

        let payload: Vec<u8> = view.as_cells()[start..end].iter().map(Cell::get).collect();
        String::from_utf8(payload).map_err(|_| ViewError::InvalidText { offset: start })
    }
}

impl ByteView<'_> {
    /// Copy `num_bytes` from `source` into the view at `dest_offset`
    ///
    /// Fails with [`ViewError::NullArgument`] when `source` is `None` or the
    /// view is empty, whatever `num_bytes` is.
    pub fn in_raw(
        &self,
        source: Option<&[u8]>,
        num_bytes: usize,
        dest_offset: usize,
    ) -> Result<(), ViewError> {
        let source = match source {
            Some(source) if self.has_data() => source,
            _ => return Err(ViewError::NullArgument),
        };
        let end = self.checked_end(dest_offset, num_bytes)?;
        let source = source
            .get(..num_bytes)
            .ok_or_else(|| ViewError::out_of_range(0, num_bytes, source.len()))?;

        store_bytes(&self.as_cells()[dest_offset..end], source);
        Ok(())
    }

    /// Copy `num_bytes` from the view at `src_offset` into `dest`
    pub fn out_raw(
        &self,
        dest: Option<&mut [u8]>,
        num_bytes: usize,
        src_offset: usize,
    ) -> Result<(), ViewError> {
        let dest = match dest {
            Some(dest) if self.has_data() => dest,
            _ => return Err(ViewError::NullArgument),
        };
        let end = self.checked_end(src_offset, num_bytes)?;
        let available = dest.len();
        let dest = dest
            .get_mut(..num_bytes)
            .ok_or_else(|| ViewError::out_of_range(0, num_bytes, available))?;

        load_bytes(&self.as_cells()[src_offset..end], dest);
        Ok(())
    }

    /// Write `value` at `offset`, returning the number of bytes written
    pub fn in_type<T: Encode + ?Sized>(&self, value: &T, offset: usize) -> Result<usize, ViewError> {
        if self.is_empty() {
            return Err(ViewError::NullArgument);
        }
        let len = value.encoded_len();
        let end = self.checked_end(offset, len)?;
        value.encode(&self.as_cells()[offset..end]);
        Ok(len)
    }

    /// Read the value stored at `offset` into `value`
    ///
    /// `value` is only assigned on success.
    pub fn out_type<T: Decode>(&self, value: &mut T, offset: usize) -> Result<(), ViewError> {
        *value = self.read(offset)?;
        Ok(())
    }

    /// Read and return the value stored at `offset`
    pub fn read<T: Decode>(&self, offset: usize) -> Result<T, ViewError> {
        if self.is_empty() {
            return Err(ViewError::NullArgument);
        }
        T::decode(*self, offset)
    }
}

/// Sequential reader/writer that advances through a view
#[derive(Debug, Clone, Copy)]
pub struct ViewCursor<'a> {
    view: ByteView<'a>,
    position: usize,
}

impl<'a> ViewCursor<'a> {
    /// Start at the beginning of `view`
    pub fn new(view: ByteView<'a>) -> Self {
        Self { view, position: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the current offset
    pub fn remaining(&self) -> usize {
        self.view.len() - self.position
    }

    /// The view being traversed
    pub fn view(&self) -> ByteView<'a> {
        self.view
    }

    /// Write `value` and advance past it
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), ViewError> {
        self.position += self.view.in_type(value, self.position)?;
        Ok(())
    }

    /// Read a value and advance past it
    pub fn read<T: Decode + Encode>(&mut self) -> Result<T, ViewError> {
        let value: T = self.view.read(self.position)?;
        self.position += value.encoded_len();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_round_trip() {
        let mut storage = vec![0u8; std::mem::size_of::<i32>() + 1];
        let view = ByteView::new(&mut storage);
        assert_eq!(view.in_type(&64i32, 0).unwrap(), 4);
        view.in_type(&123u8, std::mem::size_of::<i32>()).unwrap();

        let mut out_int = 0i32;
        let mut out_byte = 0u8;
        view.out_type(&mut out_int, 0).unwrap();
        view.out_type(&mut out_byte, std::mem::size_of::<i32>()).unwrap();
        assert_eq!(out_int, 64);
        assert_eq!(out_byte, 123);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut storage = [0u8; 4];
        ByteView::new(&mut storage).in_type(&0x0102_0304u32, 0).unwrap();
        assert_eq!(storage, [4, 3, 2, 1]);
    }

    #[test]
    fn test_raw_round_trip() {
        let word = b"This is a sample sentence.\0\0";
        let mut storage = vec![0u8; 1 + word.len()];
        let view = ByteView::new(&mut storage);
        view.in_type(&123u8, 0).unwrap();
        view.in_raw(Some(&word[..]), word.len(), 1).unwrap();

        let mut combined = [0u8; 29];
        view.out_raw(Some(&mut combined[..]), 29, 0).unwrap();
        assert_eq!(combined[0], 123);
        assert_eq!(&combined[1..], &word[..]);
    }

    #[test]
    fn test_string_round_trip() {
        let mut storage = vec![0u8; 1234];
        let view = ByteView::new(&mut storage);
        let written = view.in_type("Hello World", 0).unwrap();
        assert_eq!(written, LENGTH_PREFIX_SIZE + 11);

        let mut output = String::new();
        view.out_type(&mut output, 0).unwrap();
        assert_eq!(output, "Hello World");
        assert_eq!(&storage[..LENGTH_PREFIX_SIZE], &11u64.to_le_bytes());
    }

    #[test]
    fn test_raw_null_arguments() {
        let empty = ByteView::default();
        assert_eq!(empty.in_raw(None, 0, 0), Err(ViewError::NullArgument));
        assert_eq!(empty.out_raw(None, 0, 0), Err(ViewError::NullArgument));
        assert_eq!(empty.in_raw(Some(&[1u8][..]), 0, 0), Err(ViewError::NullArgument));
        let mut sink = [0u8; 4];
        assert_eq!(empty.out_raw(Some(&mut sink[..]), 0, 0), Err(ViewError::NullArgument));
        assert_eq!(empty.out_raw(Some(&mut sink[..]), 4, 0), Err(ViewError::NullArgument));
        assert_eq!(sink, [0u8; 4]);

        let mut byte = [0u8; 1];
        let view = ByteView::new(&mut byte);
        assert_eq!(view.in_raw(None, 0, 0), Err(ViewError::NullArgument));
        assert_eq!(view.out_raw(None, 0, 0), Err(ViewError::NullArgument));
    }

    #[test]
    fn test_raw_out_of_range() {
        let mut byte = [5u8; 1];
        let view = ByteView::new(&mut byte);
        let source = [1u8; 8];
        assert!(view.in_raw(Some(&source[..]), 8, 0).unwrap_err().is_out_of_range());

        let mut out = [0u8; 8];
        assert!(view.out_raw(Some(&mut out[..]), 8, 0).unwrap_err().is_out_of_range());
        // Source shorter than the requested count
        assert!(view.in_raw(Some(&source[..0]), 1, 0).unwrap_err().is_out_of_range());
        assert_eq!(byte, [5]);
    }

    #[test]
    fn test_raw_zero_bytes_on_data() {
        let mut byte = [5u8; 1];
        let view = ByteView::new(&mut byte);
        let nothing: [u8; 0] = [];
        let mut sink: [u8; 0] = [];
        view.in_raw(Some(&nothing[..]), 0, 1).unwrap();
        view.out_raw(Some(&mut sink[..]), 0, 0).unwrap();
    }

    #[test]
    fn test_typed_errors() {
        let empty = ByteView::default();
        assert_eq!(empty.in_type(&0usize, 0), Err(ViewError::NullArgument));
        let mut obj = 0usize;
        assert_eq!(empty.out_type(&mut obj, 0), Err(ViewError::NullArgument));

        let mut small = [0u8; 1];
        let view = ByteView::new(&mut small);
        assert!(view.in_type(&7usize, 0).unwrap_err().is_out_of_range());
        assert!(view.out_type(&mut obj, 0).unwrap_err().is_out_of_range());
        assert!(view.in_type(&1u8, 1).unwrap_err().is_out_of_range());
        assert!(view.in_type(&1u8, usize::MAX).unwrap_err().is_out_of_range());
        assert_eq!(obj, 0);
    }

    #[test]
    fn test_string_errors() {
        let empty = ByteView::default();
        let mut text = String::new();
        assert_eq!(empty.in_type("", 0), Err(ViewError::NullArgument));
        assert_eq!(empty.out_type(&mut text, 0), Err(ViewError::NullArgument));

        let mut small = [0u8; 1];
        let view = ByteView::new(&mut small);
        assert!(view.in_type("", 0).unwrap_err().is_out_of_range());
        assert!(view.out_type(&mut text, 0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_string_declared_length_too_long() {
        let mut storage = [0u8; 12];
        let view = ByteView::new(&mut storage);
        view.in_type(&5u64, 0).unwrap();
        let err = view.read::<String>(0).unwrap_err();
        assert_eq!(err, ViewError::out_of_range(8, 5, 12));

        view.in_type(&u64::MAX, 0).unwrap();
        assert!(view.read::<String>(0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_string_write_does_not_partially_mutate() {
        let mut storage = [0xAAu8; 10];
        let view = ByteView::new(&mut storage);
        assert!(view.in_type("abc", 0).is_err());
        assert_eq!(storage, [0xAA; 10]);
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut storage = [0u8; 10];
        let view = ByteView::new(&mut storage);
        view.in_type(&2u64, 0).unwrap();
        view.in_raw(Some(&[0xFFu8, 0xFE][..]), 2, 8).unwrap();
        assert_eq!(view.read::<String>(0), Err(ViewError::InvalidText { offset: 8 }));
    }

    #[test]
    fn test_hash_and_array_layout() {
        let mut storage = [0u8; 16];
        let view = ByteView::new(&mut storage);
        let digest = crate::hash::hash(b"abc");
        view.in_type(b"PKSNAP\0\x01", 0).unwrap();
        view.in_type(&digest, 8).unwrap();
        assert_eq!(&view.read::<[u8; 8]>(0).unwrap(), b"PKSNAP\0\x01");
        assert_eq!(view.read::<HashValue>(8).unwrap(), digest);
    }

    #[test]
    fn test_cursor_sequence() {
        let mut storage = vec![0u8; 64];
        let view = ByteView::new(&mut storage);
        let mut writer = ViewCursor::new(view);
        writer.write(&42u32).unwrap();
        writer.write("path/to/file").unwrap();
        writer.write(&-1i64).unwrap();
        assert_eq!(writer.position(), 4 + 8 + 12 + 8);
        assert_eq!(writer.remaining(), 64 - writer.position());

        let mut reader = ViewCursor::new(view);
        assert_eq!(reader.read::<u32>().unwrap(), 42);
        assert_eq!(reader.read::<String>().unwrap(), "path/to/file");
        assert_eq!(reader.read::<i64>().unwrap(), -1);
        assert_eq!(reader.position(), writer.position());
    }

    #[test]
    fn test_cursor_stops_at_end() {
        let mut storage = [0u8; 6];
        let mut cursor = ViewCursor::new(ByteView::new(&mut storage));
        cursor.write(&1u32).unwrap();
        assert!(cursor.write(&1u32).is_err());
        assert_eq!(cursor.position(), 4);
    }

    proptest! {
        #[test]
        fn prop_fixed_round_trip(value in any::<i64>(), pad in 0usize..16) {
            let mut storage = vec![0u8; pad + 8];
            let view = ByteView::new(&mut storage);
            view.in_type(&value, pad).unwrap();
            prop_assert_eq!(view.read::<i64>(pad).unwrap(), value);
        }

        #[test]
        fn prop_string_round_trip(text in ".{0,64}", pad in 0usize..16, slack in 0usize..16) {
            let mut storage = vec![0u8; pad + text.encoded_len() + slack];
            let view = ByteView::new(&mut storage);
            view.in_type(text.as_str(), pad).unwrap();
            prop_assert_eq!(view.read::<String>(pad).unwrap(), text);
        }
    }
}
