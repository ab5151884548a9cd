//! Byte buffer primitives
//!
//! [`ByteView`] is the non-owning, bounds-checked window every higher layer
//! reads and writes through; [`Buffer`] owns the storage views point into;
//! the [`codec`] module adds raw and typed I/O on top of a view.

mod buffer;
pub mod codec;
mod view;

pub use buffer::Buffer;
pub use codec::{Decode, Encode, FixedLayout, ViewCursor, LENGTH_PREFIX_SIZE};
pub use view::{ByteView, Elements};
