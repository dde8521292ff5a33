//! General purpose data structures
//!
//! `Array<I, T>` is a `std::vec::Vec` wrapper whose first template argument
//! specifies the type that is used for indexing. This prevents us from
//! accidentally looking up a witness variable in a table keyed by literals,
//! or similar mixups that are easy to make in index arithmetic.

mod array;

use crate::config;
use std::ops::Range;

pub use crate::memory::array::Array;

/// Trait for types that can be used as an array index.
pub trait Offset {
    fn as_offset(&self) -> usize;
}

impl Offset for usize {
    fn as_offset(&self) -> usize {
        *self
    }
}

/// Check if an offset is contained in a half-open range.
/// # Panics
/// Panic if bounds checking is enabled and the index is out of the given bounds.
pub fn assert_in_bounds(bounds: Range<usize>, offset: usize) {
    if config::ENABLE_BOUNDS_CHECKING {
        assert!(
            bounds.contains(&offset),
            "array index out of bounds: {} (range is {:?})",
            offset,
            bounds,
        );
    }
}
