//! Structure-of-arrays containers.
//!
//! Rows are tuples such as `(bool, i32, f64)`. Instead of storing the rows
//! one after the other, the containers in this crate store each element type
//! in its own contiguous column:
//!
//! - [`ColumnBuffer`]: a raw allocation split into columns, without any
//!   notion of which rows are initialized.
//! - [`ColumnVec`]: a growable vector of rows on top of a `ColumnBuffer`.
//! - [`ColumnArray`]: a fixed number of rows stored inline.
//!
//! Rows are read and written through [`RefTuple`]s, tuples of references
//! into the columns that compare and assign like the rows themselves.
//! Iterators and cursors can expose a subset of the columns, in any order,
//! with [`Idx`] selections:
//!
//! ```
//! use column_buffer::{ColumnVec, Idx};
//!
//! let mut v: ColumnVec<(bool, i32, f64)> = ColumnVec::new();
//! v.push((true, 1, 1.0));
//! v.push((false, 2, 2.0));
//!
//! let sum: f64 = v.iter().select::<(Idx<2>,)>().map(|row| *row.get::<0>()).sum();
//! assert_eq!(sum, 3.0);
//! ```
//!
//! The [`select`] module provides the same projections for plain tuples and
//! any iterator over tuple-like rows.
//!
//! # Features
//!
//! - `checks`: keep the bounds checks of the `get_unchecked` accessors in
//!   release builds.

#[macro_use]
mod macros;

mod util;

pub mod array;
pub mod buffer;
pub mod columns;
pub mod error;
pub mod iter;
pub mod reference;
pub mod select;
pub mod vec;

pub use allocator_api2::alloc::{AllocError, Allocator, Global};

pub use array::ColumnArray;
pub use buffer::ColumnBuffer;
pub use columns::{All, CloneColumns, Column, Columns, Idx, Selection};
pub use error::{LengthError, TryReserveError};
pub use iter::{Cursor, Iter, IterMut};
pub use reference::RefTuple;
pub use vec::ColumnVec;

/// Rounds `cap` up to the capacity granularity of the row type `S`.
pub const fn round_capacity<S: Columns>(cap: usize) -> usize {
    util::round_up(cap, S::MAX_ALIGN)
}

/// Sum of the sizes of the column types of `S`.
pub const fn packed_size<S: Columns>() -> usize {
    S::PACKED_SIZE
}

/// Largest alignment among the column types of `S`.
pub const fn max_align<S: Columns>() -> usize {
    S::MAX_ALIGN
}

#[test]
fn type_list_helpers() {
    assert_eq!(packed_size::<(bool, i32, f64)>(), 13);
    assert_eq!(max_align::<(bool, i32, f64)>(), 8);
    assert_eq!(max_align::<(u8,)>(), 1);
    assert_eq!(round_capacity::<(bool, i32, f64)>(13), 16);
    assert_eq!(round_capacity::<(u8, u16)>(0), 0);
}
