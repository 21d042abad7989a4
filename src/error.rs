use core::alloc::Layout;

use thiserror::Error;

/// Error returned by the fallible allocation methods of the column containers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TryReserveError {
    /// The requested block size does not fit in `isize::MAX` bytes.
    #[error("capacity overflow ({rows} rows of {row_size} bytes)")]
    CapacityOverflow { rows: usize, row_size: usize },
    /// The allocator returned an error.
    #[error("memory allocation failed for {layout:?}")]
    AllocError { layout: Layout },
}

/// Error returned when building a fixed-size column array from an iterator
/// that does not produce exactly the right number of rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum LengthError {
    #[error("expected {expected} rows, found {found}")]
    TooShort { expected: usize, found: usize },
    #[error("expected {expected} rows, found more")]
    TooLong { expected: usize },
}

#[test]
fn messages() {
    let err = TryReserveError::CapacityOverflow { rows: 3, row_size: 13 };
    assert_eq!(err.to_string(), "capacity overflow (3 rows of 13 bytes)");

    let err = LengthError::TooShort { expected: 4, found: 2 };
    assert_eq!(err.to_string(), "expected 4 rows, found 2");

    let err = LengthError::TooLong { expected: 4 };
    assert_eq!(err.to_string(), "expected 4 rows, found more");
}
