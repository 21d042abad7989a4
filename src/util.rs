use core::alloc::Layout;

use crate::error::TryReserveError;

/// In debug builds (or with the `checks` feature), panics if `index` is not
/// below `len`. Otherwise tells the optimizer that it is.
#[track_caller]
#[inline(always)]
#[cfg(any(debug_assertions, feature = "checks"))]
pub unsafe fn assume_in_bounds(index: usize, len: usize) {
    if index >= len {
        index_out_of_bounds(index, len)
    }
}

#[track_caller]
#[inline(always)]
#[cfg(not(any(debug_assertions, feature = "checks")))]
pub unsafe fn assume_in_bounds(index: usize, len: usize) {
    if index >= len {
        unsafe {
            core::hint::unreachable_unchecked();
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
pub fn index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} out of bounds for length {len}");
}

/// Smallest multiple of `multiple` that is greater than or equal to `value`.
pub const fn round_up(value: usize, multiple: usize) -> usize {
    let rem = value % multiple;
    if rem == 0 {
        value
    } else {
        value + (multiple - rem)
    }
}

pub const fn checked_round_up(value: usize, multiple: usize) -> Option<usize> {
    let rem = value % multiple;
    if rem == 0 {
        Some(value)
    } else {
        value.checked_add(multiple - rem)
    }
}

/// Sum of the sizes, 0 for an empty list.
pub const fn packed_size(sizes: &[usize]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < sizes.len() {
        total += sizes[i];
        i += 1;
    }
    total
}

/// Largest alignment of the list, 1 for an empty list.
pub const fn max_align(aligns: &[usize]) -> usize {
    let mut max = 1;
    let mut i = 0;
    while i < aligns.len() {
        if aligns[i] > max {
            max = aligns[i];
        }
        i += 1;
    }
    max
}

pub const fn all_distinct(indices: &[usize]) -> bool {
    let mut i = 0;
    while i < indices.len() {
        let mut j = i + 1;
        while j < indices.len() {
            if indices[i] == indices[j] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Layout of a block holding `rows` rows of `row_size` bytes each.
pub fn block_layout(rows: usize, row_size: usize, align: usize) -> Result<Layout, TryReserveError> {
    let overflow = TryReserveError::CapacityOverflow { rows, row_size };
    let size = rows.checked_mul(row_size).ok_or(overflow.clone())?;

    Layout::from_size_align(size, align).map_err(|_| overflow)
}

/// Capacity to grow to when pushing into a full container.
pub fn grow_doubling(cap: usize) -> usize {
    cap.max(1).saturating_mul(2)
}

#[cold]
#[track_caller]
pub fn handle_reserve_error(err: TryReserveError) -> ! {
    match err {
        TryReserveError::AllocError { layout } => std::alloc::handle_alloc_error(layout),
        TryReserveError::CapacityOverflow { .. } => panic!("{err}"),
    }
}

#[test]
fn rounding() {
    assert_eq!(round_up(0, 8), 0);
    assert_eq!(round_up(1, 8), 8);
    assert_eq!(round_up(8, 8), 8);
    assert_eq!(round_up(9, 8), 16);
    assert_eq!(round_up(5, 1), 5);

    assert_eq!(checked_round_up(usize::MAX, 8), None);
    assert_eq!(checked_round_up(usize::MAX, 1), Some(usize::MAX));
}

#[test]
fn packed_and_aligned() {
    assert_eq!(packed_size(&[]), 0);
    assert_eq!(packed_size(&[1, 4, 8]), 13);
    assert_eq!(max_align(&[]), 1);
    assert_eq!(max_align(&[1, 4, 8]), 8);
    assert_eq!(max_align(&[4, 2]), 4);
}

#[test]
fn distinct_indices() {
    assert!(all_distinct(&[]));
    assert!(all_distinct(&[0, 2, 1]));
    assert!(!all_distinct(&[0, 2, 0]));
}

#[test]
fn layouts() {
    let layout = block_layout(16, 13, 8).unwrap();
    assert_eq!(layout.size(), 208);
    assert_eq!(layout.align(), 8);

    assert_eq!(
        block_layout(usize::MAX, 2, 8),
        Err(TryReserveError::CapacityOverflow { rows: usize::MAX, row_size: 2 })
    );
    assert!(block_layout(usize::MAX / 2, 2, 8).is_err());
}

#[test]
fn doubling() {
    assert_eq!(grow_doubling(0), 2);
    assert_eq!(grow_doubling(1), 2);
    assert_eq!(grow_doubling(16), 32);
    assert_eq!(grow_doubling(usize::MAX), usize::MAX);
}
