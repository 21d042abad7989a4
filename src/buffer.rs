use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};
use core::slice;

use allocator_api2::alloc::{Allocator, Global};

use crate::columns::{Column, Columns};
use crate::error::TryReserveError;
use crate::util;

/// A single allocation split into one column per element type of `S`.
///
/// For a capacity `cap`, column `i` starts at byte offset
/// `cap * (sum of the sizes of the columns before i)`. Capacities are always
/// rounded up to a multiple of the largest column alignment, which keeps
/// every column aligned without padding.
///
/// The buffer never tracks which rows are initialized. It does not drop
/// elements; that is the job of the container built on top of it (see
/// [`ColumnVec`](crate::ColumnVec)).
pub struct ColumnBuffer<S: Columns, A: Allocator = Global> {
    data: NonNull<u8>,
    cap: usize,
    allocator: A,
    _marker: PhantomData<S>,
}

unsafe impl<S: Columns + Send, A: Allocator + Send> Send for ColumnBuffer<S, A> {}
unsafe impl<S: Columns + Sync, A: Allocator + Sync> Sync for ColumnBuffer<S, A> {}

impl<S: Columns> ColumnBuffer<S, Global> {
    /// Creates an empty buffer without doing any memory allocation.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a buffer with room for at least `cap` rows.
    pub fn with_capacity(cap: usize) -> Self {
        Self::with_capacity_in(cap, Global)
    }
}

impl<S: Columns, A: Allocator> ColumnBuffer<S, A> {
    /// Size in bytes of one row across all columns.
    pub const ROW_SIZE: usize = S::PACKED_SIZE;
    /// Alignment of the allocation, and granularity of the capacity.
    pub const ALIGNMENT: usize = S::MAX_ALIGN;

    /// Capacity actually used for a request of `cap` rows.
    ///
    /// # Panics
    ///
    /// On arithmetic overflow.
    pub const fn round_capacity(cap: usize) -> usize {
        match util::checked_round_up(cap, S::MAX_ALIGN) {
            Some(cap) => cap,
            None => panic!("capacity overflow"),
        }
    }

    /// Creates an empty buffer without doing any memory allocation.
    pub fn new_in(allocator: A) -> Self {
        ColumnBuffer {
            data: NonNull::dangling(),
            cap: 0,
            allocator,
            _marker: PhantomData,
        }
    }

    pub fn try_with_capacity_in(cap: usize, allocator: A) -> Result<Self, TryReserveError> {
        let mut buffer = Self::new_in(allocator);
        if cap > 0 {
            buffer.try_reallocate(cap, 0)?;
        }

        Ok(buffer)
    }

    pub fn with_capacity_in(cap: usize, allocator: A) -> Self {
        match Self::try_with_capacity_in(cap, allocator) {
            Ok(buffer) => buffer,
            Err(err) => util::handle_reserve_error(err),
        }
    }

    /// Number of rows the buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.cap != 0
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Start of the allocation, or null if the buffer is unallocated.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        if self.cap == 0 {
            return ptr::null();
        }

        self.data.as_ptr()
    }

    /// First element of column `I`, or null if the buffer is unallocated.
    #[inline]
    pub fn column<const I: usize>(&self) -> *const <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        self.column_ptr::<I>()
    }

    #[inline]
    pub fn column_mut<const I: usize>(&mut self) -> *mut <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        self.column_ptr::<I>()
    }

    /// Column `I` as a slice of possibly uninitialized values, `capacity()` long.
    pub fn column_uninit<const I: usize>(&self) -> &[MaybeUninit<<S as Column<I>>::Type>]
    where
        S: Column<I>,
    {
        if self.cap == 0 {
            return &[];
        }

        unsafe { slice::from_raw_parts(self.column_ptr::<I>() as *const MaybeUninit<_>, self.cap) }
    }

    pub fn column_uninit_mut<const I: usize>(&mut self) -> &mut [MaybeUninit<<S as Column<I>>::Type>]
    where
        S: Column<I>,
    {
        if self.cap == 0 {
            return &mut [];
        }

        unsafe { slice::from_raw_parts_mut(self.column_ptr::<I>() as *mut MaybeUninit<_>, self.cap) }
    }

    #[inline]
    fn column_ptr<const I: usize>(&self) -> *mut <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        if self.cap == 0 {
            return ptr::null_mut();
        }

        unsafe {
            self.data
                .as_ptr()
                .add(self.cap * <S as Column<I>>::PREFIX_SIZE)
                .cast()
        }
    }

    /// Pointers to the first element of every column.
    #[inline]
    pub(crate) fn ptrs(&self) -> S::Ptrs {
        if self.cap == 0 {
            return S::null_ptrs();
        }

        unsafe { S::column_ptrs(self.data.as_ptr(), self.cap) }
    }

    /// Moves the storage to a new allocation of at least `cap` rows.
    ///
    /// The first `min(capacity(), cap)` rows of every column are copied
    /// bitwise; the remaining rows of the new allocation are uninitialized.
    /// Resizing to zero does nothing, use [`clear`](Self::clear) to release
    /// the storage.
    pub fn try_resize(&mut self, cap: usize) -> Result<(), TryReserveError> {
        if cap == 0 {
            return Ok(());
        }

        self.try_reallocate(cap, self.cap)
    }

    pub fn resize(&mut self, cap: usize) {
        if let Err(err) = self.try_resize(cap) {
            util::handle_reserve_error(err);
        }
    }

    /// Releases the storage. The buffer is unallocated afterwards.
    pub fn clear(&mut self) {
        if self.cap == 0 {
            return;
        }

        unsafe {
            let layout = Layout::from_size_align_unchecked(self.cap * S::PACKED_SIZE, S::MAX_ALIGN);
            self.allocator.deallocate(self.data, layout);
        }

        self.data = NonNull::dangling();
        self.cap = 0;
    }

    /// Allocates a block of `cap` rows (rounded up), copies the first `rows`
    /// rows of every column into it and releases the previous block.
    #[cold]
    pub(crate) fn try_reallocate(&mut self, cap: usize, rows: usize) -> Result<(), TryReserveError> {
        let new_cap = util::checked_round_up(cap, S::MAX_ALIGN).ok_or(TryReserveError::CapacityOverflow {
            rows: cap,
            row_size: S::PACKED_SIZE,
        })?;
        let layout = util::block_layout(new_cap, S::PACKED_SIZE, S::MAX_ALIGN)?;

        let new_data = self
            .allocator
            .allocate(layout)
            .map_err(|_| TryReserveError::AllocError { layout })?
            .cast::<u8>();

        let rows = rows.min(self.cap).min(new_cap);
        if self.cap != 0 {
            unsafe {
                let src = S::column_ptrs(self.data.as_ptr(), self.cap);
                let dst = S::column_ptrs(new_data.as_ptr(), new_cap);
                S::copy_rows(&src, &dst, rows);
            }
        }

        log::trace!(
            "column buffer: {} -> {} rows of {} bytes, {} rows moved",
            self.cap,
            new_cap,
            S::PACKED_SIZE,
            rows,
        );

        self.clear();
        self.data = new_data;
        self.cap = new_cap;

        Ok(())
    }
}

impl<S: Columns> Default for ColumnBuffer<S, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Columns + Copy, A: Allocator + Clone> Clone for ColumnBuffer<S, A> {
    /// Copies the whole block, including rows that were never written.
    fn clone(&self) -> Self {
        let copy = Self::with_capacity_in(self.cap, self.allocator.clone());
        debug_assert_eq!(copy.cap, self.cap);
        unsafe {
            ptr::copy_nonoverlapping(
                self.data.as_ptr(),
                copy.data.as_ptr(),
                self.cap * S::PACKED_SIZE,
            );
        }

        copy
    }
}

impl<S: Columns, A: Allocator> Drop for ColumnBuffer<S, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: Columns, A: Allocator> fmt::Debug for ColumnBuffer<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ColumnBuffer")
            .field("capacity", &self.cap)
            .field("row_size", &S::PACKED_SIZE)
            .finish()
    }
}
