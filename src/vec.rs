use core::fmt;
use core::mem;
use core::slice;

use allocator_api2::alloc::{Allocator, Global};

use crate::buffer::ColumnBuffer;
use crate::columns::{CloneColumns, Column, Columns};
use crate::error::TryReserveError;
use crate::iter::{Cursor, Iter, IterMut};
use crate::util;

/// A growable sequence of rows stored column by column.
///
/// Each element type of the row tuple `S` lives in its own contiguous
/// column inside a single [`ColumnBuffer`] allocation. Rows are appended with
/// [`push`](Self::push) and read back as [`RefTuple`](crate::RefTuple)s of
/// references into the columns.
///
/// ```
/// use column_buffer::ColumnVec;
///
/// let mut v: ColumnVec<(bool, i32, f64)> = ColumnVec::new();
/// v.push((true, 1, 1.0));
/// v.push((false, 2, 2.0));
///
/// assert_eq!(v.len(), 2);
/// assert_eq!(v.at(1), (false, 2, 2.0));
/// assert_eq!(v.column::<1>(), &[1, 2]);
/// ```
pub struct ColumnVec<S: Columns, A: Allocator = Global> {
    buffer: ColumnBuffer<S, A>,
    len: usize,
}

impl<S: Columns> ColumnVec<S, Global> {
    /// Creates an empty vector without doing any memory allocation.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty vector with room for at least `cap` rows.
    pub fn with_capacity(cap: usize) -> Self {
        Self::with_capacity_in(cap, Global)
    }
}

impl<S: Columns, A: Allocator> ColumnVec<S, A> {
    pub fn new_in(allocator: A) -> Self {
        ColumnVec {
            buffer: ColumnBuffer::new_in(allocator),
            len: 0,
        }
    }

    pub fn try_with_capacity_in(cap: usize, allocator: A) -> Result<Self, TryReserveError> {
        Ok(ColumnVec {
            buffer: ColumnBuffer::try_with_capacity_in(cap, allocator)?,
            len: 0,
        })
    }

    pub fn with_capacity_in(cap: usize, allocator: A) -> Self {
        ColumnVec {
            buffer: ColumnBuffer::with_capacity_in(cap, allocator),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of rows the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.buffer.capacity() - self.len
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        self.buffer.allocator()
    }

    /// Grows the storage to hold at least `capacity` rows in total.
    ///
    /// Does nothing if `capacity` does not exceed the current capacity, so
    /// this never shrinks. Otherwise the rows move to a new allocation sized
    /// for exactly `capacity` rows, rounded up to the column alignment.
    pub fn try_reserve_capacity(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.buffer.capacity() {
            return Ok(());
        }

        self.buffer.try_reallocate(capacity, self.len)
    }

    pub fn reserve_capacity(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve_capacity(capacity) {
            util::handle_reserve_error(err);
        }
    }

    /// Makes room for at least `additional` more rows.
    ///
    /// Same as [`reserve_capacity`](Self::reserve_capacity) with
    /// `len + additional` rows.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self.len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow {
            rows: usize::MAX,
            row_size: S::PACKED_SIZE,
        })?;

        self.try_reserve_capacity(required)
    }

    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            util::handle_reserve_error(err);
        }
    }

    #[cold]
    fn try_grow(&mut self) -> Result<(), TryReserveError> {
        self.try_reserve_capacity(util::grow_doubling(self.buffer.capacity()))
    }

    /// Appends a row, doubling the capacity if the vector is full.
    #[inline]
    pub fn push(&mut self, row: S) {
        if self.len == self.buffer.capacity() {
            if let Err(err) = self.try_grow() {
                util::handle_reserve_error(err);
            }
        }

        unsafe {
            S::write_row(&self.buffer.ptrs(), self.len, row);
        }
        self.len += 1;
    }

    /// Appends a row, or returns an error and drops the row if the storage
    /// could not grow.
    pub fn try_push(&mut self, row: S) -> Result<(), TryReserveError> {
        if self.len == self.buffer.capacity() {
            self.try_grow()?;
        }

        unsafe {
            S::write_row(&self.buffer.ptrs(), self.len, row);
        }
        self.len += 1;

        Ok(())
    }

    /// Appends a row if there is spare capacity, otherwise gives it back.
    #[inline]
    pub fn push_within_capacity(&mut self, row: S) -> Result<(), S> {
        if self.len == self.buffer.capacity() {
            return Err(row);
        }

        unsafe {
            S::write_row(&self.buffer.ptrs(), self.len, row);
        }
        self.len += 1;

        Ok(())
    }

    /// Drops every row. The capacity is unchanged.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        if len > 0 {
            unsafe {
                S::drop_rows(&self.buffer.ptrs(), 0, len);
            }
        }
    }

    /// View of row `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn at(&self, index: usize) -> S::Ref<'_> {
        if index >= self.len {
            util::index_out_of_bounds(index, self.len);
        }

        unsafe { S::row_ref(&self.buffer.ptrs(), index) }
    }

    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> S::Mut<'_> {
        if index >= self.len {
            util::index_out_of_bounds(index, self.len);
        }

        unsafe { S::row_mut(&self.buffer.ptrs(), index) }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<S::Ref<'_>> {
        if index >= self.len {
            return None;
        }

        Some(unsafe { S::row_ref(&self.buffer.ptrs(), index) })
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<S::Mut<'_>> {
        if index >= self.len {
            return None;
        }

        Some(unsafe { S::row_mut(&self.buffer.ptrs(), index) })
    }

    /// View of row `index` without bounds checking in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. The check is only performed in debug
    /// builds or with the `checks` feature.
    #[inline]
    #[track_caller]
    pub unsafe fn get_unchecked(&self, index: usize) -> S::Ref<'_> {
        util::assume_in_bounds(index, self.len);
        S::row_ref(&self.buffer.ptrs(), index)
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    #[track_caller]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> S::Mut<'_> {
        util::assume_in_bounds(index, self.len);
        S::row_mut(&self.buffer.ptrs(), index)
    }

    #[inline]
    pub fn front(&self) -> Option<S::Ref<'_>> {
        self.get(0)
    }

    #[inline]
    pub fn back(&self) -> Option<S::Ref<'_>> {
        self.get(self.len.wrapping_sub(1))
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<S::Mut<'_>> {
        self.get_mut(0)
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<S::Mut<'_>> {
        self.get_mut(self.len.wrapping_sub(1))
    }

    /// First element of column `I`, or null if no storage is allocated.
    #[inline]
    pub fn data<const I: usize>(&self) -> *const <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        self.buffer.column::<I>()
    }

    #[inline]
    pub fn data_mut<const I: usize>(&mut self) -> *mut <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        self.buffer.column_mut::<I>()
    }

    /// The initialized part of column `I`.
    #[inline]
    pub fn column<const I: usize>(&self) -> &[<S as Column<I>>::Type]
    where
        S: Column<I>,
    {
        if self.len == 0 {
            return &[];
        }

        unsafe { slice::from_raw_parts(self.buffer.column::<I>(), self.len) }
    }

    #[inline]
    pub fn column_mut<const I: usize>(&mut self) -> &mut [<S as Column<I>>::Type]
    where
        S: Column<I>,
    {
        if self.len == 0 {
            return &mut [];
        }

        let len = self.len;
        unsafe { slice::from_raw_parts_mut(self.buffer.column_mut::<I>(), len) }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, S> {
        unsafe { Iter::new(self.buffer.ptrs(), self.len) }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, S> {
        unsafe { IterMut::new(self.buffer.ptrs(), self.len) }
    }

    /// Cursor at row `index`. Any position may be used.
    #[inline]
    pub fn cursor(&self, index: isize) -> Cursor<'_, S> {
        unsafe { Cursor::new(self.buffer.ptrs(), index, self.len) }
    }

    /// Cursor at the first row.
    #[inline]
    pub fn cursor_start(&self) -> Cursor<'_, S> {
        self.cursor(0)
    }

    /// Cursor one past the last row.
    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, S> {
        self.cursor(self.len as isize)
    }
}

impl<S: Columns> Default for ColumnVec<S, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Columns, A: Allocator> Drop for ColumnVec<S, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: CloneColumns, A: Allocator + Clone> Clone for ColumnVec<S, A> {
    /// Clones every row into a new allocation with the same capacity.
    fn clone(&self) -> Self {
        let mut copy = ColumnVec::with_capacity_in(self.capacity(), self.allocator().clone());
        unsafe {
            S::clone_rows(&self.buffer.ptrs(), &copy.buffer.ptrs(), self.len);
        }
        copy.len = self.len;

        copy
    }
}

impl<S: Columns, A: Allocator> fmt::Debug for ColumnVec<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ColumnVec")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<S: Columns, A: Allocator> Extend<S> for ColumnVec<S, A> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower);

        for row in iter {
            self.push(row);
        }
    }
}

impl<S: Columns> FromIterator<S> for ColumnVec<S, Global> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut v = ColumnVec::new();
        v.extend(iter);
        v
    }
}

impl<'a, S: Columns + 'a, A: Allocator> IntoIterator for &'a ColumnVec<S, A> {
    type Item = S::Ref<'a>;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, S: Columns + 'a, A: Allocator> IntoIterator for &'a mut ColumnVec<S, A> {
    type Item = S::Mut<'a>;
    type IntoIter = IterMut<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::tests::TestAllocator;
    use crate::columns::Idx;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use std::rc::Rc;

    type Row = (bool, i32, f64);

    fn sample(n: i32) -> ColumnVec<Row> {
        (0..n).map(|i| (i % 2 == 0, i, i as f64)).collect()
    }

    #[test]
    fn empty() {
        let v: ColumnVec<Row> = ColumnVec::new();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
        assert!(v.is_empty());
        assert!(v.data::<0>().is_null());
        assert!(v.column::<2>().is_empty());
        assert!(v.front().is_none());
        assert!(v.back().is_none());
        assert!(v.get(0).is_none());
        assert_eq!(v.iter().count(), 0);
        assert_eq!(v.cursor_end() - v.cursor_start(), 0);
    }

    #[test]
    fn push_and_read() {
        let mut v: ColumnVec<Row> = ColumnVec::new();
        v.push((true, 1, 1.0));
        v.push((false, 2, 2.0));

        assert_eq!(v.len(), 2);
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.at(0), (true, 1, 1.0));
        assert_eq!(v.at(1), (false, 2, 2.0));
        assert_eq!(v.front().unwrap(), (true, 1, 1.0));
        assert_eq!(v.back().unwrap(), (false, 2, 2.0));
        assert!(v.get(2).is_none());
        assert_eq!(unsafe { v.get_unchecked(1) }, (false, 2, 2.0));

        assert_eq!(v.column::<0>(), &[true, false]);
        assert_eq!(v.column::<1>(), &[1, 2]);
        assert_eq!(v.column::<2>(), &[1.0, 2.0]);
    }

    #[test]
    fn growth_doubles() {
        let mut v: ColumnVec<(u8,)> = ColumnVec::new();
        let mut capacities = Vec::new();
        for i in 0..10 {
            v.push((i,));
            capacities.push(v.capacity());
        }
        assert_eq!(capacities, [2, 2, 4, 4, 8, 8, 8, 8, 16, 16]);
        assert_eq!(v.column::<0>(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn reserve_is_exact_and_rounded() {
        let mut v: ColumnVec<Row> = ColumnVec::new();
        v.reserve(3);
        assert_eq!(v.capacity(), 8);
        v.push((true, 1, 1.0));

        let before = v.data::<1>();
        v.reserve(7);
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.data::<1>(), before);

        v.reserve(8);
        assert_eq!(v.capacity(), 16);
        assert_eq!(v.at(0), (true, 1, 1.0));
    }

    #[test]
    fn reserve_total_capacity() {
        let mut v = sample(1);
        assert_eq!(v.capacity(), 8);

        let before = v.data::<2>();
        v.reserve_capacity(v.capacity());
        v.reserve_capacity(5);
        v.reserve_capacity(0);
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.data::<2>(), before);

        v.reserve_capacity(9);
        assert_eq!(v.capacity(), 16);
        assert_eq!(v.len(), 1);
        assert_eq!(v.at(0), (true, 0, 0.0));
        assert!(v.try_reserve_capacity(usize::MAX).is_err());
    }

    #[test]
    fn reserve_overflow() {
        let mut v = sample(3);
        assert!(matches!(
            v.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow { .. })
        ));
        assert!(v.try_reserve(usize::MAX / 8).is_err());
        assert_eq!(v.len(), 3);
        assert_eq!(v.at(2), (true, 2, 2.0));
    }

    #[test]
    fn write_through_rows() {
        let mut v = sample(4);
        v.at_mut(2).assign((false, 20, 0.5));
        *v.get_mut(3).unwrap().get_mut::<1>() = 30;
        v.front_mut().unwrap().replace((false, -1, -1.0));
        v.back_mut().unwrap().assign((true, 31, 3.5f32));

        assert_eq!(v.at(0), (false, -1, -1.0));
        assert_eq!(v.at(2), (false, 20, 0.5));
        assert_eq!(v.at(3), (true, 31, 3.5));

        v.column_mut::<1>().iter_mut().for_each(|x| *x += 100);
        assert_eq!(v.column::<1>(), &[99, 101, 120, 131]);

        unsafe {
            *v.data_mut::<2>().add(1) = 9.0;
        }
        assert_eq!(*v.at(1).get::<2>(), 9.0);
    }

    #[test]
    fn copy_between_rows() {
        let mut v = sample(3);
        let first = v.at(0).to_tuple();
        v.at_mut(2).assign(first);
        assert_eq!(v.at(2), v.at(0));
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds for length 3")]
    fn at_out_of_bounds() {
        let v = sample(3);
        let _ = v.at(3);
    }

    #[test]
    #[cfg(any(debug_assertions, feature = "checks"))]
    #[should_panic(expected = "out of bounds")]
    fn checked_unchecked_access() {
        let v = sample(3);
        let _ = unsafe { v.get_unchecked(5) };
    }

    #[test]
    fn rows_are_dropped() {
        let token = Rc::new(());
        let mut v: ColumnVec<(Rc<()>, u8, Rc<()>)> = ColumnVec::new();
        for i in 0..5 {
            v.push((token.clone(), i, token.clone()));
        }
        assert_eq!(Rc::strong_count(&token), 11);

        let copy = v.clone();
        assert_eq!(Rc::strong_count(&token), 21);
        assert_eq!(copy.column::<1>(), &[0, 1, 2, 3, 4]);
        assert_eq!(copy.capacity(), v.capacity());

        v.clear();
        assert_eq!(Rc::strong_count(&token), 11);
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 8);

        drop(copy);
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn clone_is_independent() {
        let v: ColumnVec<(String, u32)> = (0..4).map(|i| (i.to_string(), i)).collect();
        let mut w = v.clone();
        w.at_mut(1).assign(("changed", 10u32));

        assert_eq!(v.at(1), (String::from("1"), 1));
        assert_eq!(w.at(1), (String::from("changed"), 10));
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn iterate_in_order() {
        let v = sample(6);
        let sum: f64 = v.iter().map(|row| *row.get::<2>()).sum();
        assert_eq!(sum, 15.0);

        let mut index = 0;
        for row in &v {
            assert_eq!(row, v.at(index));
            index += 1;
        }
        assert_eq!(index, 6);

        let odd: Vec<i32> = v
            .iter()
            .select::<(Idx<0>, Idx<1>)>()
            .filter(|row| !*row.get::<0>())
            .map(|row| *row.get::<1>())
            .collect();
        assert_eq!(odd, [1, 3, 5]);

        for mut row in &mut v.clone() {
            *row.get_mut::<1>() = 0;
        }
    }

    #[test]
    fn zero_sized_columns() {
        let mut v: ColumnVec<((), u16)> = ColumnVec::new();
        for i in 0..100 {
            v.push(((), i));
        }
        assert_eq!(v.len(), 100);
        assert_eq!(v.at(99), ((), 99));
        assert_eq!(v.column::<0>().len(), 100);
    }

    #[test]
    fn custom_allocator() {
        let allocator = TestAllocator::new(600);
        let mut v: ColumnVec<(u64, u64), _> = ColumnVec::new_in(allocator.clone());
        for i in 0..32 {
            v.push((i, i * 2));
        }
        assert_eq!(allocator.live.get(), 1);
        assert_eq!(v.capacity(), 32);

        assert!(v.try_push((32, 64)).is_err());
        assert_eq!(v.len(), 32);
        assert_eq!(v.push_within_capacity((0, 0)), Err((0, 0)));

        let copy = v.clone();
        assert_eq!(allocator.live.get(), 2);
        assert_eq!(copy.at(31), (31, 62));

        drop(v);
        drop(copy);
        assert_eq!(allocator.live.get(), 0);
    }

    #[test]
    fn random_pushes() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut reference = Vec::new();
        let mut v: ColumnVec<(u8, i64, u16)> = ColumnVec::new();

        for _ in 0..1000 {
            let row: (u8, i64, u16) = (rng.gen(), rng.gen(), rng.gen());
            if rng.gen_bool(0.1) {
                v.reserve(rng.gen_range(0..64));
            }
            v.push(row);
            reference.push(row);
        }

        for (i, row) in reference.iter().enumerate() {
            assert_eq!(v.at(i), *row);
        }
        assert_eq!(v.capacity() % 8, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn matches_row_vec(rows in prop::collection::vec(any::<(u8, u32, i16)>(), 0..200)) {
            let v: ColumnVec<(u8, u32, i16)> = rows.iter().copied().collect();

            prop_assert_eq!(v.len(), rows.len());
            prop_assert!(v.capacity() >= v.len());
            prop_assert_eq!(v.capacity() % 4, 0);

            for (row, expected) in v.iter().zip(&rows) {
                prop_assert_eq!(row, *expected);
            }

            let column: Vec<u32> = rows.iter().map(|r| r.1).collect();
            prop_assert_eq!(v.column::<1>(), &column[..]);
            prop_assert_eq!(v.iter().rev().count(), rows.len());
        }

        #[test]
        fn reserve_keeps_rows(n in 0usize..100, extra in 0usize..300) {
            let mut v: ColumnVec<(u16, u64)> = (0..n).map(|i| (i as u16, i as u64 * 3)).collect();
            let old_cap = v.capacity();
            v.reserve(extra);

            prop_assert!(v.capacity() >= n + extra);
            prop_assert!(v.capacity() >= old_cap);
            for i in 0..n {
                prop_assert_eq!(v.at(i), (i as u16, i as u64 * 3));
            }
        }
    }
}
