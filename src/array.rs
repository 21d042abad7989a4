use core::fmt;
use core::mem::MaybeUninit;

use crate::columns::{Column, Columns};
use crate::error::LengthError;
use crate::iter::{Cursor, Iter, IterMut};
use crate::util;

/// A fixed number of rows stored column by column, inline.
///
/// Unlike [`ColumnVec`](crate::ColumnVec) the storage is part of the value
/// and every row is always initialized. Each column is a `[T; N]` array and
/// the arrays are laid out one after the other, in column order, in a single
/// `#[repr(C)]` block (see [`Arrays3`](crate::columns::Arrays3)).
///
/// ```
/// use column_buffer::ColumnArray;
///
/// let a: ColumnArray<(u8, f32), 3> = ColumnArray::from_fn(|i| (i as u8, i as f32 / 2.0));
/// assert_eq!(a.at(2), (2, 1.0));
/// assert_eq!(a.column::<0>(), &[0, 1, 2]);
/// ```
pub struct ColumnArray<S: Columns, const N: usize> {
    columns: S::Arrays<N>,
}

impl<S: Columns, const N: usize> ColumnArray<S, N> {
    /// Builds the array by calling `f` with the index of every row, in order.
    ///
    /// If `f` panics, the rows it already produced are leaked.
    pub fn from_fn<F: FnMut(usize) -> S>(mut f: F) -> Self {
        let mut storage = MaybeUninit::<S::Arrays<N>>::uninit();
        unsafe {
            let ptrs = S::array_ptrs(storage.as_mut_ptr());
            for index in 0..N {
                S::write_row(&ptrs, index, f(index));
            }

            ColumnArray { columns: storage.assume_init() }
        }
    }

    pub fn from_rows(rows: [S; N]) -> Self {
        let mut storage = MaybeUninit::<S::Arrays<N>>::uninit();
        unsafe {
            let ptrs = S::array_ptrs(storage.as_mut_ptr());
            for (index, row) in rows.into_iter().enumerate() {
                S::write_row(&ptrs, index, row);
            }

            ColumnArray { columns: storage.assume_init() }
        }
    }

    /// Builds the array from exactly `N` rows.
    pub fn try_from_iter<I: IntoIterator<Item = S>>(rows: I) -> Result<Self, LengthError> {
        let mut storage = MaybeUninit::<S::Arrays<N>>::uninit();
        let mut rows = rows.into_iter();
        unsafe {
            let ptrs = S::array_ptrs(storage.as_mut_ptr());
            for index in 0..N {
                match rows.next() {
                    Some(row) => S::write_row(&ptrs, index, row),
                    None => {
                        S::drop_rows(&ptrs, 0, index);
                        return Err(LengthError::TooShort { expected: N, found: index });
                    }
                }
            }

            if rows.next().is_some() {
                S::drop_rows(&ptrs, 0, N);
                return Err(LengthError::TooLong { expected: N });
            }

            Ok(ColumnArray { columns: storage.assume_init() })
        }
    }

    /// The per-column arrays.
    #[inline]
    pub fn into_columns(self) -> S::Arrays<N> {
        self.columns
    }

    #[inline]
    pub fn columns(&self) -> &S::Arrays<N> {
        &self.columns
    }

    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline]
    fn ptrs(&self) -> S::Ptrs {
        // Must not be written through.
        unsafe { S::array_ptrs(&self.columns as *const S::Arrays<N> as *mut S::Arrays<N>) }
    }

    #[inline]
    fn ptrs_mut(&mut self) -> S::Ptrs {
        unsafe { S::array_ptrs(&mut self.columns) }
    }

    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn at(&self, index: usize) -> S::Ref<'_> {
        if index >= N {
            util::index_out_of_bounds(index, N);
        }

        unsafe { S::row_ref(&self.ptrs(), index) }
    }

    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> S::Mut<'_> {
        if index >= N {
            util::index_out_of_bounds(index, N);
        }

        unsafe { S::row_mut(&self.ptrs_mut(), index) }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<S::Ref<'_>> {
        if index >= N {
            return None;
        }

        Some(unsafe { S::row_ref(&self.ptrs(), index) })
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<S::Mut<'_>> {
        if index >= N {
            return None;
        }

        Some(unsafe { S::row_mut(&self.ptrs_mut(), index) })
    }

    /// # Safety
    ///
    /// `index` must be less than `N`. The check is only performed in debug
    /// builds or with the `checks` feature.
    #[inline]
    #[track_caller]
    pub unsafe fn get_unchecked(&self, index: usize) -> S::Ref<'_> {
        util::assume_in_bounds(index, N);
        S::row_ref(&self.ptrs(), index)
    }

    /// # Safety
    ///
    /// `index` must be less than `N`.
    #[inline]
    #[track_caller]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> S::Mut<'_> {
        util::assume_in_bounds(index, N);
        S::row_mut(&self.ptrs_mut(), index)
    }

    #[inline]
    pub fn front(&self) -> Option<S::Ref<'_>> {
        self.get(0)
    }

    #[inline]
    pub fn back(&self) -> Option<S::Ref<'_>> {
        self.get(N.wrapping_sub(1))
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<S::Mut<'_>> {
        self.get_mut(0)
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<S::Mut<'_>> {
        self.get_mut(N.wrapping_sub(1))
    }

    /// First element of column `I`.
    #[inline]
    pub fn data<const I: usize>(&self) -> *const <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        <S as Column<I>>::array_column(&self.columns).as_ptr()
    }

    #[inline]
    pub fn data_mut<const I: usize>(&mut self) -> *mut <S as Column<I>>::Type
    where
        S: Column<I>,
    {
        <S as Column<I>>::array_column_mut(&mut self.columns).as_mut_ptr()
    }

    #[inline]
    pub fn column<const I: usize>(&self) -> &[<S as Column<I>>::Type; N]
    where
        S: Column<I>,
    {
        <S as Column<I>>::array_column(&self.columns)
    }

    #[inline]
    pub fn column_mut<const I: usize>(&mut self) -> &mut [<S as Column<I>>::Type; N]
    where
        S: Column<I>,
    {
        <S as Column<I>>::array_column_mut(&mut self.columns)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, S> {
        unsafe { Iter::new(self.ptrs(), N) }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, S> {
        unsafe { IterMut::new(self.ptrs_mut(), N) }
    }

    #[inline]
    pub fn cursor(&self, index: isize) -> Cursor<'_, S> {
        unsafe { Cursor::new(self.ptrs(), index, N) }
    }

    #[inline]
    pub fn cursor_start(&self) -> Cursor<'_, S> {
        self.cursor(0)
    }

    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, S> {
        self.cursor(N as isize)
    }
}

impl<S: Columns + Default, const N: usize> Default for ColumnArray<S, N> {
    fn default() -> Self {
        Self::from_fn(|_| S::default())
    }
}

impl<S: Columns, const N: usize> From<[S; N]> for ColumnArray<S, N> {
    fn from(rows: [S; N]) -> Self {
        Self::from_rows(rows)
    }
}

impl<S: Columns, const N: usize> Clone for ColumnArray<S, N>
where
    S::Arrays<N>: Clone,
{
    fn clone(&self) -> Self {
        ColumnArray { columns: self.columns.clone() }
    }
}

impl<S: Columns, const N: usize> PartialEq for ColumnArray<S, N>
where
    S::Arrays<N>: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl<S: Columns, const N: usize> Eq for ColumnArray<S, N> where S::Arrays<N>: Eq {}

impl<S: Columns, const N: usize> fmt::Debug for ColumnArray<S, N>
where
    S::Arrays<N>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ColumnArray").field("columns", &self.columns).finish()
    }
}

impl<'a, S: Columns + 'a, const N: usize> IntoIterator for &'a ColumnArray<S, N> {
    type Item = S::Ref<'a>;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, S: Columns + 'a, const N: usize> IntoIterator for &'a mut ColumnArray<S, N> {
    type Item = S::Mut<'a>;
    type IntoIter = IterMut<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::Idx;
    use core::mem;
    use std::rc::Rc;

    #[test]
    fn default_rows() {
        let a: ColumnArray<(bool, i32, f64), 5> = ColumnArray::default();
        assert_eq!(a.len(), 5);
        for row in &a {
            assert_eq!(row, (false, 0, 0.0));
        }
        assert_eq!(a.column::<1>(), &[0; 5]);
    }

    #[test]
    fn read_and_write() {
        let mut a: ColumnArray<(u8, char, f32), 4> = ColumnArray::from_rows([
            (1, 'a', 0.5),
            (2, 'b', 1.5),
            (3, 'c', 2.5),
            (4, 'd', 3.5),
        ]);

        assert_eq!(a.at(1), (2, 'b', 1.5));
        assert_eq!(a.front().unwrap(), (1, 'a', 0.5));
        assert_eq!(a.back().unwrap(), (4, 'd', 3.5));
        assert!(a.get(4).is_none());
        assert_eq!(unsafe { a.get_unchecked(3) }, (4, 'd', 3.5));

        a.at_mut(0).assign((10, 'z', 0.0f32));
        *a.get_mut(1).unwrap().get_mut::<1>() = 'y';
        a.column_mut::<2>()[3] = -1.0;

        assert_eq!(a.column::<0>(), &[10, 2, 3, 4]);
        assert_eq!(a.column::<1>(), &['z', 'y', 'c', 'd']);
        assert_eq!(a.column::<2>(), &[0.0, 1.5, 2.5, -1.0]);
        assert_eq!(unsafe { *a.data::<0>().add(2) }, 3);

        for mut row in a.iter_mut().select::<(Idx<0>,)>() {
            *row.get_mut::<0>() += 1;
        }
        assert_eq!(a.columns().0, [11, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "index 4 out of bounds for length 4")]
    fn at_out_of_bounds() {
        let a: ColumnArray<(u8, u8), 4> = ColumnArray::default();
        let _ = a.at(4);
    }

    #[test]
    fn from_iterators() {
        let a = ColumnArray::<(u32, u64), 3>::try_from_iter((0..3).map(|i| (i, i as u64 * 2))).unwrap();
        assert_eq!(a.at(2), (2, 4));

        let short = ColumnArray::<(u32, u64), 3>::try_from_iter((0..2).map(|i| (i, 0)));
        assert_eq!(short.unwrap_err(), LengthError::TooShort { expected: 3, found: 2 });

        let long = ColumnArray::<(u32, u64), 3>::try_from_iter((0..).map(|i| (i, 0)));
        assert_eq!(long.unwrap_err(), LengthError::TooLong { expected: 3 });
    }

    #[test]
    fn failed_builds_drop_rows() {
        let token = Rc::new(());
        let result = ColumnArray::<(Rc<()>, u8), 4>::try_from_iter((0..2).map(|i| (token.clone(), i)));
        assert!(result.is_err());
        assert_eq!(Rc::strong_count(&token), 1);

        let result = ColumnArray::<(Rc<()>, u8), 4>::try_from_iter((0..9).map(|i| (token.clone(), i)));
        assert!(result.is_err());
        assert_eq!(Rc::strong_count(&token), 1);

        let a = ColumnArray::<(Rc<()>, u8), 4>::from_fn(|i| (token.clone(), i as u8));
        assert_eq!(Rc::strong_count(&token), 5);
        let b = a.clone();
        assert_eq!(Rc::strong_count(&token), 9);
        drop(a);
        drop(b);
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn clone_and_compare() {
        let a: ColumnArray<(i16, bool), 3> = ColumnArray::from_fn(|i| (i as i16, i % 2 == 0));
        let mut b = a.clone();
        assert_eq!(a, b);

        b.at_mut(2).assign((7i16, true));
        assert_ne!(a, b);
        assert_eq!(a.at(2), (2, true));
        assert_eq!(format!("{b:?}"), "ColumnArray { columns: ([0, 1, 7], [true, false, true]) }");
    }

    #[test]
    fn cursors() {
        let a: ColumnArray<(u8, u16), 6> = ColumnArray::from_fn(|i| (i as u8, i as u16 * 10));
        let begin = a.cursor_start();
        let end = a.cursor_end();
        assert_eq!(end - begin, 6);
        assert_eq!((begin + 5).get().unwrap(), (5, 50));
        assert_eq!(end.select::<(Idx<1>,)>().offset(-1).unwrap(), (50,));
        assert_eq!(a.iter().rev().map(|row| *row.get::<0>()).collect::<Vec<_>>(), [5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn column_offsets() {
        type Row = (u8, u64, u16);
        let a: ColumnArray<Row, 8> = ColumnArray::from_fn(|i| (i as u8, i as u64, i as u16));
        let base = a.data::<0>() as usize;
        assert_eq!(a.data::<1>() as usize - base, 8 * <Row as Column<1>>::PREFIX_SIZE);
        assert_eq!(a.data::<2>() as usize - base, 8 * <Row as Column<2>>::PREFIX_SIZE);
        assert_eq!(mem::size_of::<<Row as Columns>::Arrays<8>>(), 8 * <Row as Columns>::PACKED_SIZE);

        // Columns stay in order, padded up to the next alignment.
        let b: ColumnArray<Row, 3> = ColumnArray::default();
        let base = b.data::<0>() as usize;
        assert_eq!(b.data::<1>() as usize - base, 8);
        assert_eq!(b.data::<2>() as usize - base, 8 + 3 * 8);
    }

    #[test]
    fn empty_array() {
        let a: ColumnArray<(u8, String), 0> = ColumnArray::default();
        assert!(a.is_empty());
        assert!(a.front().is_none());
        assert_eq!(a.iter().count(), 0);
    }
}
