//! Row iterators and cursors over column storage.

use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::columns::{All, Columns, Selection};

/// Iterator over shared views of the rows of a column container.
///
/// `P` selects which columns each yielded row exposes.
pub struct Iter<'a, S: Columns, P: Selection<S> = All> {
    ptrs: S::Ptrs,
    start: usize,
    end: usize,
    _marker: PhantomData<(&'a S, fn() -> P)>,
}

impl<'a, S: Columns, P: Selection<S>> Iter<'a, S, P> {
    /// # Safety
    ///
    /// The first `len` rows of `ptrs` must be initialized and must not be
    /// mutated during `'a`.
    #[inline]
    pub(crate) unsafe fn new(ptrs: S::Ptrs, len: usize) -> Self {
        Iter { ptrs, start: 0, end: len, _marker: PhantomData }
    }

    /// Iterates over the same remaining rows, exposing the columns selected by `Q`.
    #[inline]
    pub fn select<Q: Selection<S>>(self) -> Iter<'a, S, Q> {
        Iter { ptrs: self.ptrs, start: self.start, end: self.end, _marker: PhantomData }
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> Iterator for Iter<'a, S, P> {
    type Item = P::Ref<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }

        let row = unsafe { P::row_ref(&self.ptrs, self.start) };
        self.start += 1;

        Some(row)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.start = self.start.saturating_add(n).min(self.end);
        self.next()
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> DoubleEndedIterator for Iter<'a, S, P> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }

        self.end -= 1;

        Some(unsafe { P::row_ref(&self.ptrs, self.end) })
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> ExactSizeIterator for Iter<'a, S, P> {}
impl<'a, S: Columns + 'a, P: Selection<S>> FusedIterator for Iter<'a, S, P> {}

impl<'a, S: Columns, P: Selection<S>> Clone for Iter<'a, S, P> {
    fn clone(&self) -> Self {
        Iter { ptrs: self.ptrs, start: self.start, end: self.end, _marker: PhantomData }
    }
}

impl<'a, S: Columns, P: Selection<S>> fmt::Debug for Iter<'a, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &(self.end - self.start)).finish()
    }
}

/// Iterator over mutable views of the rows of a column container.
pub struct IterMut<'a, S: Columns, P: Selection<S> = All> {
    ptrs: S::Ptrs,
    start: usize,
    end: usize,
    _marker: PhantomData<(&'a mut S, fn() -> P)>,
}

impl<'a, S: Columns, P: Selection<S>> IterMut<'a, S, P> {
    /// # Safety
    ///
    /// The first `len` rows of `ptrs` must be initialized and must not be
    /// otherwise accessed during `'a`.
    #[inline]
    pub(crate) unsafe fn new(ptrs: S::Ptrs, len: usize) -> Self {
        IterMut { ptrs, start: 0, end: len, _marker: PhantomData }
    }

    /// # Panics
    ///
    /// If `Q` selects the same column more than once.
    #[inline]
    pub fn select<Q: Selection<S>>(self) -> IterMut<'a, S, Q> {
        assert!(<Q as Selection<S>>::DISJOINT, "mutable projection selects the same column twice");
        IterMut { ptrs: self.ptrs, start: self.start, end: self.end, _marker: PhantomData }
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> Iterator for IterMut<'a, S, P> {
    type Item = P::Mut<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }

        let row = unsafe { P::row_mut(&self.ptrs, self.start) };
        self.start += 1;

        Some(row)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.start;
        (n, Some(n))
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> DoubleEndedIterator for IterMut<'a, S, P> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }

        self.end -= 1;

        Some(unsafe { P::row_mut(&self.ptrs, self.end) })
    }
}

impl<'a, S: Columns + 'a, P: Selection<S>> ExactSizeIterator for IterMut<'a, S, P> {}
impl<'a, S: Columns + 'a, P: Selection<S>> FusedIterator for IterMut<'a, S, P> {}

impl<'a, S: Columns, P: Selection<S>> fmt::Debug for IterMut<'a, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &(self.end - self.start)).finish()
    }
}

/// A random-access position in a column container.
///
/// A cursor can point anywhere, including before the first row or past the
/// last one; only positions inside the container can be dereferenced.
/// Cursors compare and subtract by position, regardless of the columns they
/// select. Comparing cursors of different containers gives meaningless
/// results.
pub struct Cursor<'a, S: Columns, P: Selection<S> = All> {
    ptrs: S::Ptrs,
    index: isize,
    len: usize,
    _marker: PhantomData<(&'a S, fn() -> P)>,
}

impl<'a, S: Columns + 'a, P: Selection<S>> Cursor<'a, S, P> {
    /// # Safety
    ///
    /// The first `len` rows of `ptrs` must be initialized and must not be
    /// mutated during `'a`.
    #[inline]
    pub(crate) unsafe fn new(ptrs: S::Ptrs, index: isize, len: usize) -> Self {
        Cursor { ptrs, index, len, _marker: PhantomData }
    }

    #[inline]
    pub fn index(&self) -> isize {
        self.index
    }

    /// Whether the cursor points at a row.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index >= 0 && (self.index as usize) < self.len
    }

    /// The row under the cursor.
    #[inline]
    pub fn get(&self) -> Option<P::Ref<'a>> {
        self.offset(0)
    }

    /// The row `n` positions away from the cursor.
    #[inline]
    pub fn offset(&self, n: isize) -> Option<P::Ref<'a>> {
        let index = self.index.checked_add(n)?;
        if index < 0 || index as usize >= self.len {
            return None;
        }

        Some(unsafe { P::row_ref(&self.ptrs, index as usize) })
    }

    /// The same position, exposing the columns selected by `Q`.
    #[inline]
    pub fn select<Q: Selection<S>>(self) -> Cursor<'a, S, Q> {
        Cursor { ptrs: self.ptrs, index: self.index, len: self.len, _marker: PhantomData }
    }

    /// Rows from the cursor up to (excluding) `end`.
    ///
    /// Positions outside of the container are skipped.
    pub fn until<Q: Selection<S>>(self, end: Cursor<'a, S, Q>) -> Iter<'a, S, P> {
        let len = self.len as isize;
        let start = self.index.clamp(0, len) as usize;
        let end = end.index.clamp(0, len) as usize;

        Iter { ptrs: self.ptrs, start, end: end.max(start), _marker: PhantomData }
    }
}

impl<'a, S: Columns, P: Selection<S>> Clone for Cursor<'a, S, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: Columns, P: Selection<S>> Copy for Cursor<'a, S, P> {}

impl<'a, S: Columns, P: Selection<S>> fmt::Debug for Cursor<'a, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).field("len", &self.len).finish()
    }
}

impl<'a, S: Columns, P: Selection<S>> Add<isize> for Cursor<'a, S, P> {
    type Output = Self;

    #[inline]
    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<'a, S: Columns, P: Selection<S>> Sub<isize> for Cursor<'a, S, P> {
    type Output = Self;

    #[inline]
    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<'a, S: Columns, P: Selection<S>> AddAssign<isize> for Cursor<'a, S, P> {
    #[inline]
    fn add_assign(&mut self, n: isize) {
        self.index += n;
    }
}

impl<'a, S: Columns, P: Selection<S>> SubAssign<isize> for Cursor<'a, S, P> {
    #[inline]
    fn sub_assign(&mut self, n: isize) {
        self.index -= n;
    }
}

impl<'a, 'b, S: Columns, P: Selection<S>, Q: Selection<S>> Sub<Cursor<'b, S, Q>> for Cursor<'a, S, P> {
    type Output = isize;

    #[inline]
    fn sub(self, other: Cursor<'b, S, Q>) -> isize {
        self.index - other.index
    }
}

impl<'a, 'b, S: Columns, P: Selection<S>, Q: Selection<S>> PartialEq<Cursor<'b, S, Q>> for Cursor<'a, S, P> {
    #[inline]
    fn eq(&self, other: &Cursor<'b, S, Q>) -> bool {
        self.index == other.index
    }
}

impl<'a, S: Columns, P: Selection<S>> Eq for Cursor<'a, S, P> {}

impl<'a, 'b, S: Columns, P: Selection<S>, Q: Selection<S>> PartialOrd<Cursor<'b, S, Q>> for Cursor<'a, S, P> {
    #[inline]
    fn partial_cmp(&self, other: &Cursor<'b, S, Q>) -> Option<Ordering> {
        Some(self.index.cmp(&other.index))
    }
}

impl<'a, S: Columns, P: Selection<S>> Ord for Cursor<'a, S, P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

#[cfg(test)]
mod tests {
    use crate::columns::Idx;
    use crate::ColumnVec;

    fn sample() -> ColumnVec<(u32, char, f32)> {
        (0..5).map(|i| (i, (b'a' + i as u8) as char, i as f32 * 0.5)).collect()
    }

    #[test]
    fn forward_and_backward() {
        let v = sample();
        let mut iter = v.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next().unwrap(), (0, 'a', 0.0));
        assert_eq!(iter.next_back().unwrap(), (4, 'e', 2.0));
        assert_eq!(iter.len(), 3);

        let rest: Vec<u32> = iter.map(|row| *row.get::<0>()).collect();
        assert_eq!(rest, [1, 2, 3]);

        assert_eq!(v.iter().nth(3).unwrap(), (3, 'd', 1.5));
        assert!(v.iter().nth(5).is_none());
    }

    #[test]
    fn projected_iteration() {
        let v = sample();
        let letters: String = v
            .iter()
            .select::<(Idx<1>,)>()
            .map(|row| *row.get::<0>())
            .collect();
        assert_eq!(letters, "abcde");

        let mut iter = v.iter();
        iter.next();
        let swapped = iter.select::<(Idx<2>, Idx<0>)>().next().unwrap();
        assert_eq!(swapped, (0.5, 1));
    }

    #[test]
    fn mutable_iteration() {
        let mut v = sample();
        for mut row in v.iter_mut() {
            *row.get_mut::<0>() *= 10;
        }
        for mut row in v.iter_mut().select::<(Idx<2>,)>() {
            *row.get_mut::<0>() += 1.0;
        }

        assert_eq!(v.at(2), (20, 'c', 2.0));
        assert_eq!(v.iter_mut().rev().next().unwrap(), (40, 'e', 3.0));
    }

    #[test]
    #[should_panic(expected = "same column twice")]
    fn aliasing_mutable_iteration() {
        let mut v = sample();
        let _ = v.iter_mut().select::<(Idx<0>, Idx<0>)>();
    }

    #[test]
    fn cursor_arithmetic() {
        let v = sample();
        let begin = v.cursor_start();
        let end = v.cursor_end();
        assert_eq!(end - begin, 5);
        assert!(begin < end);

        let mut c = begin + 2;
        assert_eq!(c.get().unwrap(), (2, 'c', 1.0));
        assert_eq!(c.offset(-1).unwrap(), (1, 'b', 0.5));
        assert!(c.offset(10).is_none());

        c += 3;
        assert_eq!(c, end);
        assert!(c.get().is_none());
        assert!(!c.is_valid());

        c -= 6;
        assert_eq!(c.index(), -1);
        assert!(c.get().is_none());
        assert_eq!((c - 1).index(), -2);
    }

    #[test]
    fn cursor_projections_compare_by_position() {
        let v = sample();
        let begin = v.cursor_start().select::<(Idx<0>, Idx<2>)>();
        let end = v.cursor_end().select::<(Idx<0>, Idx<2>)>();
        assert_eq!(end - begin, 5);
        assert!(begin == v.cursor_start());
        assert!(end > v.cursor_start());
        assert_eq!((begin + 4).get().unwrap(), (4, 2.0));

        let middle: Vec<(u32, f32)> = (begin + 1).until(end - 1).map(|row| row.to_tuple()).collect();
        assert_eq!(middle, [(1, 0.5), (2, 1.0), (3, 1.5)]);

        assert_eq!((begin - 3).until(end + 3).count(), 5);
        assert_eq!(end.until(begin).count(), 0);
    }
}
