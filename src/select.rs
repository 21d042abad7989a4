//! Positional access and projection for tuple-like rows.
//!
//! These work on any row that can hand out references to its fields: a
//! reference to a plain tuple, a tuple of shared references, or a
//! [`RefTuple`] of shared references such as the rows yielded by
//! [`ColumnVec::iter`](crate::ColumnVec::iter). The result of a projection is
//! always a [`RefTuple`] of shared references.
//!
//! ```
//! use column_buffer::select::{get, select, SelectExt};
//! use column_buffer::Idx;
//!
//! let row = (1u8, 'b', 3.0f32);
//! assert_eq!(*get::<1, _>(&row), 'b');
//! assert_eq!(select::<(Idx<2>, Idx<0>), _>(&row), (3.0, 1));
//!
//! let rows = vec![(1, 'a'), (2, 'b')];
//! let letters: Vec<char> = rows.iter().get::<1>().copied().collect();
//! assert_eq!(letters, ['a', 'b']);
//! ```

use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::columns::{All, Idx};
use crate::reference::{Borrowed, RefTuple};

/// A row whose `I`-th field can be borrowed for the row's lifetime.
pub trait Field<const I: usize>: Copy {
    type Output: Borrowed;

    fn field(self) -> Self::Output;
}

/// A list of field positions that can be projected out of `T`.
pub trait Pick<T> {
    type Output;

    fn pick(item: T) -> Self::Output;
}

impl<T> Pick<T> for All {
    type Output = T;

    #[inline]
    fn pick(item: T) -> T {
        item
    }
}

/// Reference to the `I`-th field of `item`.
#[inline]
pub fn get<const I: usize, T: Field<I>>(item: T) -> T::Output {
    Field::<I>::field(item)
}

/// Projects `item` onto the fields listed by `P`, in the order of `P`.
#[inline]
pub fn select<P: Pick<T>, T>(item: T) -> P::Output {
    P::pick(item)
}

macro_rules! impl_field_at {
    ([$($all:ident)+]; [$($prev:ident)*]; $T:ident $idx:tt) => {
        impl<'a, $($all),+> Field<$idx> for &'a ($($all,)+) {
            type Output = &'a $T;

            #[inline]
            fn field(self) -> &'a $T {
                &self.$idx
            }
        }

        impl<'a, $($all),+> Field<$idx> for ($(&'a $all,)+) {
            type Output = &'a $T;

            #[inline]
            fn field(self) -> &'a $T {
                self.$idx
            }
        }

        impl<'a, $($all),+> Field<$idx> for RefTuple<($(&'a $all,)+)> {
            type Output = &'a $T;

            #[inline]
            fn field(self) -> &'a $T {
                self.into_inner().$idx
            }
        }
    };
}

macro_rules! impl_pick {
    ($($T:ident $U:ident $v:ident $idx:tt),+) => {
        impl<T, $(const $U: usize),+> Pick<T> for ($(Idx<$U>,)+)
        where
            T: $(Field<$U> +)+ Copy,
        {
            type Output = RefTuple<($(<T as Field<$U>>::Output,)+)>;

            #[inline]
            fn pick(item: T) -> Self::Output {
                RefTuple::new(($(<T as Field<$U>>::field(item),)+))
            }
        }

        for_each_index!(impl_field_at; [$($T)+]; []; $($T $idx),+);
    };
}

for_each_tuple!(impl_pick);

/// Projection adaptors for iterators over tuple-like rows.
pub trait SelectExt: Iterator + Sized {
    /// Projects every item onto the fields listed by `P`.
    fn select<P>(self) -> Select<Self, P>
    where
        P: Pick<Self::Item>,
    {
        Select { iter: self, _marker: PhantomData }
    }

    /// Yields a reference to the `I`-th field of every item.
    fn get<const I: usize>(self) -> GetField<Self, I>
    where
        Self::Item: Field<I>,
    {
        GetField { iter: self }
    }
}

impl<I: Iterator> SelectExt for I {}

/// Iterator returned by [`SelectExt::select`].
#[derive(Clone, Debug)]
pub struct Select<I, P> {
    iter: I,
    _marker: PhantomData<fn() -> P>,
}

impl<I, P> Iterator for Select<I, P>
where
    I: Iterator,
    P: Pick<I::Item>,
{
    type Item = P::Output;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(P::pick)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I, P> DoubleEndedIterator for Select<I, P>
where
    I: DoubleEndedIterator,
    P: Pick<I::Item>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(P::pick)
    }
}

impl<I: ExactSizeIterator, P: Pick<I::Item>> ExactSizeIterator for Select<I, P> {}
impl<I: FusedIterator, P: Pick<I::Item>> FusedIterator for Select<I, P> {}

/// Iterator returned by [`SelectExt::get`].
#[derive(Clone, Debug)]
pub struct GetField<I, const N: usize> {
    iter: I,
}

impl<I, const N: usize> Iterator for GetField<I, N>
where
    I: Iterator,
    I::Item: Field<N>,
{
    type Item = <I::Item as Field<N>>::Output;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(Field::<N>::field)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I, const N: usize> DoubleEndedIterator for GetField<I, N>
where
    I: DoubleEndedIterator,
    I::Item: Field<N>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(Field::<N>::field)
    }
}

impl<I: ExactSizeIterator, const N: usize> ExactSizeIterator for GetField<I, N> where I::Item: Field<N> {}
impl<I: FusedIterator, const N: usize> FusedIterator for GetField<I, N> where I::Item: Field<N> {}
