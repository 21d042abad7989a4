//! A tuple of references that behaves like the row it points into.

use core::cmp::Ordering;
use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};

/// A fixed-size group of references, one per selected column of a row.
///
/// `R` is a tuple of references such as `(&'a bool, &'a mut f64)`. Comparing
/// two `RefTuple`s, or a `RefTuple` with a plain tuple, compares the values
/// the references point to, lexicographically. Assignment writes through the
/// references into the underlying storage.
///
/// ```
/// use column_buffer::ColumnVec;
///
/// let mut v: ColumnVec<(bool, i32, f64)> = ColumnVec::new();
/// v.push((true, 1, 1.0));
///
/// let mut row = v.at_mut(0);
/// row.assign((false, 2, 2.0));
/// assert_eq!(v.at(0), (false, 2, 2.0));
/// ```
///
/// Only tuples of references can be wrapped, so a `RefTuple` never owns the
/// values it compares and assigns:
///
/// ```compile_fail
/// use column_buffer::RefTuple;
///
/// let r = RefTuple::new((1, 2));
/// ```
#[derive(Clone, Copy, Hash)]
pub struct RefTuple<R> {
    refs: R,
}

mod sealed {
    pub trait Sealed {}
}

/// A shared or exclusive reference.
pub trait Borrowed: Deref + sealed::Sealed {}

impl<T: ?Sized> sealed::Sealed for &T {}
impl<T: ?Sized> sealed::Sealed for &mut T {}
impl<T: ?Sized> Borrowed for &T {}
impl<T: ?Sized> Borrowed for &mut T {}

/// A tuple of 1 to 8 [`Borrowed`] references.
pub trait Refs: sealed::Sealed {}

impl<R: Refs> RefTuple<R> {
    #[inline]
    pub fn new(refs: R) -> Self {
        RefTuple { refs }
    }
}

impl<R> RefTuple<R> {
    #[inline]
    pub fn into_inner(self) -> R {
        self.refs
    }

    /// The references, as a plain tuple.
    #[inline]
    pub fn as_inner(&self) -> &R {
        &self.refs
    }

    /// Value referenced by the `I`-th slot.
    #[inline]
    pub fn get<const I: usize>(&self) -> &<R as Slot<I>>::Target
    where
        R: Slot<I>,
    {
        Slot::<I>::slot(&self.refs)
    }

    #[inline]
    pub fn get_mut<const I: usize>(&mut self) -> &mut <R as Slot<I>>::Target
    where
        R: SlotMut<I>,
    {
        SlotMut::<I>::slot_mut(&mut self.refs)
    }
}

impl<R: Refs> From<R> for RefTuple<R> {
    fn from(refs: R) -> Self {
        RefTuple { refs }
    }
}

impl<R: fmt::Debug> fmt::Debug for RefTuple<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.refs.fmt(f)
    }
}

/// Positional access to the `I`-th reference of a tuple of references.
pub trait Slot<const I: usize> {
    type Target: ?Sized;

    fn slot(&self) -> &Self::Target;
}

pub trait SlotMut<const I: usize>: Slot<I> {
    fn slot_mut(&mut self) -> &mut Self::Target;
}

macro_rules! impl_slot_at {
    ([$($all:ident)+]; [$($prev:ident)*]; $T:ident $idx:tt) => {
        impl<$($all: Deref),+> Slot<$idx> for ($($all,)+) {
            type Target = <$T as Deref>::Target;

            #[inline]
            fn slot(&self) -> &Self::Target {
                &*self.$idx
            }
        }

        impl<$($all: Deref),+> SlotMut<$idx> for ($($all,)+)
        where
            $T: DerefMut,
        {
            #[inline]
            fn slot_mut(&mut self) -> &mut Self::Target {
                &mut *self.$idx
            }
        }
    };
}

macro_rules! impl_ref_tuple {
    ($($T:ident $U:ident $v:ident $idx:tt),+) => {
        impl<$($T: Borrowed),+> sealed::Sealed for ($($T,)+) {}
        impl<$($T: Borrowed),+> Refs for ($($T,)+) {}

        impl<$($T: Deref),+> RefTuple<($($T,)+)> {
            /// Shared references to every referenced value.
            #[inline]
            pub fn tie(&self) -> ($(&<$T as Deref>::Target,)+) {
                ($(&*self.refs.$idx,)+)
            }

            /// Clones the referenced values into an owned row.
            pub fn to_tuple(&self) -> ($(<$T as Deref>::Target,)+)
            where
                $(<$T as Deref>::Target: Clone,)+
            {
                ($((*self.refs.$idx).clone(),)+)
            }
        }

        impl<$($T),+> RefTuple<($($T,)+)>
        where
            $($T: DerefMut, <$T as Deref>::Target: Sized,)+
        {
            /// Converts each value and writes it through the matching
            /// reference, from left to right.
            pub fn assign<$($U),+>(&mut self, values: ($($U,)+))
            where
                $($U: Into<<$T as Deref>::Target>,)+
            {
                let ($($v,)+) = values;
                $(*self.refs.$idx = $v.into();)+
            }

            /// Same as [`assign`](Self::assign), consuming the handle.
            ///
            /// Works on rows bound without `mut`, such as `let row = v.at_mut(0);`.
            #[inline]
            pub fn set<$($U),+>(mut self, values: ($($U,)+))
            where
                $($U: Into<<$T as Deref>::Target>,)+
            {
                self.assign(values);
            }

            /// Writes the values referenced by `other` through these references.
            ///
            /// The source values are cloned before any of them is written.
            pub fn assign_from<$($U),+>(&mut self, other: &RefTuple<($($U,)+)>)
            where
                $($U: Deref<Target = <$T as Deref>::Target>, <$T as Deref>::Target: Clone,)+
            {
                let values = other.to_tuple();
                self.assign(values);
            }

            /// Writes `values` through the references and returns the previous values.
            pub fn replace(&mut self, values: ($(<$T as Deref>::Target,)+)) -> ($(<$T as Deref>::Target,)+) {
                let ($($v,)+) = values;
                ($(mem::replace(&mut *self.refs.$idx, $v),)+)
            }
        }

        impl<$($T: Deref, $U: Deref),+> PartialEq<RefTuple<($($U,)+)>> for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: PartialEq<<$U as Deref>::Target>,)+
        {
            #[inline]
            fn eq(&self, other: &RefTuple<($($U,)+)>) -> bool {
                $(*self.refs.$idx == *other.refs.$idx)&&+
            }
        }

        impl<$($T: Deref, $U),+> PartialEq<($($U,)+)> for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: PartialEq<$U>,)+
        {
            #[inline]
            fn eq(&self, other: &($($U,)+)) -> bool {
                $(*self.refs.$idx == other.$idx)&&+
            }
        }

        impl<$($T: Deref, $U),+> PartialEq<RefTuple<($($T,)+)>> for ($($U,)+)
        where
            $($U: PartialEq<<$T as Deref>::Target>,)+
        {
            #[inline]
            fn eq(&self, other: &RefTuple<($($T,)+)>) -> bool {
                $(self.$idx == *other.refs.$idx)&&+
            }
        }

        impl<$($T: Deref),+> Eq for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: Eq,)+
        {
        }

        impl<$($T: Deref, $U: Deref),+> PartialOrd<RefTuple<($($U,)+)>> for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: PartialOrd<<$U as Deref>::Target>,)+
        {
            fn partial_cmp(&self, other: &RefTuple<($($U,)+)>) -> Option<Ordering> {
                $(
                    match PartialOrd::partial_cmp(&*self.refs.$idx, &*other.refs.$idx) {
                        Some(Ordering::Equal) => {}
                        ordering => return ordering,
                    }
                )+
                Some(Ordering::Equal)
            }
        }

        impl<$($T: Deref, $U),+> PartialOrd<($($U,)+)> for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: PartialOrd<$U>,)+
        {
            fn partial_cmp(&self, other: &($($U,)+)) -> Option<Ordering> {
                $(
                    match PartialOrd::partial_cmp(&*self.refs.$idx, &other.$idx) {
                        Some(Ordering::Equal) => {}
                        ordering => return ordering,
                    }
                )+
                Some(Ordering::Equal)
            }
        }

        impl<$($T: Deref, $U),+> PartialOrd<RefTuple<($($T,)+)>> for ($($U,)+)
        where
            $($U: PartialOrd<<$T as Deref>::Target>,)+
        {
            fn partial_cmp(&self, other: &RefTuple<($($T,)+)>) -> Option<Ordering> {
                $(
                    match PartialOrd::partial_cmp(&self.$idx, &*other.refs.$idx) {
                        Some(Ordering::Equal) => {}
                        ordering => return ordering,
                    }
                )+
                Some(Ordering::Equal)
            }
        }

        impl<$($T: Deref),+> Ord for RefTuple<($($T,)+)>
        where
            $(<$T as Deref>::Target: Ord,)+
        {
            fn cmp(&self, other: &Self) -> Ordering {
                $(
                    match Ord::cmp(&*self.refs.$idx, &*other.refs.$idx) {
                        Ordering::Equal => {}
                        ordering => return ordering,
                    }
                )+
                Ordering::Equal
            }
        }

        for_each_index!(impl_slot_at; [$($T)+]; []; $($T $idx),+);
    };
}

for_each_tuple!(impl_ref_tuple);

macro_rules! impl_tail {
    ($HT:ident $HU:ident $hv:ident $hidx:tt) => {};
    ($HT:ident $HU:ident $hv:ident $hidx:tt, $($T:ident $U:ident $v:ident $idx:tt),+) => {
        impl<$HT, $($T),+> RefTuple<($HT, $($T,)+)> {
            /// Drops the first reference.
            #[inline]
            pub fn tail(self) -> RefTuple<($($T,)+)> {
                let (_, $($v,)+) = self.refs;
                RefTuple { refs: ($($v,)+) }
            }

            /// Splits off the first reference.
            #[inline]
            pub fn split_first(self) -> ($HT, RefTuple<($($T,)+)>) {
                let ($hv, $($v,)+) = self.refs;
                ($hv, RefTuple { refs: ($($v,)+) })
            }
        }
    };
}

for_each_tuple!(impl_tail);
