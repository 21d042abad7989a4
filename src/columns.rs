//! Row types and column projections.
//!
//! A row type is a tuple of 1 to 8 element types. Each element type becomes a
//! column: a contiguous run of values of that type. The column layout of a
//! row type is described by the [`Columns`] trait, and [`Column`] gives typed
//! access to a single column by its position.
//!
//! A [`Selection`] names the columns a view exposes: [`All`] for every column
//! in order, or a tuple of [`Idx`] markers for a projection such as
//! `(Idx<0>, Idx<2>)`.

use core::fmt;
use core::mem;
use core::ptr;

use crate::reference::RefTuple;
use crate::util::{all_distinct, max_align, packed_size};

/// Column layout of a row type.
///
/// # Safety
///
/// Implementations must be consistent: `PACKED_SIZE` is the sum of the
/// column sizes, `MAX_ALIGN` the largest column alignment, and
/// `column_ptrs` must place column `i` at byte offset
/// `capacity * (size of the columns before i)`.
pub unsafe trait Columns: Sized {
    /// Number of columns.
    const WIDTH: usize;
    /// Sum of the sizes of the column types (no padding between them).
    const PACKED_SIZE: usize;
    /// Largest alignment among the column types.
    const MAX_ALIGN: usize;

    /// One raw pointer to the first element of each column.
    type Ptrs: Copy;
    /// Shared view of one row.
    type Ref<'a>
    where
        Self: 'a;
    /// Mutable view of one row.
    type Mut<'a>
    where
        Self: 'a;
    /// Inline storage for `N` rows, one array per column, in column order.
    type Arrays<const N: usize>;

    fn null_ptrs() -> Self::Ptrs;

    /// # Safety
    ///
    /// `base` must point to a block of at least `capacity * PACKED_SIZE` bytes
    /// aligned to `MAX_ALIGN`, and `capacity` must be a multiple of `MAX_ALIGN`.
    unsafe fn column_ptrs(base: *mut u8, capacity: usize) -> Self::Ptrs;

    /// # Safety
    ///
    /// `arrays` must be valid for writes (its contents may be uninitialized).
    unsafe fn array_ptrs<const N: usize>(arrays: *mut Self::Arrays<N>) -> Self::Ptrs;

    /// # Safety
    ///
    /// Row `index` must be in bounds of the columns and uninitialized.
    unsafe fn write_row(ptrs: &Self::Ptrs, index: usize, row: Self);

    /// Moves row `index` out of the columns.
    ///
    /// # Safety
    ///
    /// Row `index` must be initialized and is logically uninitialized afterwards.
    unsafe fn read_row(ptrs: &Self::Ptrs, index: usize) -> Self;

    /// # Safety
    ///
    /// Row `index` must be initialized and must not be mutated during `'a`.
    unsafe fn row_ref<'a>(ptrs: &Self::Ptrs, index: usize) -> Self::Ref<'a>
    where
        Self: 'a;

    /// # Safety
    ///
    /// Row `index` must be initialized and must not be otherwise accessed during `'a`.
    unsafe fn row_mut<'a>(ptrs: &Self::Ptrs, index: usize) -> Self::Mut<'a>
    where
        Self: 'a;

    /// Bitwise copy of the first `count` rows of every column.
    ///
    /// # Safety
    ///
    /// Both sets of columns must hold at least `count` rows and must not overlap.
    unsafe fn copy_rows(src: &Self::Ptrs, dst: &Self::Ptrs, count: usize);

    /// # Safety
    ///
    /// Rows `start..start + count` must be initialized and are logically
    /// uninitialized afterwards.
    unsafe fn drop_rows(ptrs: &Self::Ptrs, start: usize, count: usize);
}

/// Typed access to column `I` of a row type.
///
/// # Safety
///
/// `Type` must be the `I`-th element type and `PREFIX_SIZE` the sum of the
/// sizes of the element types before it.
pub unsafe trait Column<const I: usize>: Columns {
    type Type;
    const PREFIX_SIZE: usize;

    fn column_ptr(ptrs: &Self::Ptrs) -> *mut Self::Type;
    fn array_column<const N: usize>(arrays: &Self::Arrays<N>) -> &[Self::Type; N];
    fn array_column_mut<const N: usize>(arrays: &mut Self::Arrays<N>) -> &mut [Self::Type; N];
}

/// Row types whose columns can all be cloned.
///
/// `(A, B): Clone` does not let generic code clone an `A` on its own, so the
/// per-column bound lives here.
pub unsafe trait CloneColumns: Columns {
    /// Clones the first `count` rows of `src` into the uninitialized rows of `dst`.
    ///
    /// # Safety
    ///
    /// Same requirements as [`Columns::copy_rows`]. If a clone panics the rows
    /// already written to `dst` are leaked.
    unsafe fn clone_rows(src: &Self::Ptrs, dst: &Self::Ptrs, count: usize);
}

/// Selection of every column, in order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct All;

/// Selects column `I`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Idx<const I: usize>;

/// A list of columns of `S` exposed by a view.
///
/// # Safety
///
/// `row_ref` and `row_mut` may only create references into the columns
/// named by the selection.
pub unsafe trait Selection<S: Columns> {
    /// Number of selected columns.
    const COLUMNS: usize;
    /// False if a column is named more than once.
    const DISJOINT: bool;

    type Ref<'a>
    where
        S: 'a;
    type Mut<'a>
    where
        S: 'a;

    /// # Safety
    ///
    /// See [`Columns::row_ref`].
    unsafe fn row_ref<'a>(ptrs: &S::Ptrs, index: usize) -> Self::Ref<'a>
    where
        S: 'a;

    /// # Panics
    ///
    /// If the selection names a column twice.
    ///
    /// # Safety
    ///
    /// See [`Columns::row_mut`].
    unsafe fn row_mut<'a>(ptrs: &S::Ptrs, index: usize) -> Self::Mut<'a>
    where
        S: 'a;
}

unsafe impl<S: Columns> Selection<S> for All {
    const COLUMNS: usize = S::WIDTH;
    const DISJOINT: bool = true;

    type Ref<'a> = S::Ref<'a> where S: 'a;
    type Mut<'a> = S::Mut<'a> where S: 'a;

    #[inline]
    unsafe fn row_ref<'a>(ptrs: &S::Ptrs, index: usize) -> Self::Ref<'a>
    where
        S: 'a,
    {
        S::row_ref(ptrs, index)
    }

    #[inline]
    unsafe fn row_mut<'a>(ptrs: &S::Ptrs, index: usize) -> Self::Mut<'a>
    where
        S: 'a,
    {
        S::row_mut(ptrs, index)
    }
}

macro_rules! impl_columns {
    ($Arrays:ident; $($T:ident $U:ident $v:ident $idx:tt),+) => {
        /// Inline column storage: field `i` holds column `i`.
        ///
        /// Fields are laid out in order. When `N` is a multiple of the
        /// largest column alignment, column `i` starts at byte offset
        /// `N * <S as Column<i>>::PREFIX_SIZE`, as in a [`ColumnBuffer`](crate::ColumnBuffer)
        /// of capacity `N`. Otherwise a column may be followed by padding
        /// so that the next one is aligned.
        #[repr(C)]
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $Arrays<$($T),+>($(pub $T),+);

        impl<$($T: fmt::Debug),+> fmt::Debug for $Arrays<$($T),+> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_tuple("")$(.field(&self.$idx))+.finish()
            }
        }

        unsafe impl<$($T),+> Columns for ($($T,)+) {
            const WIDTH: usize = count!($($T)+);
            const PACKED_SIZE: usize = packed_size(&[$(mem::size_of::<$T>()),+]);
            const MAX_ALIGN: usize = max_align(&[$(mem::align_of::<$T>()),+]);

            type Ptrs = ($(*mut $T,)+);
            type Ref<'a> = RefTuple<($(&'a $T,)+)> where Self: 'a;
            type Mut<'a> = RefTuple<($(&'a mut $T,)+)> where Self: 'a;
            type Arrays<const N: usize> = $Arrays<$([$T; N]),+>;

            #[inline]
            fn null_ptrs() -> Self::Ptrs {
                ($(ptr::null_mut::<$T>(),)+)
            }

            #[inline]
            #[allow(unused_assignments)]
            unsafe fn column_ptrs(base: *mut u8, capacity: usize) -> Self::Ptrs {
                let mut offset = 0;
                ($({
                    let column = base.add(offset).cast::<$T>();
                    offset += capacity * mem::size_of::<$T>();
                    column
                },)+)
            }

            #[inline]
            unsafe fn array_ptrs<const N: usize>(arrays: *mut Self::Arrays<N>) -> Self::Ptrs {
                ($(ptr::addr_of_mut!((*arrays).$idx).cast::<$T>(),)+)
            }

            #[inline]
            unsafe fn write_row(ptrs: &Self::Ptrs, index: usize, row: Self) {
                let ($($v,)+) = row;
                $(ptr::write(ptrs.$idx.add(index), $v);)+
            }

            #[inline]
            unsafe fn read_row(ptrs: &Self::Ptrs, index: usize) -> Self {
                ($(ptr::read(ptrs.$idx.add(index)),)+)
            }

            #[inline]
            unsafe fn row_ref<'a>(ptrs: &Self::Ptrs, index: usize) -> Self::Ref<'a>
            where
                Self: 'a,
            {
                RefTuple::new(($(&*ptrs.$idx.add(index),)+))
            }

            #[inline]
            unsafe fn row_mut<'a>(ptrs: &Self::Ptrs, index: usize) -> Self::Mut<'a>
            where
                Self: 'a,
            {
                RefTuple::new(($(&mut *ptrs.$idx.add(index),)+))
            }

            unsafe fn copy_rows(src: &Self::Ptrs, dst: &Self::Ptrs, count: usize) {
                $(ptr::copy_nonoverlapping(src.$idx, dst.$idx, count);)+
            }

            unsafe fn drop_rows(ptrs: &Self::Ptrs, start: usize, count: usize) {
                $(ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptrs.$idx.add(start), count));)+
            }
        }

        unsafe impl<$($T: Clone),+> CloneColumns for ($($T,)+) {
            unsafe fn clone_rows(src: &Self::Ptrs, dst: &Self::Ptrs, count: usize) {
                $(
                    for i in 0..count {
                        ptr::write(dst.$idx.add(i), (*src.$idx.add(i)).clone());
                    }
                )+
            }
        }

        unsafe impl<S, $(const $U: usize),+> Selection<S> for ($(Idx<$U>,)+)
        where
            S: Columns $(+ Column<$U>)+,
        {
            const COLUMNS: usize = count!($($U)+);
            const DISJOINT: bool = all_distinct(&[$($U),+]);

            type Ref<'a> = RefTuple<($(&'a <S as Column<$U>>::Type,)+)> where S: 'a;
            type Mut<'a> = RefTuple<($(&'a mut <S as Column<$U>>::Type,)+)> where S: 'a;

            #[inline]
            unsafe fn row_ref<'a>(ptrs: &<S as Columns>::Ptrs, index: usize) -> Self::Ref<'a>
            where
                S: 'a,
            {
                RefTuple::new(($(&*<S as Column<$U>>::column_ptr(ptrs).add(index),)+))
            }

            #[inline]
            unsafe fn row_mut<'a>(ptrs: &<S as Columns>::Ptrs, index: usize) -> Self::Mut<'a>
            where
                S: 'a,
            {
                assert!(<Self as Selection<S>>::DISJOINT, "mutable projection selects the same column twice");
                RefTuple::new(($(&mut *<S as Column<$U>>::column_ptr(ptrs).add(index),)+))
            }
        }

        for_each_index!(impl_column_at; [$($T)+]; []; $($T $idx),+);
    };
}

macro_rules! impl_column_at {
    ([$($all:ident)+]; [$($prev:ident)*]; $T:ident $idx:tt) => {
        unsafe impl<$($all),+> Column<$idx> for ($($all,)+) {
            type Type = $T;
            const PREFIX_SIZE: usize = packed_size(&[$(mem::size_of::<$prev>()),*]);

            #[inline]
            fn column_ptr(ptrs: &Self::Ptrs) -> *mut $T {
                ptrs.$idx
            }

            #[inline]
            fn array_column<const N: usize>(arrays: &Self::Arrays<N>) -> &[$T; N] {
                &arrays.$idx
            }

            #[inline]
            fn array_column_mut<const N: usize>(arrays: &mut Self::Arrays<N>) -> &mut [$T; N] {
                &mut arrays.$idx
            }
        }
    };
}

impl_columns!(Arrays1; T0 U0 v0 0);
impl_columns!(Arrays2; T0 U0 v0 0, T1 U1 v1 1);
impl_columns!(Arrays3; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2);
impl_columns!(Arrays4; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3);
impl_columns!(Arrays5; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4);
impl_columns!(Arrays6; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5);
impl_columns!(Arrays7; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5, T6 U6 v6 6);
impl_columns!(Arrays8; T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5, T6 U6 v6 6, T7 U7 v7 7);
