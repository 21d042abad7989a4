// Tuple impls are generated for 1 to 8 columns.
//
// Each column is described by four tokens: a type parameter name, a second
// generic name (used for the right-hand side of comparisons and for const
// column indices), a binding name and the tuple index.

macro_rules! count {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count!($($tail)*) };
}

macro_rules! for_each_tuple {
    ($callback:ident) => {
        $callback!(T0 U0 v0 0);
        $callback!(T0 U0 v0 0, T1 U1 v1 1);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5, T6 U6 v6 6);
        $callback!(T0 U0 v0 0, T1 U1 v1 1, T2 U2 v2 2, T3 U3 v3 3, T4 U4 v4 4, T5 U5 v5 5, T6 U6 v6 6, T7 U7 v7 7);
    };
}

// Invokes `$callback!([all types]; [types before the column]; Type index)` once
// per column of a tuple.
macro_rules! for_each_index {
    ($callback:ident; [$($all:ident)+]; [$($prev:ident)*];) => {};
    ($callback:ident; [$($all:ident)+]; [$($prev:ident)*]; $T:ident $idx:tt $(, $rest:ident $rest_idx:tt)*) => {
        $callback!([$($all)+]; [$($prev)*]; $T $idx);
        for_each_index!($callback; [$($all)+]; [$($prev)* $T]; $($rest $rest_idx),*);
    };
}
