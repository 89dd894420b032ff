//! Slot arithmetic for implicit `A`-ary heaps.
//!
//! The heap lives in a dense array, filled level by level. With `A = 2`,
//!
//! ```text
//! level 0:               0
//! level 1:       1               2
//! level 2:   3       4       5       6
//! level 3: 7   8   9  10  11  12  13  14
//! ```
//!
//! Only the deepest level may be partially filled, and always from the left.

use std::ops::RangeInclusive;

/// Arity of the heaps used by the searches.
pub const BINARY: usize = 2usize;

/// Slot holding the parent of slot `i`. The root (`0`) has none.
///
/// ```
/// use graph_search::heap_primitives::parent;
/// assert_eq!(parent::<2>(1), 0);
/// assert_eq!(parent::<2>(2), 0);
/// assert_eq!(parent::<2>(9), 4);
/// assert_eq!(parent::<2>(14), 6);
/// assert_eq!(parent::<3>(3), 0);
/// assert_eq!(parent::<3>(4), 1);
/// ```
#[inline(always)]
#[must_use]
pub fn parent<const A: usize>(i: usize) -> usize {
    debug_assert!(i > 0, "slot 0 is the root");
    (i - 1) / A
}

/// Left-most child slot of `i`.
///
/// ```
/// use graph_search::heap_primitives::first_child;
/// assert_eq!(first_child::<2>(0), 1);
/// assert_eq!(first_child::<2>(2), 5);
/// assert_eq!(first_child::<4>(1), 5);
/// ```
#[inline(always)]
#[must_use]
pub fn first_child<const A: usize>(i: usize) -> usize {
    A * i + 1
}

/// Right-most child slot of `i`.
#[inline(always)]
#[must_use]
pub fn last_child<const A: usize>(i: usize) -> usize {
    A * i + A
}

/// Every child slot of `i`, whether the array reaches that far or not.
///
/// ```
/// use graph_search::heap_primitives::children;
/// assert_eq!(children::<2>(3), 7..=8);
/// assert_eq!(children::<3>(0), 1..=3);
/// ```
#[inline(always)]
#[must_use]
pub fn children<const A: usize>(i: usize) -> RangeInclusive<usize> {
    first_child::<A>(i)..=last_child::<A>(i)
}
