/// Edge costs and accumulated path costs.
///
/// Costs must be non-negative for Dijkstra and A* to be optimal. That is the
/// caller's responsibility and it's never checked.
pub trait Cost:
    Copy
    + std::fmt::Debug
    + PartialEq
    + core::cmp::Eq
    + PartialOrd
    + Ord
    + num_traits::SaturatingAdd
    + num_traits::Zero
{
}

impl<T> Cost for T where
    T: Copy
        + std::fmt::Debug
        + PartialEq
        + core::cmp::Eq
        + PartialOrd
        + Ord
        + num_traits::SaturatingAdd
        + num_traits::Zero
{
}
