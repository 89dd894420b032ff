//! Real-valued edge costs.

use std::iter::Sum;
use std::ops::Add;

use derive_more::Display;
use num_traits::SaturatingAdd;
use num_traits::Zero;
use ordered_float::FloatCore;
use ordered_float::OrderedFloat;

/// A [`crate::cost::Cost`] backed by a float.
///
/// `OrderedFloat` provides the total order frontiers rank by, with `NaN`
/// above every other value. Overflowing sums turn into infinity, so plain
/// float addition already saturates.
#[derive(Copy, Clone, Default, Debug, Display)]
#[repr(transparent)]
#[display("{_0}")]
pub struct FloatCost<F: FloatCore>(OrderedFloat<F>);

impl<F: FloatCore> FloatCost<F> {
    #[must_use]
    pub fn new(f: F) -> Self {
        Self(OrderedFloat(f))
    }

    pub fn value(&self) -> F {
        self.0.into_inner()
    }

    #[must_use]
    pub fn infinity() -> Self {
        Self::new(F::infinity())
    }
}

impl<F: FloatCore> From<F> for FloatCost<F> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl<F: FloatCore> Add for FloatCost<F> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<F: FloatCore> SaturatingAdd for FloatCost<F> {
    #[inline(always)]
    fn saturating_add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }
}

impl<F: FloatCore> Zero for FloatCost<F> {
    fn zero() -> Self {
        Self::new(F::zero())
    }
    fn is_zero(&self) -> bool {
        self.value().is_zero()
    }
}

// Derives would bound `F: Ord`, which no float is.
impl<F: FloatCore> PartialEq for FloatCost<F> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<F: FloatCore> Eq for FloatCost<F> {}
impl<F: FloatCore> PartialOrd for FloatCost<F> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<F: FloatCore> Ord for FloatCost<F> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<F: FloatCore> Sum for FloatCost<F> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}
