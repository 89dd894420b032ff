//! The graph contract searches consume.
//!
//! Searches never own or mutate a graph. They only walk it through the
//! read-only accessors below, so the same algorithm works for graphs made of
//! references (`&'g Graph` plus an id), plain values (grid coordinates), or
//! domain-specific structures like and-or proof graphs.

use std::fmt::Debug;
use std::hash::Hash;

/// A node of a directed graph.
///
/// Equality and hashing must be consistent and stable for the whole search as
/// nodes are used as map keys.
pub trait Node: Clone + Debug + Eq + Hash {
    type Edge: Edge<Node = Self>;

    /// Outbound edges of this node.
    ///
    /// The order must be stable across calls within a search. Searches
    /// explore edges in this order (or its reverse for LIFO frontiers).
    fn edges(&self) -> Vec<Self::Edge>;
}

/// A directed edge.
pub trait Edge: Clone + Debug + Eq + Hash {
    type Node;

    fn from(&self) -> Self::Node;
    fn to(&self) -> Self::Node;
}
