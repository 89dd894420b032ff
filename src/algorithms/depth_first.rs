//! Depth-first search.

use crate::algorithms::uninformed::UninformedSearch;
use crate::space::Node;

/// Depth-first search with a LIFO frontier of edges.
///
/// Expands the most recently discovered node first. Like BFS, a node is
/// discovered once and keeps the edge it was first reached through.
pub type DepthFirstSearch<N, T> = UninformedSearch<N, T, Vec<<N as Node>::Edge>>;
