//! Implementation of search algorithms.
//!
//! These algorithms search generic graphs. The classic ones (BFS, DFS,
//! Dijkstra, A* and depth-limited DFS) share the [`crate::search::VisitedMap`]
//! and the [`crate::search::SteppableSearch`] contract. The and-or searches
//! build plans instead of paths, and the local searches only keep track of
//! where they stand.

mod uninformed;

// Classic
pub mod astar;
pub mod breadth_first;
pub mod depth_first;
pub mod dijkstra;
pub mod limited_depth_first;

// And-or
pub mod and_or_dfs;
pub mod steppable_and_or_dfs;

// Local
pub mod hill_climbing;
pub mod simulated_annealing;

pub use uninformed::EdgeFrontier;
pub use uninformed::UninformedSearch;
