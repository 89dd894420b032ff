//! Graphs to search on.
//!
//! Searches only need the [`crate::space::Node`] and [`crate::space::Edge`]
//! contract. These implementations cover the usual shapes of graphs: nodes
//! borrowing a shared structure, plain value nodes, and and-or graphs built
//! from a logic knowledge base.

pub mod adjacency;
pub mod maze_2d;
pub mod propositional;
