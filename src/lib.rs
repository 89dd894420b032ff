use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod data_structures;
pub mod error;
pub mod heap_primitives;

// Search space and shared machinery
// ---------------------------------
pub mod cost;
pub mod float_cost;
pub mod search;
pub mod space;

// Graphs
// ------
pub mod graphs;

// Algorithms
// ----------
pub mod algorithms;
