//! Data structures backing the search frontiers.

pub mod cons_list;
pub mod keyed_priority_queue;
