//! Errors reported by searches and their data structures.
//!
//! These are all programming errors of the caller (or of an algorithm driving
//! a data structure), never runtime data conditions, so nothing here is ever
//! retried or recovered internally.

use thiserror::Error;

/// Misuse of a [`crate::data_structures::keyed_priority_queue::KeyedPriorityQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Element is already enqueued")]
    DuplicateElement,
    #[error("The queue is empty")]
    Empty,
    #[error("Element is not enqueued")]
    NotFound,
    #[error("Priorities can only be increased")]
    PriorityDecrease,
}

/// Misuse of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("The search has already concluded")]
    AlreadyConcluded,
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Frontier misuse: {0}")]
    Queue(#[from] QueueError),
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;
