//! Steepest-ascent hill climbing.

use std::fmt::Debug;

use crate::error::SearchResult;
use crate::search::SteppableSearch;
use crate::search::ensure_running;
use crate::space::Edge;
use crate::space::Node;

/// Greedy local search.
///
/// Each step moves to the neighbour with the highest utility, as long as it
/// strictly improves on the current node. Ties keep the edge listed first.
/// Nothing is remembered besides the current node and the edges taken.
pub struct HillClimbing<N, U, F>
where
    N: Node,
    U: PartialOrd + Debug,
    F: FnMut(&N) -> U,
{
    get_utility: F,
    current: N,
    utility: U,
    trail: Vec<N::Edge>,
    is_concluded: bool,
}

impl<N, U, F> HillClimbing<N, U, F>
where
    N: Node,
    U: PartialOrd + Debug,
    F: FnMut(&N) -> U,
{
    #[must_use]
    pub fn new(source: N, mut get_utility: F) -> Self {
        let utility = get_utility(&source);
        Self {
            get_utility,
            current: source,
            utility,
            trail: vec![],
            is_concluded: false,
        }
    }

    pub fn current(&self) -> &N {
        &self.current
    }
    pub fn utility(&self) -> &U {
        &self.utility
    }
    /// Edges taken from the source to the current node.
    pub fn trail(&self) -> &[N::Edge] {
        &self.trail
    }
}

impl<N, U, F> SteppableSearch for HillClimbing<N, U, F>
where
    N: Node,
    U: PartialOrd + Debug,
    F: FnMut(&N) -> U,
{
    fn is_concluded(&self) -> bool {
        self.is_concluded
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded)?;

        let mut best: Option<(N::Edge, U)> = None;
        for edge in self.current.edges() {
            let utility = (self.get_utility)(&edge.to());
            if best.as_ref().is_none_or(|(_, u)| utility > *u) {
                best = Some((edge, utility));
            }
        }

        match best {
            Some((edge, utility)) if utility > self.utility => {
                log::trace!("Climbing {edge:?} to {utility:?}");
                self.current = edge.to();
                self.utility = utility;
                self.trail.push(edge);
            }
            _ => {
                log::debug!(
                    "Reached {:?} at {:?} after {} moves",
                    self.current,
                    self.utility,
                    self.trail.len()
                );
                self.is_concluded = true;
            }
        }
        Ok(())
    }
}

impl<N, U, F> Debug for HillClimbing<N, U, F>
where
    N: Node,
    U: PartialOrd + Debug,
    F: FnMut(&N) -> U,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("HillClimbing")
            .field("current", &self.current)
            .field("utility", &self.utility)
            .field("moves", &self.trail.len())
            .field("is_concluded", &self.is_concluded)
            .finish()
    }
}
