//! Simulated annealing.

use std::fmt::Debug;

use crate::error::SearchResult;
use crate::search::SteppableSearch;
use crate::search::ensure_running;
use crate::space::Edge;
use crate::space::Node;

/// Stochastic local search.
///
/// Step `t` reads the temperature `schedule(t)`, starting at 0, and looks at a
/// uniformly random neighbour. Improvements are always taken. A move losing
/// `d` utility is taken with probability `exp(-d / temperature)`.
///
/// Concludes once the temperature isn't positive or the current node has no
/// edges. Schedules that never reach zero never conclude.
pub struct SimulatedAnnealing<N, F, S, R>
where
    N: Node,
    F: FnMut(&N) -> f64,
    S: FnMut(usize) -> f64,
    R: rand::Rng,
{
    get_utility: F,
    schedule: S,
    rng: R,

    current: N,
    utility: f64,
    best: (N, f64),
    steps: usize,
    moves: usize,
    is_concluded: bool,
}

impl<N, F, S, R> SimulatedAnnealing<N, F, S, R>
where
    N: Node,
    F: FnMut(&N) -> f64,
    S: FnMut(usize) -> f64,
    R: rand::Rng,
{
    #[must_use]
    pub fn new(source: N, mut get_utility: F, schedule: S, rng: R) -> Self {
        let utility = get_utility(&source);
        Self {
            get_utility,
            schedule,
            rng,
            best: (source.clone(), utility),
            current: source,
            utility,
            steps: 0,
            moves: 0,
            is_concluded: false,
        }
    }

    pub fn current(&self) -> &N {
        &self.current
    }
    pub fn utility(&self) -> f64 {
        self.utility
    }
    /// Best node seen so far and its utility.
    pub fn best(&self) -> (&N, f64) {
        (&self.best.0, self.best.1)
    }
    pub fn steps(&self) -> usize {
        self.steps
    }
    pub fn moves(&self) -> usize {
        self.moves
    }

    fn conclude(&mut self, reason: &str) {
        log::debug!(
            "Annealing {reason} after {} steps and {} moves at {:?} ({})",
            self.steps,
            self.moves,
            self.current,
            self.utility
        );
        self.is_concluded = true;
    }
}

impl<N, F, S, R> SteppableSearch for SimulatedAnnealing<N, F, S, R>
where
    N: Node,
    F: FnMut(&N) -> f64,
    S: FnMut(usize) -> f64,
    R: rand::Rng,
{
    fn is_concluded(&self) -> bool {
        self.is_concluded
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded)?;

        let temperature = (self.schedule)(self.steps);
        self.steps += 1;
        if temperature <= 0.0 || temperature.is_nan() {
            self.conclude("froze");
            return Ok(());
        }

        let mut edges = self.current.edges();
        if edges.is_empty() {
            self.conclude("got stuck");
            return Ok(());
        }
        let edge = edges.swap_remove(self.rng.random_range(0..edges.len()));
        let next = edge.to();
        let utility = (self.get_utility)(&next);

        let delta = utility - self.utility;
        if delta > 0.0 || self.rng.random::<f64>() < (delta / temperature).exp() {
            log::trace!("Moving through {edge:?} to {utility} at {temperature}");
            if utility > self.best.1 {
                self.best = (next.clone(), utility);
            }
            self.current = next;
            self.utility = utility;
            self.moves += 1;
        }
        Ok(())
    }
}

impl<N, F, S, R> Debug for SimulatedAnnealing<N, F, S, R>
where
    N: Node,
    F: FnMut(&N) -> f64,
    S: FnMut(usize) -> f64,
    R: rand::Rng,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SimulatedAnnealing")
            .field("current", &self.current)
            .field("utility", &self.utility)
            .field("steps", &self.steps)
            .field("is_concluded", &self.is_concluded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::error::SearchError;
    use crate::graphs::adjacency::AdjacencyGraph;
    use crate::graphs::adjacency::AdjacencyNode;

    fn linear(start: f64, steps: usize) -> impl FnMut(usize) -> f64 {
        move |t| start * (1.0 - t as f64 / steps as f64)
    }

    #[test]
    fn concludes_when_frozen() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 1)]);
        let mut search = SimulatedAnnealing::new(
            graph.node(1),
            |n: &AdjacencyNode| f64::from(n.id()),
            linear(10.0, 50),
            ChaCha8Rng::seed_from_u64(0),
        );
        search.complete().unwrap();

        assert_eq!(search.steps(), 51);
        assert!(search.moves() > 0);
        assert_eq!(search.best(), (&graph.node(2), 2.0));
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));
    }

    #[test]
    fn concludes_on_dead_ends() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2)]);
        let mut search = SimulatedAnnealing::new(
            graph.node(1),
            |n: &AdjacencyNode| f64::from(n.id()),
            |_| 1.0,
            ChaCha8Rng::seed_from_u64(0),
        );
        search.complete().unwrap();
        assert_eq!(search.current(), &graph.node(2));
        assert_eq!(search.steps(), 2);
    }

    #[test]
    fn always_takes_improvements() {
        // A chain of strictly better nodes is climbed one step at a time.
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4)]);
        let mut search = SimulatedAnnealing::new(
            graph.node(1),
            |n: &AdjacencyNode| f64::from(n.id()),
            |_| 1e-9,
            ChaCha8Rng::seed_from_u64(3),
        );
        for expected in 2..=4 {
            search.next_step().unwrap();
            assert_eq!(search.current(), &graph.node(expected));
        }
        search.next_step().unwrap();
        assert!(search.is_concluded());
        assert_eq!(search.moves(), 3);
    }

    #[test]
    fn cold_searches_reject_worse_moves() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2)]);
        let mut search = SimulatedAnnealing::new(
            graph.node(1),
            |n: &AdjacencyNode| -1000.0 * f64::from(n.id()),
            |t| if t < 20 { 1e-3 } else { 0.0 },
            ChaCha8Rng::seed_from_u64(11),
        );
        search.complete().unwrap();
        assert_eq!(search.current(), &graph.node(1));
        assert_eq!(search.moves(), 0);
        assert_eq!(search.steps(), 21);
    }

    #[test]
    fn hot_searches_wander() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 1)]);
        let mut search = SimulatedAnnealing::new(
            graph.node(1),
            |n: &AdjacencyNode| -f64::from(n.id()),
            |t| if t < 1000 { 1e9 } else { 0.0 },
            ChaCha8Rng::seed_from_u64(5),
        );
        search.complete().unwrap();
        // Losing one unit of utility is nearly free when this hot.
        assert!(search.moves() > 900);
        assert_eq!(search.best(), (&graph.node(1), -1.0));
    }
}
