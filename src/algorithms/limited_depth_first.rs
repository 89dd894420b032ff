//! Depth-limited and iterative-deepening depth-first search.

use std::ops::RangeInclusive;

use derive_more::Display;
use rustc_hash::FxHashMap;

use crate::error::SearchError;
use crate::error::SearchResult;
use crate::search::ClassicSearch;
use crate::search::SteppableSearch;
use crate::search::VisitedMap;
use crate::search::ensure_running;
use crate::space::Edge;
use crate::space::Node;

/// Where a depth-limited search stands.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum LimitedSearchState {
    #[display("in progress")]
    InProgress,
    /// A target was found.
    #[display("completed")]
    Completed,
    /// Everything reachable was explored without finding a target.
    #[display("failed")]
    Failed,
    /// No target within the depth limit, but some node at the limit had an
    /// edge leading to a node not known to be that shallow.
    #[display("cut off")]
    CutOff,
}

/// Depth-first search that doesn't expand nodes deeper than `depth_limit`
/// edges from the source.
///
/// Every visited node remembers the shallowest depth it was reached at. When
/// a node is reached again through a strictly shorter path it is reopened,
/// so a subtree that was cut off earlier gets another chance.
pub struct LimitedDepthFirstSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    source: N,
    is_target: T,
    depth_limit: usize,

    visited: VisitedMap<N>,
    frontier: Vec<(N::Edge, usize)>,
    depths: FxHashMap<N, usize>,

    target: Option<N>,
    was_cut_off: bool,
    state: LimitedSearchState,
}

impl<N, T> LimitedDepthFirstSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    /// Initialises the search, visiting `source` right away.
    #[must_use]
    pub fn new(source: N, is_target: T, depth_limit: usize) -> Self {
        let mut search = Self {
            source,
            is_target,
            depth_limit,
            visited: VisitedMap::new(),
            frontier: vec![],
            depths: FxHashMap::default(),
            target: None,
            was_cut_off: false,
            state: LimitedSearchState::InProgress,
        };
        search.start();
        search
    }

    /// Throws away all progress and starts over with a different limit.
    pub fn restart(&mut self, depth_limit: usize) {
        self.depth_limit = depth_limit;
        self.visited = VisitedMap::new();
        self.frontier.clear();
        self.depths.clear();
        self.target = None;
        self.was_cut_off = false;
        self.state = LimitedSearchState::InProgress;
        self.start();
    }

    fn start(&mut self) {
        let source = self.source.clone();
        self.visited.insert_settled(source.clone(), None);
        self.depths.insert(source.clone(), 0);
        self.visit(source, 0);
    }

    pub fn state(&self) -> LimitedSearchState {
        self.state
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Shallowest depth a visited node was reached at.
    pub fn depth_of(&self, node: &N) -> Option<usize> {
        self.depths.get(node).copied()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    fn visit(&mut self, node: N, depth: usize) {
        log::trace!("Visiting {node:?} at depth {depth}");

        if (self.is_target)(&node) {
            log::debug!("Found target {node:?} at depth {depth}");
            self.target = Some(node);
            self.state = LimitedSearchState::Completed;
            return;
        }

        let next_depth = depth + 1;
        for edge in node.edges() {
            let to = edge.to();
            let known = self.depths.get(&to).copied();
            if known.is_some_and(|known| known <= next_depth) {
                continue;
            }
            if depth >= self.depth_limit {
                // The edge would have been followed with a higher limit.
                self.was_cut_off = true;
                break;
            }
            match known {
                Some(_) => self.visited.reopen(&to, edge.clone()),
                None => self.visited.discover(to.clone(), Some(edge.clone())),
            }
            self.depths.insert(to, next_depth);
            self.frontier.push((edge, next_depth));
        }

        if self.frontier.is_empty() {
            self.state = if self.was_cut_off {
                LimitedSearchState::CutOff
            } else {
                LimitedSearchState::Failed
            };
            log::debug!(
                "Depth limit {} {} after visiting {} nodes",
                self.depth_limit,
                self.state,
                self.visited.len()
            );
        }
    }
}

impl<N, T> SteppableSearch for LimitedDepthFirstSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn is_concluded(&self) -> bool {
        self.state != LimitedSearchState::InProgress
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded())?;

        // Running searches always have something on the frontier.
        let Some((edge, depth)) = self.frontier.pop() else {
            self.state = LimitedSearchState::Failed;
            return Ok(());
        };
        let node = edge.to();
        // Everything above an entry is deeper than it, so a pending entry is
        // never superseded by a shallower one.
        debug_assert_eq!(self.depths.get(&node), Some(&depth));
        self.visited.settle(&node);
        self.visit(node, depth);
        Ok(())
    }
}

impl<N, T> ClassicSearch<N> for LimitedDepthFirstSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }
    fn visited(&self) -> &VisitedMap<N> {
        &self.visited
    }
}

impl<N, T> std::fmt::Debug for LimitedDepthFirstSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("LimitedDepthFirstSearch")
            .field("depth_limit", &self.depth_limit)
            .field("visited", &self.visited.len())
            .field("frontier", &self.frontier.len())
            .field("target", &self.target)
            .field("state", &self.state)
            .finish()
    }
}

/// Runs depth-limited searches with growing limits until one of them isn't
/// cut off.
///
/// Each step advances the current run. Finishing a run that was cut off
/// restarts from the source with the next limit, unless the highest limit
/// was already tried.
pub struct IterativeDeepeningSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    current: LimitedDepthFirstSearch<N, T>,
    max_depth_limit: Option<usize>,
}

impl<N, T> IterativeDeepeningSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    /// Tries limits 0, 1, 2, ... without an upper bound.
    #[must_use]
    pub fn new(source: N, is_target: T) -> Self {
        let mut search = Self {
            current: LimitedDepthFirstSearch::new(source, is_target, 0),
            max_depth_limit: None,
        };
        search.deepen_if_cut_off();
        search
    }

    /// Tries every limit in `depth_limits`, in increasing order.
    pub fn with_depth_limits(
        source: N,
        is_target: T,
        depth_limits: RangeInclusive<usize>,
    ) -> SearchResult<Self> {
        if depth_limits.is_empty() {
            return Err(SearchError::InvalidArgument("empty range of depth limits"));
        }
        let mut search = Self {
            current: LimitedDepthFirstSearch::new(source, is_target, *depth_limits.start()),
            max_depth_limit: Some(*depth_limits.end()),
        };
        search.deepen_if_cut_off();
        Ok(search)
    }

    /// State of the current run. Final once the search concludes.
    pub fn state(&self) -> LimitedSearchState {
        self.current.state()
    }

    pub fn depth_limit(&self) -> usize {
        self.current.depth_limit()
    }

    fn deepen_if_cut_off(&mut self) {
        while self.current.state() == LimitedSearchState::CutOff
            && self
                .max_depth_limit
                .is_none_or(|max| self.current.depth_limit() < max)
        {
            let depth_limit = self.current.depth_limit() + 1;
            log::debug!("Deepening to {depth_limit}");
            self.current.restart(depth_limit);
        }
    }
}

impl<N, T> SteppableSearch for IterativeDeepeningSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn is_concluded(&self) -> bool {
        self.current.is_concluded()
    }

    fn next_step(&mut self) -> SearchResult<()> {
        self.current.next_step()?;
        self.deepen_if_cut_off();
        Ok(())
    }
}

impl<N, T> ClassicSearch<N> for IterativeDeepeningSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn target(&self) -> Option<&N> {
        self.current.target()
    }
    fn visited(&self) -> &VisitedMap<N> {
        self.current.visited()
    }
}

impl<N, T> std::fmt::Debug for IterativeDeepeningSearch<N, T>
where
    N: Node,
    T: FnMut(&N) -> bool,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("IterativeDeepeningSearch")
            .field("current", &self.current)
            .field("max_depth_limit", &self.max_depth_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::algorithms::breadth_first::BreadthFirstSearch;
    use crate::graphs::adjacency::AdjacencyGraph;
    use crate::graphs::adjacency::path_ids;

    #[test]
    fn finds_targets_within_the_limit() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 3, 2);
        search.complete().unwrap();

        assert_eq!(search.state(), LimitedSearchState::Completed);
        assert_eq!(path_ids(&search.path_to_target().unwrap()), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn cuts_off_at_the_limit() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 4, 2);
        search.complete().unwrap();

        assert_eq!(search.state(), LimitedSearchState::CutOff);
        assert_eq!(search.target(), None);
        assert!(!search.visited().contains(&graph.node(4)));
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));
    }

    #[test]
    fn leaves_at_the_limit_are_not_cut_off() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 9, 2);
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::Failed);
    }

    #[test]
    fn zero_limit_only_checks_the_source() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2)]);
        let search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 1, 0);
        assert_eq!(search.state(), LimitedSearchState::Completed);

        let search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 2, 0);
        assert_eq!(search.state(), LimitedSearchState::CutOff);

        let search = LimitedDepthFirstSearch::new(graph.node(2), |n| n.id() == 1, 0);
        assert_eq!(search.state(), LimitedSearchState::Failed);
    }

    #[test]
    fn shallower_paths_reopen_nodes() {
        // DFS goes 1 -> 3 -> 5 -> 4 first, reaching 4 at the limit where it's
        // cut off. Going through 2 reaches 4 at depth 2 and finds 6.
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (1, 3), (3, 5), (5, 4), (2, 4), (4, 6)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |n| n.id() == 6, 3);
        search.complete().unwrap();

        assert_eq!(search.state(), LimitedSearchState::Completed);
        assert_eq!(
            path_ids(&search.path_to_target().unwrap()),
            vec![(1, 2), (2, 4), (4, 6)]
        );
        assert_eq!(search.depth_of(&graph.node(4)), Some(2));
    }

    #[test]
    fn deeper_revisits_are_ignored() {
        let graph = AdjacencyGraph::from_edges(&[(1, 3), (1, 2), (2, 3), (3, 4)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |_| false, 5);
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::Failed);
        assert_eq!(search.depth_of(&graph.node(3)), Some(1));
        assert_eq!(search.visited().get(&graph.node(3)).unwrap().edge, graph.edge(1, 3));
        assert_eq!(search.depth_of(&graph.node(4)), Some(2));
        assert_eq!(search.visited().settled_len(), 4);
    }

    #[test]
    fn known_nodes_at_the_limit_are_not_cut_off() {
        // 3 sits at the limit, but its only edge leads back to the source.
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 1)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |_| false, 2);
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::Failed);
    }

    #[test]
    fn cycles_terminate() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 1), (2, 3), (3, 1)]);
        let mut search = LimitedDepthFirstSearch::new(graph.node(1), |_| false, 10);
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::Failed);
    }

    #[test]
    fn iterative_deepening_finds_shallowest_target() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4), (1, 5), (5, 4)]);
        let mut search = IterativeDeepeningSearch::new(graph.node(1), |n| n.id() == 4);
        search.complete().unwrap();

        assert_eq!(search.state(), LimitedSearchState::Completed);
        assert_eq!(search.depth_limit(), 2);
        assert_eq!(path_ids(&search.path_to_target().unwrap()), vec![(1, 5), (5, 4)]);
    }

    #[test]
    fn iterative_deepening_fails_on_finite_graphs() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 1)]);
        let mut search = IterativeDeepeningSearch::new(graph.node(1), |n| n.id() == 7);
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::Failed);
        assert_eq!(search.target(), None);
    }

    #[test]
    fn iterative_deepening_respects_the_range() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4), (4, 5)]);
        let mut search =
            IterativeDeepeningSearch::with_depth_limits(graph.node(1), |n| n.id() == 5, 1..=3)
                .unwrap();
        search.complete().unwrap();
        assert_eq!(search.state(), LimitedSearchState::CutOff);
        assert_eq!(search.depth_limit(), 3);
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));

        #[allow(clippy::reversed_empty_ranges)]
        let empty = IterativeDeepeningSearch::with_depth_limits(graph.node(1), |_| false, 3..=1);
        assert_eq!(
            empty.err(),
            Some(SearchError::InvalidArgument("empty range of depth limits"))
        );
    }

    #[test]
    fn iterative_deepening_matches_bfs_depths() {
        for seed in 0..20u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = AdjacencyGraph::random(&mut rng, 15, 30, 1);

            for goal in 0..15 {
                let mut bfs = BreadthFirstSearch::new(graph.node(0), |n| n.id() == goal);
                bfs.complete().unwrap();
                let mut iddfs = IterativeDeepeningSearch::new(graph.node(0), |n| n.id() == goal);
                iddfs.complete().unwrap();

                assert_eq!(bfs.target(), iddfs.target(), "seed {seed}, goal {goal}");
                if let Some(path) = bfs.path_to_target() {
                    assert_eq!(iddfs.depth_limit(), path.len(), "seed {seed}, goal {goal}");
                    assert_eq!(iddfs.path_to_target().map(|p| p.len()), Some(path.len()));
                }
            }
        }
    }
}
