//! A* search, Dijkstra guided by a heuristic.

use std::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::cost::Cost;
use crate::data_structures::keyed_priority_queue::KeyedPriorityQueue;
use crate::error::SearchResult;
use crate::search::ClassicSearch;
use crate::search::SteppableSearch;
use crate::search::VisitedMap;
use crate::search::ensure_running;
use crate::space::Edge;
use crate::space::Node;

/// The ranking tuple for A*
///
/// We prefer better (lower) f-values, and tie break for lower h.
///
/// Intuition around higher g-value might be slightly easier, but keeping the
/// raw h value helps to avoid recomputing it later.
///
/// ```
/// use graph_search::algorithms::astar::AStarRank;
///
/// assert!(AStarRank::new(2u32, 0u32) > AStarRank::new(2u32, 1u32));
/// assert!(AStarRank::new(0u32, 2u32) > AStarRank::new(2u32, 1u32));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
}
impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C) -> Self {
        Self {
            f: g.saturating_add(&h),
            h,
        }
    }
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
    /// Improves `g` in `Rank{f, h}` without recomputing `h`.
    #[must_use]
    pub fn with_g(self, new_g: C) -> Self {
        Self::new(new_g, self.h)
    }
}

/// PartialOrd is forwarded to Ord::cmp
impl<C: Cost> PartialOrd for AStarRank<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
/// Reversed (f, h)-order.
impl<C: Cost> Ord for AStarRank<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.f.cmp(&self.f).then_with(|| other.h.cmp(&self.h))
    }
}

/// A* search.
///
/// Expands nodes by lowest `g + h`, where `h` estimates the remaining cost to
/// a target. The heuristic is evaluated once per node, when it's discovered.
///
/// Settled nodes are never reopened, so the path found is a cheapest one when
/// the heuristic is consistent (`h(a) <= c(a, b) + h(b)` and `h(target) = 0`).
/// A zero heuristic turns this into Dijkstra.
pub struct AStarSearch<N, T, F, H, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    H: FnMut(&N) -> C,
    C: Cost,
{
    is_target: T,
    get_edge_cost: F,
    get_heuristic: H,

    visited: VisitedMap<N>,
    frontier: KeyedPriorityQueue<N, AStarRank<C>>,
    /// Best known g-value of every visited node.
    costs: FxHashMap<N, C>,

    target: Option<N>,
    is_concluded: bool,
}

impl<N, T, F, H, C> AStarSearch<N, T, F, H, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    H: FnMut(&N) -> C,
    C: Cost,
{
    /// Initialises the search, expanding `source` right away.
    #[must_use]
    pub fn new(source: N, is_target: T, get_edge_cost: F, get_heuristic: H) -> Self {
        let mut search = Self {
            is_target,
            get_edge_cost,
            get_heuristic,
            visited: VisitedMap::new(),
            frontier: KeyedPriorityQueue::new(),
            costs: FxHashMap::default(),
            target: None,
            is_concluded: false,
        };
        search.visited.insert_settled(source.clone(), None);
        search.costs.insert(source.clone(), C::zero());
        if let Err(e) = search.visit(source, C::zero()) {
            unreachable!("Expanding the source can't misuse an empty frontier: {e}");
        }
        search
    }

    /// Best known cost to a visited node.
    pub fn cost_to(&self, node: &N) -> Option<C> {
        self.costs.get(node).copied()
    }

    /// Cost of the path to the target found.
    pub fn target_cost(&self) -> Option<C> {
        self.cost_to(self.target.as_ref()?)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    fn visit(&mut self, node: N, g: C) -> SearchResult<()> {
        log::trace!("Settling {node:?} at g={g:?}");

        if (self.is_target)(&node) {
            log::debug!(
                "Found target {node:?} at {g:?} after settling {} nodes",
                self.visited.settled_len()
            );
            self.target = Some(node);
            self.is_concluded = true;
            return Ok(());
        }

        for edge in node.edges() {
            let to = edge.to();
            if self.visited.is_settled(&to) {
                continue;
            }

            let new_g = g.saturating_add(&(self.get_edge_cost)(&edge));
            match self.frontier.try_get_priority(&to).copied() {
                Some(rank) => {
                    let improves = self.costs.get(&to).is_some_and(|&old_g| new_g < old_g);
                    if improves {
                        self.frontier.increase_priority(&to, rank.with_g(new_g))?;
                        self.visited.relax(&to, edge);
                        self.costs.insert(to, new_g);
                    }
                }
                None => {
                    let h = (self.get_heuristic)(&to);
                    self.visited.discover(to.clone(), Some(edge));
                    self.costs.insert(to.clone(), new_g);
                    self.frontier.enqueue(to, AStarRank::new(new_g, h))?;
                }
            }
        }

        if self.frontier.is_empty() {
            log::debug!("Exhausted after settling {} nodes", self.visited.len());
            self.is_concluded = true;
        }
        Ok(())
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "A* Stats:")?;
        let s = size_of::<(N, C)>();
        let l = self.costs.len();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let s = size_of::<(N, AStarRank<C>)>();
        let l = self.frontier.len();
        writeln!(
            out,
            "  - |Open|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let expanded_nodes = self.visited.len() - self.frontier.len();
        writeln!(
            out,
            "  - Expanded nodes: {}",
            expanded_nodes.separate_with_commas()
        )?;

        Ok(())
    }
}

impl<N, T, F, H, C> SteppableSearch for AStarSearch<N, T, F, H, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    H: FnMut(&N) -> C,
    C: Cost,
{
    fn is_concluded(&self) -> bool {
        self.is_concluded
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded)?;

        let (node, _rank) = self.frontier.dequeue()?;
        self.visited.settle(&node);
        let Some(&g) = self.costs.get(&node) else {
            unreachable!("Frontier nodes always have a best known cost");
        };
        self.visit(node, g)
    }
}

impl<N, T, F, H, C> ClassicSearch<N> for AStarSearch<N, T, F, H, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    H: FnMut(&N) -> C,
    C: Cost,
{
    fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }
    fn visited(&self) -> &VisitedMap<N> {
        &self.visited
    }
}

impl<N, T, F, H, C> Debug for AStarSearch<N, T, F, H, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    H: FnMut(&N) -> C,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AStarSearch")
            .field("visited", &self.visited.len())
            .field("frontier", &self.frontier.len())
            .field("target", &self.target)
            .field("target_cost", &self.target_cost())
            .field("is_concluded", &self.is_concluded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::algorithms::dijkstra::DijkstraSearch;
    use crate::error::SearchError;
    use crate::graphs::adjacency::AdjacencyEdge;
    use crate::graphs::adjacency::AdjacencyGraph;
    use crate::graphs::adjacency::AdjacencyNode;
    use crate::graphs::adjacency::path_cost;
    use crate::graphs::adjacency::path_ids;
    use crate::graphs::maze_2d::Maze2D;
    use crate::graphs::maze_2d::Maze2DEdge;
    use crate::graphs::maze_2d::diagonal_heuristic;

    #[test]
    fn ranking() {
        assert!(AStarRank::new(2u32, 0u32) > AStarRank::new(2u32, 1u32));
        assert!(AStarRank::new(0u32, 2u32) > AStarRank::new(1u32, 2u32));
        assert!(AStarRank::new(1u32, 1u32) == AStarRank::new(1u32, 1u32).with_g(1));
        assert!(AStarRank::new(1u32, 1u32).with_g(0) > AStarRank::new(1u32, 1u32));
        assert_eq!(AStarRank::new(u32::MAX, 1).f(), u32::MAX);
    }

    #[test]
    fn finds_the_cheapest_path() {
        let graph =
            AdjacencyGraph::from_weighted_edges(&[(1, 2, 1), (1, 9, 1), (2, 10, 1), (9, 10, 10)]);
        let mut search = AStarSearch::new(
            graph.node(1),
            |n| n.id() == 10,
            |e: &AdjacencyEdge| e.cost(),
            |_: &AdjacencyNode| 0,
        );
        search.complete().unwrap();

        assert_eq!(search.target_cost(), Some(2));
        let path = search.path_to_target().unwrap();
        assert_eq!(path_ids(&path), vec![(1, 2), (2, 10)]);
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));
    }

    #[test]
    fn heuristic_steers_expansions() {
        // Both branches reach 4 at cost 2. The heuristic says 3 is closer.
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut search = AStarSearch::new(
            graph.node(1),
            |n| n.id() == 4,
            |e: &AdjacencyEdge| e.cost(),
            |n: &AdjacencyNode| match n.id() {
                2 => 1,
                3 => 0,
                _ => 0,
            },
        );
        search.complete().unwrap();
        assert_eq!(path_ids(&search.path_to_target().unwrap()), vec![(1, 3), (3, 4)]);
        assert!(!search.visited().is_settled(&graph.node(2)));
    }

    #[test]
    fn zero_heuristic_matches_dijkstra() {
        for seed in 0..30u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = AdjacencyGraph::random(&mut rng, 25, 90, 9);
            let goal = rng.random_range(0..25);

            let mut astar = AStarSearch::new(
                graph.node(0),
                |n| n.id() == goal,
                |e: &AdjacencyEdge| e.cost(),
                |_: &AdjacencyNode| 0,
            );
            astar.complete().unwrap();
            let mut dijkstra =
                DijkstraSearch::new(graph.node(0), |n| n.id() == goal, |e: &AdjacencyEdge| e.cost());
            dijkstra.complete().unwrap();

            assert_eq!(astar.target(), dijkstra.target(), "seed {seed}");
            assert_eq!(astar.target_cost(), dijkstra.target_cost(), "seed {seed}");
            if let Some(path) = astar.path_to_target() {
                assert_eq!(Some(path_cost(&path)), astar.target_cost());
            }
        }
    }

    #[test]
    fn consistent_heuristics_settle_optimal_costs() {
        for seed in 0..40u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = AdjacencyGraph::random(&mut rng, 20, 70, 9);
            let goal = rng.random_range(0..20);

            // Half the exact distance to the goal. Nodes that can't reach it
            // get a huge estimate, which keeps every edge consistent.
            let half_distance = |n: &AdjacencyNode| {
                graph
                    .brute_force_costs(n.id())
                    .get(&goal)
                    .map_or(u32::MAX / 4, |d| d / 2)
            };

            let mut search = AStarSearch::new(
                graph.node(0),
                |n| n.id() == goal,
                |e: &AdjacencyEdge| e.cost(),
                half_distance,
            );
            search.complete().unwrap();

            let expected = graph.brute_force_costs(0);
            assert_eq!(search.target_cost(), expected.get(&goal).copied(), "seed {seed}");
            for (node, info) in search.visited().iter() {
                if !info.is_on_frontier {
                    assert_eq!(search.cost_to(node), expected.get(&node.id()).copied());
                }
            }
            if let Some(path) = search.path_to_target() {
                assert_eq!(Some(path_cost(&path)), search.target_cost(), "seed {seed}");
            }
        }
    }

    #[test]
    fn admissible_heuristics_find_optimal_maze_paths() {
        let maze = Maze2D::try_from(indoc::indoc! {"
            S....#...
            .###.#.#.
            ...#...#.
            .#.#####.
            .#......G
        "})
        .unwrap();
        let goal = maze.goal();

        let mut blind = DijkstraSearch::new(
            maze.start(),
            |n| n.state() == goal.state(),
            |e: &Maze2DEdge| e.cost(),
        );
        blind.complete().unwrap();

        let mut informed = AStarSearch::new(
            maze.start(),
            |n| n.state() == goal.state(),
            |e: &Maze2DEdge| e.cost(),
            |n| diagonal_heuristic(&n.state(), &goal.state()),
        );
        informed.complete().unwrap();

        assert!(blind.target_cost().is_some());
        assert_eq!(informed.target_cost(), blind.target_cost());
        assert!(informed.visited().settled_len() <= blind.visited().settled_len());
    }
}
