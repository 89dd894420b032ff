//! Implementation of Dijkstra's path-finding algorithm.

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

/// The ranking value for Dijkstra
///
/// We prefer better (lower) g-values, so lower costs rank higher in the
/// max-first frontier.
///
/// ```
/// use graph_search::algorithms::dijkstra::DijkstraRank;
///
/// assert!(DijkstraRank::new(0u32) > DijkstraRank::new(1u32));
/// assert!(DijkstraRank::new(2u32) == DijkstraRank::new(2u32));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DijkstraRank<C: Cost> {
    g: C,
}
impl<C> DijkstraRank<C>
where
    C: Cost,
{
    pub fn new(g: C) -> Self {
        Self { g }
    }
    pub fn g(&self) -> C {
        self.g
    }
}

/// PartialOrd is forwarded to Ord::cmp
impl<C: Cost> PartialOrd for DijkstraRank<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
/// Reversed g-order.
impl<C: Cost> Ord for DijkstraRank<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.g.cmp(&self.g)
    }
}

/// Dijkstra search.
///
/// Settles nodes in order of their cost from the source. With non-negative
/// edge costs the recorded path to every settled node is a cheapest one.
pub struct DijkstraSearch<N, T, F, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    C: Cost,
{
    is_target: T,
    get_edge_cost: F,

    visited: VisitedMap<N>,
    /// Discovered nodes that weren't settled yet, ranked by their best known
    /// cost.
    frontier: KeyedPriorityQueue<N, DijkstraRank<C>>,
    /// Best known cost of every visited node. Final once a node settles.
    costs: FxHashMap<N, C>,

    target: Option<N>,
    is_concluded: bool,
}

impl<N, T, F, C> DijkstraSearch<N, T, F, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    C: Cost,
{
    /// Initialises the search, expanding `source` right away.
    #[must_use]
    pub fn new(source: N, is_target: T, get_edge_cost: F) -> Self {
        let mut search = Self {
            is_target,
            get_edge_cost,
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

    /// Best known cost to a visited node. Optimal for settled nodes.
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
        log::trace!("Settling {node:?} at {g:?}");

        if (self.is_target)(&node) {
            log::debug!("Found target {node:?} at {g:?}");
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
            match self.frontier.try_get_priority(&to) {
                Some(rank) => {
                    if new_g < rank.g() {
                        // Found better path to a frontier node
                        self.frontier
                            .increase_priority(&to, DijkstraRank::new(new_g))?;
                        self.visited.relax(&to, edge);
                        self.costs.insert(to, new_g);
                    }
                }
                None => {
                    self.visited.discover(to.clone(), Some(edge));
                    self.costs.insert(to.clone(), new_g);
                    self.frontier.enqueue(to, DijkstraRank::new(new_g))?;
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

        writeln!(out, "DijkstraSearch Stats:")?;
        let s = size_of::<(N, C)>();
        let l = self.costs.len();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let l = self.frontier.len();
        writeln!(out, "  - |Open|:   {}", l.separate_with_commas())?;
        let expanded_nodes = self.visited.len() - self.frontier.len();
        writeln!(
            out,
            "  - Expanded nodes: {}",
            expanded_nodes.separate_with_commas()
        )?;

        Ok(())
    }
}

impl<N, T, F, C> SteppableSearch for DijkstraSearch<N, T, F, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    C: Cost,
{
    fn is_concluded(&self) -> bool {
        self.is_concluded
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded)?;

        let (node, rank) = self.frontier.dequeue()?;
        debug_assert!(!self.visited.is_settled(&node));
        self.visited.settle(&node);
        self.visit(node, rank.g())
    }
}

impl<N, T, F, C> ClassicSearch<N> for DijkstraSearch<N, T, F, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    C: Cost,
{
    fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }
    fn visited(&self) -> &VisitedMap<N> {
        &self.visited
    }
}

impl<N, T, F, C> Debug for DijkstraSearch<N, T, F, C>
where
    N: Node,
    T: FnMut(&N) -> bool,
    F: FnMut(&N::Edge) -> C,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DijkstraSearch")
            .field("visited", &self.visited.len())
            .field("frontier", &self.frontier.len())
            .field("target", &self.target)
            .field("target_cost", &self.target_cost())
            .field("is_concluded", &self.is_concluded)
            .finish()
    }
}
