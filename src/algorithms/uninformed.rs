//! Shared machinery of the cost-blind searches (BFS and DFS).
//!
//! Both keep a frontier of edges leading to discovered-but-unexpanded nodes
//! and never revise how they reached a node. Only the order in which the
//! frontier hands edges back differs.

use std::collections::VecDeque;

use crate::error::SearchResult;
use crate::search::ClassicSearch;
use crate::search::SteppableSearch;
use crate::search::VisitedMap;
use crate::search::ensure_running;
use crate::space::Edge;
use crate::space::Node;

/// The ordering structure of a cost-blind search.
pub trait EdgeFrontier<E>: Default {
    fn push_edge(&mut self, e: E);
    fn pop_edge(&mut self) -> Option<E>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in first-out.
impl<E> EdgeFrontier<E> for VecDeque<E> {
    #[inline(always)]
    fn push_edge(&mut self, e: E) {
        self.push_back(e);
    }
    #[inline(always)]
    fn pop_edge(&mut self) -> Option<E> {
        self.pop_front()
    }
    #[inline(always)]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// Last-in first-out.
impl<E> EdgeFrontier<E> for Vec<E> {
    #[inline(always)]
    fn push_edge(&mut self, e: E) {
        self.push(e);
    }
    #[inline(always)]
    fn pop_edge(&mut self) -> Option<E> {
        self.pop()
    }
    #[inline(always)]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// A search expanding nodes in the order its frontier dictates.
pub struct UninformedSearch<N, T, Q>
where
    N: Node,
    T: FnMut(&N) -> bool,
    Q: EdgeFrontier<N::Edge>,
{
    is_target: T,
    visited: VisitedMap<N>,
    frontier: Q,
    target: Option<N>,
    is_concluded: bool,
}

impl<N, T, Q> UninformedSearch<N, T, Q>
where
    N: Node,
    T: FnMut(&N) -> bool,
    Q: EdgeFrontier<N::Edge>,
{
    /// Initialises the search, visiting `source` right away.
    #[must_use]
    pub fn new(source: N, is_target: T) -> Self {
        let mut search = Self {
            is_target,
            visited: VisitedMap::new(),
            frontier: Q::default(),
            target: None,
            is_concluded: false,
        };
        search.visited.insert_settled(source.clone(), None);
        search.visit(source);
        search
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    fn visit(&mut self, node: N) {
        log::trace!("Visiting {node:?}");

        if (self.is_target)(&node) {
            log::debug!("Found target {node:?} after visiting {} nodes", self.visited.len());
            self.target = Some(node);
            self.is_concluded = true;
            return;
        }

        for edge in node.edges() {
            let to = edge.to();
            if !self.visited.contains(&to) {
                self.visited.discover(to, Some(edge.clone()));
                self.frontier.push_edge(edge);
            }
        }

        if self.frontier.is_empty() {
            log::debug!("Exhausted after visiting {} nodes", self.visited.len());
            self.is_concluded = true;
        }
    }
}

impl<N, T, Q> SteppableSearch for UninformedSearch<N, T, Q>
where
    N: Node,
    T: FnMut(&N) -> bool,
    Q: EdgeFrontier<N::Edge>,
{
    fn is_concluded(&self) -> bool {
        self.is_concluded
    }

    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded)?;

        // Running searches always have something on the frontier.
        let Some(edge) = self.frontier.pop_edge() else {
            self.is_concluded = true;
            return Ok(());
        };
        let node = edge.to();
        self.visited.settle(&node);
        self.visit(node);
        Ok(())
    }
}

impl<N, T, Q> ClassicSearch<N> for UninformedSearch<N, T, Q>
where
    N: Node,
    T: FnMut(&N) -> bool,
    Q: EdgeFrontier<N::Edge>,
{
    fn target(&self) -> Option<&N> {
        self.target.as_ref()
    }
    fn visited(&self) -> &VisitedMap<N> {
        &self.visited
    }
}

impl<N, T, Q> std::fmt::Debug for UninformedSearch<N, T, Q>
where
    N: Node,
    T: FnMut(&N) -> bool,
    Q: EdgeFrontier<N::Edge>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("UninformedSearch")
            .field("visited", &self.visited.len())
            .field("frontier", &self.frontier.len())
            .field("target", &self.target)
            .field("is_concluded", &self.is_concluded)
            .finish()
    }
}
