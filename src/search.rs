use rustc_hash::FxHashMap;

use crate::error::SearchError;
use crate::error::SearchResult;
use crate::space::Edge;
use crate::space::Node;

/// What a search knows about how it reached a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownEdgeInfo<E> {
    /// The edge used to discover the node. `None` only for the source.
    pub edge: Option<E>,
    /// Scheduled but not expanded yet.
    pub is_on_frontier: bool,
}

impl<E> KnownEdgeInfo<E> {
    pub fn new(edge: Option<E>, is_on_frontier: bool) -> Self {
        Self {
            edge,
            is_on_frontier,
        }
    }
}

/// The visited map of a search.
///
/// Grows monotonically. A node enters it once (on the frontier, or already
/// settled for the source) and gets settled once. Only the owning search can
/// mutate it.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct VisitedMap<N: Node> {
    nodes: FxHashMap<N, KnownEdgeInfo<N::Edge>>,
}

impl<N: Node> VisitedMap<N> {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn get(&self, node: &N) -> Option<&KnownEdgeInfo<N::Edge>> {
        self.nodes.get(node)
    }
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }
    /// Whether the node was expanded already.
    #[must_use]
    pub fn is_settled(&self, node: &N) -> bool {
        self.nodes.get(node).is_some_and(|info| !info.is_on_frontier)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    /// Number of expanded nodes.
    #[must_use]
    pub fn settled_len(&self) -> usize {
        self.nodes.values().filter(|info| !info.is_on_frontier).count()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&N, &KnownEdgeInfo<N::Edge>)> {
        self.nodes.iter()
    }

    /// Edges from the source to `node`, following the recorded edges back.
    ///
    /// Returns `None` for nodes that were never reached.
    #[must_use]
    pub fn path_to(&self, node: &N) -> Option<Vec<N::Edge>> {
        let mut edges = vec![];
        let mut info = self.nodes.get(node)?;
        while let Some(edge) = &info.edge {
            debug_assert!(
                edges.len() <= self.nodes.len(),
                "Recorded edges loop back on themselves"
            );
            edges.push(edge.clone());
            info = self.nodes.get(&edge.from())?;
        }
        edges.reverse();
        Some(edges)
    }

    // Mutation (owning search only)

    /// Adds a node that was just scheduled for expansion.
    pub(crate) fn discover(&mut self, node: N, edge: Option<N::Edge>) {
        let previous = self.nodes.insert(node, KnownEdgeInfo::new(edge, true));
        debug_assert!(previous.is_none(), "Nodes are discovered only once");
    }

    /// Adds a node that gets expanded right away, like the source.
    pub(crate) fn insert_settled(&mut self, node: N, edge: Option<N::Edge>) {
        let previous = self.nodes.insert(node, KnownEdgeInfo::new(edge, false));
        debug_assert!(previous.is_none(), "Nodes are discovered only once");
    }

    /// Marks a frontier node as expanded.
    pub(crate) fn settle(&mut self, node: &N) {
        match self.nodes.get_mut(node) {
            Some(info) => {
                debug_assert!(info.is_on_frontier, "Nodes are settled only once");
                info.is_on_frontier = false;
            }
            None => {
                unreachable!("Tried settling a node that was never discovered");
            }
        }
    }

    /// Records a better edge for a node still on the frontier.
    ///
    /// Settled nodes are never touched. Returns whether the edge was updated.
    pub(crate) fn relax(&mut self, node: &N, edge: N::Edge) -> bool {
        match self.nodes.get_mut(node) {
            Some(info) if info.is_on_frontier => {
                info.edge = Some(edge);
                true
            }
            _ => false,
        }
    }

    /// Puts a settled node back on the frontier through a new edge.
    ///
    /// Only depth-limited searches revisit nodes, when they find a shallower
    /// path to a node whose subtree may have been cut off.
    pub(crate) fn reopen(&mut self, node: &N, edge: N::Edge) {
        match self.nodes.get_mut(node) {
            Some(info) => {
                info.edge = Some(edge);
                info.is_on_frontier = true;
            }
            None => {
                unreachable!("Tried reopening a node that was never discovered");
            }
        }
    }
}

impl<N: Node> Default for VisitedMap<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A search that advances one step at a time.
///
/// Callers pace searches by choosing when to call [`SteppableSearch::next_step`].
/// Stepping a concluded search is an error, never a silent no-op.
pub trait SteppableSearch {
    fn is_concluded(&self) -> bool;

    /// Advances the search by a single step.
    fn next_step(&mut self) -> SearchResult<()>;

    /// Steps until the search concludes.
    fn complete(&mut self) -> SearchResult<()> {
        while !self.is_concluded() {
            self.next_step()?;
        }
        Ok(())
    }

    /// Steps until the search concludes or `is_cancelled` says otherwise.
    ///
    /// Cancellation is checked before every step, so a cancelled search is
    /// left between steps and can be resumed later. Returns whether the search
    /// concluded.
    fn complete_unless<F>(&mut self, mut is_cancelled: F) -> SearchResult<bool>
    where
        F: FnMut() -> bool,
        Self: Sized,
    {
        while !self.is_concluded() {
            if is_cancelled() {
                log::debug!("Search cancelled before concluding");
                return Ok(false);
            }
            self.next_step()?;
        }
        Ok(true)
    }
}

/// Observable state of the classic frontier searches.
pub trait ClassicSearch<N: Node>: SteppableSearch {
    /// The target node found, if any.
    fn target(&self) -> Option<&N>;

    fn visited(&self) -> &VisitedMap<N>;

    /// Edges from the source to the target found.
    fn path_to_target(&self) -> Option<Vec<N::Edge>> {
        self.visited().path_to(self.target()?)
    }
}

/// Fails when stepping a search that has concluded.
#[inline(always)]
pub(crate) fn ensure_running(is_concluded: bool) -> SearchResult<()> {
    if is_concluded {
        return Err(SearchError::AlreadyConcluded);
    }
    Ok(())
}
