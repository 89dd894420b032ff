//! Depth-first search over and-or graphs.
//!
//! "Or" nodes are solved by any one of their edges. An edge solves its node
//! when all of its and-children are solved. For most edges that's just the
//! node the edge leads to, but edges flagged as conjunctions lead to a node
//! whose outbound edges are the conjoined children.
//!
//! This is the recursive form. See
//! [`SteppableAndOrSearch`](crate::algorithms::steppable_and_or_dfs::SteppableAndOrSearch)
//! for the same search as a state machine.

use rustc_hash::FxHashMap;

use crate::data_structures::cons_list::ConsList;
use crate::space::Edge;
use crate::space::Node;

/// A plan solving an "or" node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tree<N: Node> {
    /// The node is a target already.
    Empty,
    /// Follow `edge`, then solve each child with its own plan.
    Step {
        edge: N::Edge,
        children: FxHashMap<N, Tree<N>>,
    },
}

impl<N: Node> Tree<N> {
    /// The edge chosen for every "or" node of the plan.
    ///
    /// Nodes solved more than once within the plan keep one of their edges.
    #[must_use]
    pub fn flatten(&self) -> FxHashMap<N, N::Edge> {
        let mut plan = FxHashMap::default();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            if let Tree::Step { edge, children } = tree {
                plan.insert(edge.from(), edge.clone());
                pending.extend(children.values());
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tree::Empty)
    }
}

impl<N: Node> Drop for Tree<N> {
    /// Frees nested plans from a work list instead of recursing into them.
    fn drop(&mut self) {
        let Tree::Step { children, .. } = self else {
            return;
        };
        let mut pending: Vec<Tree<N>> = children.drain().map(|(_, tree)| tree).collect();
        while let Some(mut tree) = pending.pop() {
            if let Tree::Step { children, .. } = &mut tree {
                pending.extend(children.drain().map(|(_, tree)| tree));
            }
        }
    }
}

/// How an and-or search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<N: Node> {
    Success(Tree<N>),
    Failure,
}

impl<N: Node> Outcome<N> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn tree(&self) -> Option<&Tree<N>> {
        match self {
            Outcome::Success(tree) => Some(tree),
            Outcome::Failure => None,
        }
    }
}

/// The children an edge needs solved.
pub(crate) fn and_children<N, A>(edge: &N::Edge, is_and_edge: &mut A) -> Vec<N>
where
    N: Node,
    A: FnMut(&N::Edge) -> bool,
{
    if is_and_edge(edge) {
        edge.to().edges().iter().map(Edge::to).collect()
    } else {
        vec![edge.to()]
    }
}

/// Recursive depth-first and-or search.
///
/// Edges are tried in the order the graph lists them and the first one that
/// works is kept. Nodes already on the current path fail, so cyclic
/// dependencies never loop.
///
/// ```
/// use graph_search::algorithms::and_or_dfs::AndOrSearch;
/// use graph_search::graphs::propositional::KnowledgeBase;
///
/// let kb = KnowledgeBase::try_from("P <- Q\nQ").unwrap();
/// let outcome = AndOrSearch::new(
///     kb.symbol("P").unwrap(),
///     |n| n.is_truth(),
///     |e| e.is_conjunction(),
/// )
/// .execute();
/// assert!(outcome.is_success());
/// ```
pub struct AndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    source: N,
    is_target: T,
    is_and_edge: A,
}

impl<N, T, A> AndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    #[must_use]
    pub fn new(source: N, is_target: T, is_and_edge: A) -> Self {
        Self {
            source,
            is_target,
            is_and_edge,
        }
    }

    /// Runs the whole search.
    pub fn execute(mut self) -> Outcome<N> {
        let source = self.source.clone();
        match self.or_search(&source, &ConsList::empty()) {
            Some(tree) => {
                log::debug!("Solved {source:?}");
                Outcome::Success(tree)
            }
            None => {
                log::debug!("Failed to solve {source:?}");
                Outcome::Failure
            }
        }
    }

    fn or_search(&mut self, node: &N, path: &ConsList<N>) -> Option<Tree<N>> {
        log::trace!("Visiting {node:?}");
        if (self.is_target)(node) {
            return Some(Tree::Empty);
        }
        if path.contains(node) {
            log::trace!("Cycle through {node:?}");
            return None;
        }

        let path = path.prepend(node.clone());
        for edge in node.edges() {
            if let Some(children) = self.and_search(&edge, &path) {
                return Some(Tree::Step { edge, children });
            }
        }
        None
    }

    fn and_search(&mut self, edge: &N::Edge, path: &ConsList<N>) -> Option<FxHashMap<N, Tree<N>>> {
        let mut subtrees = FxHashMap::default();
        for child in and_children::<N, A>(edge, &mut self.is_and_edge) {
            let tree = self.or_search(&child, path)?;
            subtrees.insert(child, tree);
        }
        Some(subtrees)
    }
}
