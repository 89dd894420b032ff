//! Depth-first and-or search as a state machine.
//!
//! The recursion of [`AndOrSearch`](crate::algorithms::and_or_dfs::AndOrSearch)
//! is replaced by a work list of pending visits and a chain of contexts
//! standing in for its call frames. Each context knows its parent and how
//! many of its children haven't reported back yet.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::algorithms::and_or_dfs::Outcome;
use crate::algorithms::and_or_dfs::Tree;
use crate::algorithms::and_or_dfs::and_children;
use crate::error::SearchResult;
use crate::search::SteppableSearch;
use crate::search::ensure_running;
use crate::space::Node;

type ContextRef<N> = Rc<RefCell<Context<N>>>;

/// A call frame of the recursive search.
///
/// `parent` is only `None` while the context is being dropped.
enum Context<N: Node> {
    /// Receives the result of the source.
    Root,
    /// An "or" node waiting for any one of its edges to work out.
    Or {
        node: N,
        parent: Option<ContextRef<N>>,
        remaining: usize,
        done: bool,
    },
    /// An edge waiting for all of its and-children to be solved.
    And {
        edge: N::Edge,
        parent: Option<ContextRef<N>>,
        remaining: usize,
        subtrees: FxHashMap<N, Tree<N>>,
        done: bool,
    },
}

impl<N: Node> Context<N> {
    fn is_done(&self) -> bool {
        match self {
            Context::Root => false,
            Context::Or { done, .. } | Context::And { done, .. } => *done,
        }
    }

    fn parent(&self) -> Option<&ContextRef<N>> {
        match self {
            Context::Root => None,
            Context::Or { parent, .. } | Context::And { parent, .. } => parent.as_ref(),
        }
    }

    fn take_parent(&mut self) -> Option<ContextRef<N>> {
        match self {
            Context::Root => None,
            Context::Or { parent, .. } | Context::And { parent, .. } => parent.take(),
        }
    }
}

impl<N: Node> Drop for Context<N> {
    /// Frees uniquely owned ancestors one at a time, so dropping a deep
    /// search doesn't overflow the stack.
    fn drop(&mut self) {
        let mut next = self.take_parent();
        while let Some(parent) = next {
            next = match Rc::try_unwrap(parent) {
                Ok(cell) => cell.into_inner().take_parent(),
                Err(_shared) => None,
            };
        }
    }
}

/// What a child tells its context when it's finished.
enum Report<N: Node> {
    /// An "or" node was solved. Sent to `And` and `Root` contexts.
    Solved { node: N, tree: Tree<N> },
    /// All the and-children of an edge were solved. Sent to `Or` contexts.
    Followed {
        edge: N::Edge,
        children: FxHashMap<N, Tree<N>>,
    },
    Failed,
}

enum Pending<N: Node> {
    OrNode { node: N, context: ContextRef<N> },
    Edge { edge: N::Edge, context: ContextRef<N> },
}

/// Whether `node` is an "or" node on the way from the source to `context`.
fn path_contains<N: Node>(context: &ContextRef<N>, node: &N) -> bool {
    let mut current = Rc::clone(context);
    loop {
        let parent = {
            let frame = current.borrow();
            if let Context::Or { node: or_node, .. } = &*frame
                && or_node == node
            {
                return true;
            }
            match frame.parent() {
                Some(parent) => Rc::clone(parent),
                None => return false,
            }
        };
        current = parent;
    }
}

/// Hands `report` to `context`, propagating it upwards while contexts finish.
///
/// Returns the outcome of the whole search once the root hears back.
fn propagate<N: Node>(context: ContextRef<N>, report: Report<N>) -> Option<Outcome<N>> {
    let mut context = context;
    let mut report = report;
    loop {
        let next_report = match &mut *context.borrow_mut() {
            Context::Root => {
                return Some(match report {
                    Report::Solved { tree, .. } => Outcome::Success(tree),
                    Report::Failed => Outcome::Failure,
                    Report::Followed { .. } => {
                        unreachable!("The root only hears about the source node")
                    }
                });
            }
            Context::Or {
                node,
                remaining,
                done,
                ..
            } => match report {
                Report::Followed { edge, children } => {
                    *done = true;
                    Report::Solved {
                        node: node.clone(),
                        tree: Tree::Step { edge, children },
                    }
                }
                Report::Failed => {
                    *remaining -= 1;
                    if *remaining > 0 {
                        return None;
                    }
                    *done = true;
                    Report::Failed
                }
                Report::Solved { .. } => unreachable!("Or contexts only hear about edges"),
            },
            Context::And {
                edge,
                remaining,
                subtrees,
                done,
                ..
            } => match report {
                Report::Solved { node, tree } => {
                    subtrees.insert(node, tree);
                    *remaining -= 1;
                    if *remaining > 0 {
                        return None;
                    }
                    *done = true;
                    Report::Followed {
                        edge: edge.clone(),
                        children: std::mem::take(subtrees),
                    }
                }
                Report::Failed => {
                    // One failed child sinks the whole conjunction.
                    *done = true;
                    Report::Failed
                }
                Report::Followed { .. } => unreachable!("And contexts only hear about nodes"),
            },
        };
        let Some(parent) = context.borrow().parent().cloned() else {
            unreachable!("Only the root has no parent");
        };
        context = parent;
        report = next_report;
    }
}

/// Steppable depth-first and-or search.
///
/// Produces exactly the same outcome as
/// [`AndOrSearch`](crate::algorithms::and_or_dfs::AndOrSearch). Children are
/// pushed onto the work list in reverse, so they are visited in the order the
/// graph lists them.
pub struct SteppableAndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    is_target: T,
    is_and_edge: A,
    pending: Vec<Pending<N>>,
    outcome: Option<Outcome<N>>,
    visits: usize,
}

impl<N, T, A> SteppableAndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    /// Initialises the search, visiting `source` right away.
    #[must_use]
    pub fn new(source: N, is_target: T, is_and_edge: A) -> Self {
        let mut search = Self {
            is_target,
            is_and_edge,
            pending: vec![],
            outcome: None,
            visits: 0,
        };
        search.visit_or_node(source, Rc::new(RefCell::new(Context::Root)));
        search
    }

    /// The outcome, once concluded.
    pub fn outcome(&self) -> Option<&Outcome<N>> {
        self.outcome.as_ref()
    }

    /// Takes the outcome, once concluded.
    pub fn into_outcome(self) -> Option<Outcome<N>> {
        self.outcome
    }

    /// Visits waiting on the work list, stale ones included.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Nodes and edges visited so far.
    pub fn visits(&self) -> usize {
        self.visits
    }

    fn conclude_if_root(&mut self, outcome: Option<Outcome<N>>) {
        if let Some(outcome) = outcome {
            log::debug!(
                "Concluded after {} visits: {}",
                self.visits,
                if outcome.is_success() { "solved" } else { "failed" }
            );
            self.outcome = Some(outcome);
        }
    }

    fn visit_or_node(&mut self, node: N, context: ContextRef<N>) {
        log::trace!("Visiting {node:?}");
        self.visits += 1;

        if (self.is_target)(&node) {
            let report = Report::Solved {
                node,
                tree: Tree::Empty,
            };
            let outcome = propagate(context, report);
            self.conclude_if_root(outcome);
            return;
        }
        if path_contains(&context, &node) {
            log::trace!("Cycle through {node:?}");
            let outcome = propagate(context, Report::Failed);
            self.conclude_if_root(outcome);
            return;
        }

        let edges = node.edges();
        if edges.is_empty() {
            let outcome = propagate(context, Report::Failed);
            self.conclude_if_root(outcome);
            return;
        }

        let or_context = Rc::new(RefCell::new(Context::Or {
            node,
            parent: Some(context),
            remaining: edges.len(),
            done: false,
        }));
        for edge in edges.into_iter().rev() {
            self.pending.push(Pending::Edge {
                edge,
                context: Rc::clone(&or_context),
            });
        }
    }

    fn visit_edge(&mut self, edge: N::Edge, context: ContextRef<N>) {
        log::trace!("Following {edge:?}");
        self.visits += 1;

        let children = and_children::<N, A>(&edge, &mut self.is_and_edge);
        if children.is_empty() {
            let report = Report::Followed {
                edge,
                children: FxHashMap::default(),
            };
            let outcome = propagate(context, report);
            self.conclude_if_root(outcome);
            return;
        }

        let and_context = Rc::new(RefCell::new(Context::And {
            edge,
            parent: Some(context),
            remaining: children.len(),
            subtrees: FxHashMap::default(),
            done: false,
        }));
        for node in children.into_iter().rev() {
            self.pending.push(Pending::OrNode {
                node,
                context: Rc::clone(&and_context),
            });
        }
    }
}

impl<N, T, A> SteppableSearch for SteppableAndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    fn is_concluded(&self) -> bool {
        self.outcome.is_some()
    }

    /// Performs the next visit, dropping the stale ones on the way.
    fn next_step(&mut self) -> SearchResult<()> {
        ensure_running(self.is_concluded())?;

        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::OrNode { context, .. } | Pending::Edge { context, .. }
                    if context.borrow().is_done() => {}
                Pending::OrNode { node, context } => {
                    self.visit_or_node(node, context);
                    return Ok(());
                }
                Pending::Edge { edge, context } => {
                    self.visit_edge(edge, context);
                    return Ok(());
                }
            }
        }

        // Running searches always have a live visit pending.
        self.outcome = Some(Outcome::Failure);
        Ok(())
    }
}

impl<N, T, A> std::fmt::Debug for SteppableAndOrSearch<N, T, A>
where
    N: Node,
    T: FnMut(&N) -> bool,
    A: FnMut(&N::Edge) -> bool,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SteppableAndOrSearch")
            .field("pending", &self.pending.len())
            .field("visits", &self.visits)
            .field("outcome", &self.outcome)
            .finish()
    }
}
