//! A weighted adjacency-list digraph whose nodes borrow the graph.

use std::hash::Hash;
use std::hash::Hasher;

use rustc_hash::FxHashMap;

use crate::space::Edge;
use crate::space::Node;

pub type NodeId = u32;
pub type AdjacencyCost = u32;

/// Directed graph stored as outbound edge lists.
///
/// Edge order follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    edges: FxHashMap<NodeId, Vec<(NodeId, AdjacencyCost)>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit-cost edges.
    pub fn from_edges(edges: &[(NodeId, NodeId)]) -> Self {
        let mut graph = Self::new();
        for &(from, to) in edges {
            graph.add_edge(from, to, 1);
        }
        graph
    }

    pub fn from_weighted_edges(edges: &[(NodeId, NodeId, AdjacencyCost)]) -> Self {
        let mut graph = Self::new();
        for &(from, to, cost) in edges {
            graph.add_edge(from, to, cost);
        }
        graph
    }

    /// A random graph with `num_nodes` nodes (`0..num_nodes`).
    pub fn random<R: rand::Rng>(
        r: &mut R,
        num_nodes: NodeId,
        num_edges: usize,
        max_cost: AdjacencyCost,
    ) -> Self {
        debug_assert!(num_nodes > 0);
        let mut graph = Self::new();
        for _ in 0..num_edges {
            let from = r.random_range(0..num_nodes);
            let to = r.random_range(0..num_nodes);
            let cost = r.random_range(0..=max_cost);
            graph.add_edge(from, to, cost);
        }
        graph
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: AdjacencyCost) {
        self.edges.entry(from).or_default().push((to, cost));
        self.edges.entry(to).or_default();
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> AdjacencyNode<'_> {
        AdjacencyNode { graph: self, id }
    }

    /// First edge between two nodes, if any.
    #[must_use]
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<AdjacencyEdge<'_>> {
        self.edges
            .get(&from)?
            .iter()
            .find(|(t, _)| *t == to)
            .map(|&(to, cost)| AdjacencyEdge {
                graph: self,
                from,
                to,
                cost,
            })
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Cheapest cost from `source` to every reachable node.
    ///
    /// Bellman-Ford style relaxation until nothing changes. Slow, but easy to
    /// trust when cross-checking the real searches.
    pub fn brute_force_costs(&self, source: NodeId) -> FxHashMap<NodeId, AdjacencyCost> {
        let mut costs = FxHashMap::default();
        costs.insert(source, 0);

        let mut changed = true;
        while changed {
            changed = false;
            for (&from, outbound) in &self.edges {
                let Some(&g) = costs.get(&from) else {
                    continue;
                };
                for &(to, cost) in outbound {
                    let new_g = g + cost;
                    if costs.get(&to).is_none_or(|&old_g| new_g < old_g) {
                        costs.insert(to, new_g);
                        changed = true;
                    }
                }
            }
        }
        costs
    }
}

#[derive(Clone, Copy)]
pub struct AdjacencyNode<'g> {
    graph: &'g AdjacencyGraph,
    id: NodeId,
}

impl AdjacencyNode<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl std::fmt::Debug for AdjacencyNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.id)
    }
}

impl PartialEq for AdjacencyNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}
impl Eq for AdjacencyNode<'_> {}
impl Hash for AdjacencyNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'g> Node for AdjacencyNode<'g> {
    type Edge = AdjacencyEdge<'g>;

    fn edges(&self) -> Vec<AdjacencyEdge<'g>> {
        let graph = self.graph;
        let from = self.id;
        match graph.edges.get(&from) {
            Some(outbound) => outbound
                .iter()
                .map(|&(to, cost)| AdjacencyEdge {
                    graph,
                    from,
                    to,
                    cost,
                })
                .collect(),
            None => vec![],
        }
    }
}

#[derive(Clone, Copy)]
pub struct AdjacencyEdge<'g> {
    graph: &'g AdjacencyGraph,
    from: NodeId,
    to: NodeId,
    cost: AdjacencyCost,
}

impl AdjacencyEdge<'_> {
    pub fn cost(&self) -> AdjacencyCost {
        self.cost
    }
    pub fn ids(&self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }
}

impl std::fmt::Debug for AdjacencyEdge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}->#{}(${})", self.from, self.to, self.cost)
    }
}

impl PartialEq for AdjacencyEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph)
            && (self.from, self.to, self.cost) == (other.from, other.to, other.cost)
    }
}
impl Eq for AdjacencyEdge<'_> {}
impl Hash for AdjacencyEdge<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.from, self.to, self.cost).hash(state);
    }
}

impl<'g> Edge for AdjacencyEdge<'g> {
    type Node = AdjacencyNode<'g>;

    fn from(&self) -> AdjacencyNode<'g> {
        AdjacencyNode {
            graph: self.graph,
            id: self.from,
        }
    }
    fn to(&self) -> AdjacencyNode<'g> {
        AdjacencyNode {
            graph: self.graph,
            id: self.to,
        }
    }
}

/// Node ids along a path.
pub fn path_ids(path: &[AdjacencyEdge<'_>]) -> Vec<(NodeId, NodeId)> {
    path.iter().map(AdjacencyEdge::ids).collect()
}

/// Total cost along a path.
pub fn path_cost(path: &[AdjacencyEdge<'_>]) -> AdjacencyCost {
    path.iter().map(AdjacencyEdge::cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_keep_insertion_order() {
        let graph = AdjacencyGraph::from_edges(&[(1, 3), (1, 2), (2, 4)]);
        let ids: Vec<_> = graph.node(1).edges().iter().map(AdjacencyEdge::ids).collect();
        assert_eq!(ids, vec![(1, 3), (1, 2)]);
        assert!(graph.node(4).edges().is_empty());
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn edges_expose_endpoints() {
        let graph = AdjacencyGraph::from_weighted_edges(&[(1, 2, 7)]);
        let edge = graph.edge(1, 2).unwrap();
        assert_eq!(edge.from(), graph.node(1));
        assert_eq!(edge.to(), graph.node(2));
        assert_eq!(edge.cost(), 7);
        assert!(graph.edge(2, 1).is_none());
    }

    #[test]
    fn brute_force_costs_find_cheapest_paths() {
        let graph =
            AdjacencyGraph::from_weighted_edges(&[(1, 2, 1), (1, 9, 1), (2, 10, 1), (9, 10, 10)]);
        let costs = graph.brute_force_costs(1);
        assert_eq!(costs[&10], 2);
        assert_eq!(costs[&9], 1);
        assert_eq!(costs.get(&42), None);
    }
}
