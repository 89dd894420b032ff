//! Breadth-first search.
//!
//! Expands nodes in the order they were discovered, so the recorded path to
//! every node has the fewest possible edges.

use std::collections::VecDeque;

use crate::algorithms::uninformed::UninformedSearch;
use crate::space::Node;

/// Breadth-first search with a FIFO frontier of edges.
///
/// ```
/// use graph_search::algorithms::breadth_first::BreadthFirstSearch;
/// use graph_search::graphs::adjacency::AdjacencyGraph;
/// use graph_search::search::ClassicSearch;
/// use graph_search::search::SteppableSearch;
///
/// let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3)]);
/// let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 3);
/// search.complete().unwrap();
/// assert_eq!(search.target(), Some(&graph.node(3)));
/// ```
pub type BreadthFirstSearch<N, T> = UninformedSearch<N, T, VecDeque<<N as Node>::Edge>>;

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::error::SearchError;
    use crate::graphs::adjacency::AdjacencyGraph;
    use crate::graphs::adjacency::path_ids;
    use crate::search::ClassicSearch;
    use crate::search::SteppableSearch;

    #[test]
    fn finds_the_shortest_path() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (1, 3), (2, 4), (3, 5)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 4);
        search.complete().unwrap();

        assert!(search.is_concluded());
        assert_eq!(search.target(), Some(&graph.node(4)));
        let path = search.path_to_target().unwrap();
        assert_eq!(path_ids(&path), vec![(1, 2), (2, 4)]);
    }

    #[test]
    fn prefers_fewer_edges_over_discovery_order() {
        // 1 -> 2 -> 3 -> 4 is discovered first, but 1 -> 4 is shorter.
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4), (1, 4)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 4);
        search.complete().unwrap();
        assert_eq!(path_ids(&search.path_to_target().unwrap()), vec![(1, 4)]);
    }

    #[test]
    fn source_can_be_the_target() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 1);

        assert!(search.is_concluded());
        assert_eq!(search.path_to_target(), Some(vec![]));
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));
    }

    #[test]
    fn exhausts_the_reachable_component() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 1), (2, 3), (4, 5)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 5);
        search.complete().unwrap();

        assert_eq!(search.target(), None);
        assert_eq!(search.visited().len(), 3);
        assert_eq!(search.visited().settled_len(), 3);
        assert!(!search.visited().contains(&graph.node(4)));
        assert_eq!(search.next_step(), Err(SearchError::AlreadyConcluded));
    }

    #[test]
    fn steps_one_node_at_a_time() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (1, 3), (2, 4)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |_| false);

        // The source is expanded on construction.
        assert!(search.visited().is_settled(&graph.node(1)));
        assert!(!search.visited().is_settled(&graph.node(2)));
        assert_eq!(search.frontier_len(), 2);

        search.next_step().unwrap();
        assert!(search.visited().is_settled(&graph.node(2)));
        assert!(search.visited().contains(&graph.node(4)));
        assert!(!search.visited().is_settled(&graph.node(3)));

        search.next_step().unwrap();
        search.next_step().unwrap();
        assert!(search.is_concluded());
    }

    #[test]
    fn cancelled_searches_can_resume() {
        let graph = AdjacencyGraph::from_edges(&[(1, 2), (2, 3), (3, 4)]);
        let mut search = BreadthFirstSearch::new(graph.node(1), |n| n.id() == 4);

        let mut budget = 1;
        let concluded = search
            .complete_unless(|| {
                if budget == 0 {
                    return true;
                }
                budget -= 1;
                false
            })
            .unwrap();
        assert!(!concluded);
        assert_eq!(search.visited().settled_len(), 2);

        assert!(search.complete_unless(|| false).unwrap());
        assert_eq!(search.target(), Some(&graph.node(4)));
    }

    #[test]
    fn paths_are_as_short_as_possible() {
        for seed in 0..30u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let edges: Vec<(u32, u32)> = (0..60)
                .map(|_| (rng.random_range(0..20u32), rng.random_range(0..20u32)))
                .collect();
            let graph = AdjacencyGraph::from_edges(&edges);
            let hops = graph.brute_force_costs(0);

            let mut search = BreadthFirstSearch::new(graph.node(0), |_| false);
            search.complete().unwrap();

            assert_eq!(search.visited().len(), hops.len());
            for (node, _info) in search.visited().iter() {
                let path = search.visited().path_to(node).unwrap();
                assert_eq!(path.len() as u32, hops[&node.id()], "seed {seed}, node {node:?}");
            }
        }
    }
}
