//! Watts-Strogatz small-world overlay.
//!
//! The graph starts as a ring lattice where every node is joined to its `k/2`
//! nearest neighbors on each side. Each lattice edge is then visited once and,
//! with probability `p`, its far endpoint is replaced by a uniformly random
//! node. Rewiring never creates self-loops or parallel edges, so the result
//! keeps most of the lattice's local clustering while a handful of long-range
//! shortcuts keep the diameter small.

use std::collections::BTreeSet;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{NodeId, OverlayTopology, SmallWorldParams, TopologyError};

/// Undirected small-world graph over node ids `0..num_nodes`
#[derive(Debug, Clone)]
pub struct SmallWorldTopology {
    params: SmallWorldParams,
    adjacency: Vec<BTreeSet<NodeId>>,
}

impl SmallWorldTopology {
    /// Build a graph with `num_nodes` vertices using the supplied random source.
    ///
    /// Fails without building anything if `params` violate the lattice
    /// preconditions (`k` even, `2 <= k < num_nodes`, `p` in `[0, 1]`).
    pub fn construct(
        num_nodes: usize,
        params: SmallWorldParams,
        rng: &mut impl Rng,
    ) -> Result<Self, TopologyError> {
        params.check(num_nodes)?;

        let mut topology = Self {
            params,
            adjacency: vec![BTreeSet::new(); num_nodes],
        };

        if num_nodes == 1 {
            debug!("Single-node overlay, no lattice edges to build");
            return Ok(topology);
        }

        let half_k = params.k / 2;
        for node in 0..num_nodes {
            for offset in 1..=half_k {
                topology.add_edge(node, (node + offset) % num_nodes);
            }
        }

        // Rewire ring by ring so inner lattice edges are visited before outer ones
        let mut rewired = 0usize;
        for offset in 1..=half_k {
            for node in 0..num_nodes {
                if rng.gen::<f64>() >= params.p {
                    continue;
                }
                // Every other node is already a neighbor; nothing to rewire to
                if topology.adjacency[node].len() >= num_nodes - 1 {
                    continue;
                }
                let mut target = rng.gen_range(0..num_nodes);
                while target == node || topology.adjacency[node].contains(&target) {
                    target = rng.gen_range(0..num_nodes);
                }
                topology.remove_edge(node, (node + offset) % num_nodes);
                topology.add_edge(node, target);
                rewired += 1;
            }
        }

        info!(
            "Built small-world overlay: {} nodes, k={}, p={}, {} edges ({} rewired)",
            num_nodes,
            params.k,
            params.p,
            topology.edge_count(),
            rewired
        );

        Ok(topology)
    }

    /// Build a graph from a fixed seed, or from fresh entropy when `seed` is `None`.
    pub fn construct_seeded(
        num_nodes: usize,
        params: SmallWorldParams,
        seed: Option<u64>,
    ) -> Result<Self, TopologyError> {
        let mut rng = match seed {
            Some(seed) => {
                debug!("Using fixed topology seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        Self::construct(num_nodes, params, &mut rng)
    }

    /// Parameters the graph was built with
    pub fn params(&self) -> SmallWorldParams {
        self.params
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Degree of `node`
    pub fn degree(&self, node: NodeId) -> Result<usize, TopologyError> {
        self.adjacency_of(node).map(BTreeSet::len)
    }

    /// Dense adjacency matrix, `1` where an edge exists.
    ///
    /// Diagnostic view only; the matrix is symmetric with a zero diagonal.
    pub fn adjacency_matrix(&self) -> Vec<Vec<u8>> {
        let n = self.adjacency.len();
        self.adjacency
            .iter()
            .map(|neighbors| {
                let mut row = vec![0u8; n];
                for &neighbor in neighbors {
                    row[neighbor] = 1;
                }
                row
            })
            .collect()
    }

    fn adjacency_of(&self, node: NodeId) -> Result<&BTreeSet<NodeId>, TopologyError> {
        self.adjacency.get(node).ok_or(TopologyError::NodeOutOfRange {
            node,
            num_nodes: self.adjacency.len(),
        })
    }

    fn add_edge(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
    }

    fn remove_edge(&mut self, a: NodeId, b: NodeId) {
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
    }
}

impl OverlayTopology for SmallWorldTopology {
    fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors_of(&self, node: NodeId) -> Result<Vec<NodeId>, TopologyError> {
        self.adjacency_of(node)
            .map(|neighbors| neighbors.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(num_nodes: usize, k: usize, p: f64, seed: u64) -> SmallWorldTopology {
        SmallWorldTopology::construct_seeded(num_nodes, SmallWorldParams { k, p }, Some(seed))
            .unwrap()
    }

    #[test]
    fn test_lattice_without_rewiring() {
        let topology = seeded(10, 4, 0.0, 1);

        assert_eq!(topology.params(), SmallWorldParams { k: 4, p: 0.0 });
        assert_eq!(topology.num_nodes(), 10);
        assert_eq!(topology.edge_count(), 20);
        assert_eq!(topology.neighbors_of(0).unwrap(), vec![1, 2, 8, 9]);
        assert_eq!(topology.neighbors_of(5).unwrap(), vec![3, 4, 6, 7]);
        for node in 0..10 {
            assert_eq!(topology.degree(node).unwrap(), 4);
        }
    }

    #[test]
    fn test_rewiring_preserves_edge_count_and_excludes_self() {
        for seed in 0..20 {
            let topology = seeded(30, 6, 0.5, seed);
            assert_eq!(topology.num_nodes(), 30);
            // Each rewire removes one edge and adds one
            assert_eq!(topology.edge_count(), 30 * 6 / 2);
            for node in 0..30 {
                let neighbors = topology.neighbors_of(node).unwrap();
                assert!(!neighbors.contains(&node), "node {} lists itself", node);
                assert!(neighbors.iter().all(|&n| n < 30));
            }
        }
    }

    #[test]
    fn test_full_rewiring_changes_lattice() {
        let lattice = seeded(50, 4, 0.0, 7);
        let rewired = seeded(50, 4, 1.0, 7);
        assert_ne!(lattice.adjacency_matrix(), rewired.adjacency_matrix());
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = seeded(40, 4, 0.3, 42);
        let b = seeded(40, 4, 0.3, 42);
        assert_eq!(a.adjacency_matrix(), b.adjacency_matrix());
    }

    #[test]
    fn test_adjacency_matrix_is_symmetric() {
        let topology = seeded(12, 4, 0.4, 3);
        let matrix = topology.adjacency_matrix();
        assert_eq!(matrix.len(), 12);
        for i in 0..12 {
            assert_eq!(matrix[i][i], 0);
            for j in 0..12 {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
    }

    #[test]
    fn test_single_node_has_no_neighbors() {
        let topology = seeded(1, 4, 0.1, 0);
        assert_eq!(topology.num_nodes(), 1);
        assert!(topology.neighbors_of(0).unwrap().is_empty());
        assert_eq!(topology.adjacency_matrix(), vec![vec![0u8]]);
    }

    #[test]
    fn test_neighbors_of_out_of_range() {
        let topology = seeded(5, 2, 0.1, 0);
        assert_eq!(
            topology.neighbors_of(5),
            Err(TopologyError::NodeOutOfRange { node: 5, num_nodes: 5 })
        );
    }

    #[test]
    fn test_invalid_params_fail_before_construction() {
        let result =
            SmallWorldTopology::construct_seeded(6, SmallWorldParams { k: 6, p: 0.1 }, Some(0));
        assert_eq!(
            result.unwrap_err(),
            TopologyError::NeighborCountTooLarge { k: 6, num_nodes: 6 }
        );

        let result =
            SmallWorldTopology::construct_seeded(10, SmallWorldParams { k: 5, p: 0.1 }, Some(0));
        assert_eq!(result.unwrap_err(), TopologyError::OddNeighborCount { k: 5 });
    }
}
