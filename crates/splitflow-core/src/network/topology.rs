use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashSet;

use crate::network::types::{Link, NodeId};
use crate::units::Capacity;

#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) graph: DiGraph<NodeId, Link>,
}

impl Topology {
    /// Creates a capacity topology over the nodes `0..nr_nodes` from a list of directed links.
    /// This function returns an error if the given links fail to produce a valid topology.
    ///
    /// Correctness properties:
    ///
    /// - Every link must have distinct endpoints.
    /// - Every link endpoint must be one of the `nr_nodes` nodes.
    /// - For any ordered pair of nodes, there must be at most one link between them.
    /// - Every link must have a positive capacity.
    /// - The capacities must sum to at most `u64::MAX`, which bounds every flow value and
    ///   residual capacity computed on the topology.
    pub(crate) fn new(nr_nodes: usize, links: &[Link]) -> Result<Self, Error> {
        let mut g = DiGraph::with_capacity(nr_nodes, links.len());
        // CORRECTNESS: node indices and node IDs coincide because nodes are added in order.
        for i in 0..nr_nodes {
            g.add_node(NodeId::new(i));
        }
        let mut seen = FxHashSet::default();
        let mut total = 0_u64;
        for &link in links {
            let Link { src, dst, capacity } = link;
            // CORRECTNESS: Every link must have distinct endpoints.
            if src == dst {
                return Err(Error::NodeAdjacentSelf(src));
            }
            // CORRECTNESS: Every link endpoint must be one of the `nr_nodes` nodes.
            for id in [src, dst] {
                if id.inner() >= nr_nodes {
                    return Err(Error::UndeclaredNode { id, nr_nodes });
                }
            }
            // CORRECTNESS: At most one link per ordered pair.
            if !seen.insert((src, dst)) {
                return Err(Error::DuplicateLink { src, dst });
            }
            // CORRECTNESS: Every link must have a positive capacity.
            if capacity == Capacity::ZERO {
                return Err(Error::ZeroCapacity { src, dst });
            }
            // CORRECTNESS: The capacities must sum to at most `u64::MAX`.
            total = total
                .checked_add(capacity.into_u64())
                .ok_or(Error::CapacityOverflow)?;
            g.add_edge(NodeIndex::new(src.inner()), NodeIndex::new(dst.inner()), link);
        }
        Ok(Self { graph: g })
    }

    pub(crate) fn nr_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn capacity(&self, src: NodeId, dst: NodeId) -> Capacity {
        if src.inner() >= self.nr_nodes() || dst.inner() >= self.nr_nodes() {
            return Capacity::ZERO;
        }
        self.graph
            .find_edge(NodeIndex::new(src.inner()), NodeIndex::new(dst.inner()))
            .map(|e| self.graph[e].capacity)
            .unwrap_or(Capacity::ZERO)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Node {0} is connected to itself")]
    NodeAdjacentSelf(NodeId),

    #[error("Node {id} is not declared (topology has {nr_nodes} nodes)")]
    UndeclaredNode { id: NodeId, nr_nodes: usize },

    #[error("Duplicate links from {src} to {dst}")]
    DuplicateLink { src: NodeId, dst: NodeId },

    #[error("Link from {src} to {dst} has zero capacity")]
    ZeroCapacity { src: NodeId, dst: NodeId },

    #[error("Total link capacity exceeds {}", u64::MAX)]
    CapacityOverflow,

    #[error("Capacity matrix is not square (row {row} has {len} entries, expected {expected})")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
}
