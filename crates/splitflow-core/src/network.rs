//! The capacitated, directed network that packets are routed over.

pub(crate) mod topology;
pub mod types;

use petgraph::dot::Dot;

pub use topology::Error as TopologyError;
pub use types::{Link, NodeId};

use crate::units::Capacity;

use self::topology::Topology;

/// Source of the built-in [reference topology](CapacityGraph::reference).
pub const REFERENCE_SOURCE: NodeId = NodeId::new(0);

/// Sink of the built-in [reference topology](CapacityGraph::reference).
pub const REFERENCE_SINK: NodeId = NodeId::new(4);

/// A fixed set of nodes `0..n` and directed links with integer capacities. A missing link has
/// capacity zero. Once built, a `CapacityGraph` is never mutated.
#[derive(Debug, Clone)]
pub struct CapacityGraph {
    pub(crate) topology: Topology,
}

impl CapacityGraph {
    pub fn new(nr_nodes: usize, links: &[Link]) -> Result<Self, TopologyError> {
        let topology = Topology::new(nr_nodes, links)?;
        Ok(Self { topology })
    }

    /// Builds a graph from an adjacency matrix where `rows[u][v]` is the capacity of `u -> v`.
    /// Zero entries (including the diagonal) mean "no link".
    pub fn from_matrix<R: AsRef<[u64]>>(rows: &[R]) -> Result<Self, TopologyError> {
        let nr_nodes = rows.len();
        let mut links = Vec::new();
        for (u, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != nr_nodes {
                return Err(TopologyError::NotSquare {
                    row: u,
                    len: row.len(),
                    expected: nr_nodes,
                });
            }
            links.extend(
                row.iter()
                    .enumerate()
                    .filter(|&(v, &c)| u != v && c > 0)
                    .map(|(v, &c)| Link::new(NodeId::new(u), NodeId::new(v), c)),
            );
        }
        Self::new(nr_nodes, &links)
    }

    /// The five-node topology used when no other topology is configured. Route from
    /// [`REFERENCE_SOURCE`] to [`REFERENCE_SINK`].
    pub fn reference() -> Self {
        Self::from_matrix(&[
            [0, 16, 13, 0, 0],
            [0, 0, 10, 12, 0],
            [0, 4, 0, 0, 14],
            [0, 0, 9, 0, 20],
            [0, 0, 0, 7, 0],
        ])
        .expect("the reference topology is valid")
    }

    /// The capacity of the link `src -> dst`, or zero if there is none.
    pub fn capacity(&self, src: NodeId, dst: NodeId) -> Capacity {
        self.topology.capacity(src, dst)
    }

    /// Returns true if `id` names one of the graph's nodes.
    pub fn contains(&self, id: NodeId) -> bool {
        id.inner() < self.nr_nodes()
    }

    /// Renders the topology in Graphviz DOT format, labelling each edge with its capacity.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.topology.graph))
    }

    pub(crate) fn capacity_matrix(&self) -> Vec<Vec<Capacity>> {
        let n = self.nr_nodes();
        let mut matrix = vec![vec![Capacity::ZERO; n]; n];
        for link in self.links() {
            matrix[link.src.inner()][link.dst.inner()] = link.capacity;
        }
        matrix
    }

    delegate::delegate! {
        to self.topology.graph {
            #[call(node_count)]
            pub fn nr_nodes(&self) -> usize;

            #[call(edge_count)]
            pub fn nr_links(&self) -> usize;

            #[call(edge_weights)]
            pub fn links(&self) -> impl Iterator<Item = &Link>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn reference_topology_matches_matrix() {
        let g = CapacityGraph::reference();
        assert_eq!(g.nr_nodes(), 5);
        assert_eq!(g.nr_links(), 9);
        let cap = |u, v| g.capacity(NodeId::new(u), NodeId::new(v)).into_u64();
        assert_eq!(cap(0, 1), 16);
        assert_eq!(cap(0, 2), 13);
        assert_eq!(cap(2, 1), 4);
        assert_eq!(cap(4, 3), 7);
        assert_eq!(cap(1, 0), 0);
        assert_eq!(cap(0, 4), 0);
    }

    #[test]
    fn from_matrix_equals_link_list() -> anyhow::Result<()> {
        let (nr_nodes, links) = testing::clrs_config();
        let from_links = CapacityGraph::new(nr_nodes, &links)?;
        let from_matrix = CapacityGraph::from_matrix(&[
            [0, 16, 13, 0, 0, 0],
            [0, 0, 10, 12, 0, 0],
            [0, 4, 0, 0, 14, 0],
            [0, 0, 9, 0, 0, 20],
            [0, 0, 0, 7, 0, 4],
            [0, 0, 0, 0, 0, 0],
        ])?;
        assert_eq!(from_links.capacity_matrix(), from_matrix.capacity_matrix());
        Ok(())
    }

    #[test]
    fn reference_equals_link_list() -> anyhow::Result<()> {
        let (nr_nodes, links) = testing::reference_config();
        let from_links = CapacityGraph::new(nr_nodes, &links)?;
        assert_eq!(
            from_links.capacity_matrix(),
            CapacityGraph::reference().capacity_matrix()
        );
        Ok(())
    }

    #[test]
    fn ragged_matrix_fails() {
        let rows: Vec<Vec<u64>> = vec![vec![0, 1], vec![0]];
        let res = CapacityGraph::from_matrix(&rows);
        assert!(matches!(
            res,
            Err(TopologyError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn dot_labels_edges_with_capacities() {
        let dot = CapacityGraph::reference().to_dot();
        assert!(dot.starts_with("digraph {"));
        let edge = dot
            .lines()
            .find(|l| l.trim_start().starts_with("3 -> 4 "))
            .expect("missing edge 3 -> 4");
        assert!(edge.contains("label = \"20\""));
    }
}
