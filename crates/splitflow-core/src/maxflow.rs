//! Maximum flow by repeated shortest augmenting paths (Edmonds-Karp).
//!
//! The engine works on a private residual copy of a [`CapacityGraph`]. Each breadth-first
//! search scans a node's successors in increasing node order, so the paths it discovers (and
//! their order) are a pure function of the graph, the source and the sink.

use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;
use log::{debug, info};
use petgraph::{
    graph::NodeIndex,
    visit::{VisitMap, Visitable},
};

use crate::network::{CapacityGraph, NodeId};
use crate::units::Capacity;

identifier!(PathId, usize);

/// An augmenting path from source to sink, together with the flow pushed along it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Path {
    nodes: Vec<NodeId>,
    flow: Capacity,
}

impl Path {
    pub(crate) fn new(nodes: Vec<NodeId>, flow: Capacity) -> Self {
        Self { nodes, flow }
    }

    /// The nodes of the path, source first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The bottleneck residual capacity at the time the path was discovered.
    pub fn flow(&self) -> Capacity {
        self.flow
    }

    /// The consecutive `(from, to)` pairs of the path.
    pub fn hops(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().copied().tuple_windows()
    }

    /// The node at position `idx`, counting from the source.
    pub fn node_at(&self, idx: usize) -> Option<NodeId> {
        self.nodes.get(idx).copied()
    }

    delegate::delegate! {
        to self.nodes {
            /// Number of nodes on the path (always at least two).
            pub fn len(&self) -> usize;
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes.iter().join(" -> "))
    }
}

/// The result of a maximum flow computation: the flow value and the augmenting paths in the
/// order they were found. A path's [`PathId`] is its position in `paths`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FlowDecomposition {
    pub value: Capacity,
    pub paths: Vec<Path>,
}

impl FlowDecomposition {
    pub fn nr_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn is_routable(&self) -> bool {
        !self.paths.is_empty()
    }
}

/// Computes the maximum flow from `source` to `sink` and the augmenting paths that realize it.
///
/// A graph without any path from `source` to `sink` produces a zero flow and no paths; that is
/// not an error here.
pub fn max_flow(
    graph: &CapacityGraph,
    source: NodeId,
    sink: NodeId,
) -> Result<FlowDecomposition, Error> {
    check_terminals(graph, source, sink)?;

    let mut residual = Residual::new(graph);
    let mut parent = vec![None; graph.nr_nodes()];
    let mut value = Capacity::ZERO;
    let mut paths = Vec::new();
    while residual.find_path(source, sink, &mut parent) {
        let nodes = trace(&parent, sink);
        // `source != sink`, so every path has at least one hop
        let flow = nodes
            .iter()
            .tuple_windows()
            .map(|(&u, &v)| residual.get(u, v))
            .min()
            .unwrap_or(Capacity::ZERO);
        residual.augment(&nodes, flow);
        value += flow;
        let path = Path::new(nodes, flow);
        debug!("augmenting path {}: {path} (flow {flow})", paths.len());
        paths.push(path);
    }
    info!(
        "maximum possible flow from {source} to {sink} is {value} over {} paths",
        paths.len()
    );
    Ok(FlowDecomposition { value, paths })
}

/// Checks that `source` and `sink` are distinct nodes of `graph`.
pub fn check_terminals(
    graph: &CapacityGraph,
    source: NodeId,
    sink: NodeId,
) -> Result<(), Error> {
    for id in [source, sink] {
        if !graph.contains(id) {
            return Err(Error::UnknownNode {
                id,
                nr_nodes: graph.nr_nodes(),
            });
        }
    }
    if source == sink {
        return Err(Error::SourceIsSink(source));
    }
    Ok(())
}

#[derive(Debug)]
struct Residual<'a> {
    graph: &'a CapacityGraph,
    inner: Vec<Vec<Capacity>>,
}

impl<'a> Residual<'a> {
    fn new(graph: &'a CapacityGraph) -> Self {
        Self {
            graph,
            inner: graph.capacity_matrix(),
        }
    }

    fn get(&self, u: NodeId, v: NodeId) -> Capacity {
        self.inner[u.inner()][v.inner()]
    }

    /// Pushes `flow` along `nodes`, crediting the reverse direction of every hop so later
    /// searches may cancel it.
    fn augment(&mut self, nodes: &[NodeId], flow: Capacity) {
        for (&u, &v) in nodes.iter().tuple_windows() {
            self.inner[u.inner()][v.inner()] -= flow;
            self.inner[v.inner()][u.inner()] += flow;
        }
    }

    /// Breadth-first search over links with positive residual capacity. On success, `parent`
    /// holds the search tree and `true` is returned as soon as `sink` is discovered.
    fn find_path(&self, source: NodeId, sink: NodeId, parent: &mut [Option<NodeId>]) -> bool {
        parent.fill(None);
        let mut discovered = self.graph.topology.graph.visit_map();
        discovered.visit(index(source));

        let mut queue = VecDeque::new();
        queue.push_back(source);

        let nr_nodes = self.inner.len();
        while let Some(u) = queue.pop_front() {
            for v in (0..nr_nodes).map(NodeId::new) {
                if self.get(u, v) > Capacity::ZERO && discovered.visit(index(v)) {
                    parent[v.inner()] = Some(u);
                    if v == sink {
                        return true;
                    }
                    queue.push_back(v);
                }
            }
        }
        false
    }
}

// Nodes are added to the topology in ID order, so IDs and indices coincide.
fn index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.inner())
}

/// Walks parent pointers back from `sink`. The source is the only discovered node without a
/// parent.
fn trace(parent: &[Option<NodeId>], sink: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![sink];
    let mut cur = sink;
    while let Some(prev) = parent[cur.inner()] {
        nodes.push(prev);
        cur = prev;
    }
    nodes.reverse();
    nodes
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source and sink are the same node ({0})")]
    SourceIsSink(NodeId),

    #[error("node {id} is not in the graph ({nr_nodes} nodes)")]
    UnknownNode { id: NodeId, nr_nodes: usize },
}
