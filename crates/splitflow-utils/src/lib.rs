//! Utilities for interfacing with Splitflow: topology files and on-disk session storage.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

mod layout;
mod store;

use std::path::{Path, PathBuf};

use splitflow_core::{CapacityGraph, Link, NodeId, REFERENCE_SINK, REFERENCE_SOURCE};

pub use layout::SessionLayout;
pub use store::FsStore;

/// Reads a [`CapacityGraph`] and its terminals from a file containing a [`TopologySpec`] in
/// JSON or Dhall format.
pub fn read_graph(topology_spec: impl AsRef<Path>) -> Result<Terminals, Error> {
    read_topology_spec(topology_spec)?.into_terminals()
}

/// Reads a [`TopologySpec`] from a file in JSON or Dhall format.
pub fn read_topology_spec(path: impl AsRef<Path>) -> Result<TopologySpec, Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let spec: TopologySpec = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        Some("dhall") => serde_dhall::from_str(&contents).parse().map_err(Box::new)?,
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    };
    Ok(spec)
}

/// A topology specification.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TopologySpec {
    /// Number of nodes. Nodes are named `0..nr_nodes`.
    pub nr_nodes: usize,
    /// Directed links.
    pub links: Vec<Link>,
    /// Where flow enters.
    pub source: NodeId,
    /// Where flow leaves.
    pub sink: NodeId,
}

impl TopologySpec {
    /// Validates the topology and pairs it with its terminals.
    pub fn into_terminals(self) -> Result<Terminals, Error> {
        let graph = CapacityGraph::new(self.nr_nodes, &self.links)?;
        Ok(Terminals {
            graph,
            source: self.source,
            sink: self.sink,
        })
    }
}

/// A graph together with the nodes flow is routed between.
#[derive(Debug, Clone)]
pub struct Terminals {
    /// The capacity graph.
    pub graph: CapacityGraph,
    /// Where flow enters.
    pub source: NodeId,
    /// Where flow leaves.
    pub sink: NodeId,
}

impl Terminals {
    /// The built-in reference topology, routed from node 0 to node 4.
    pub fn reference() -> Self {
        Self {
            graph: CapacityGraph::reference(),
            source: REFERENCE_SOURCE,
            sink: REFERENCE_SINK,
        }
    }
}

/// Error kinds for specifications and I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error serializing/deserializing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),

    /// Error serializing/deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Error constructing a valid topology.
    #[error("invalid topology")]
    Topology(#[from] splitflow_core::TopologyError),
}

#[cfg(test)]
mod tests {
    use splitflow_core::Capacity;

    use super::*;

    #[test]
    fn json_topology() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("topo.json");
        std::fs::write(
            &path,
            r#"{
                "nr_nodes": 3,
                "links": [
                    { "src": 0, "dst": 1, "capacity": 5 },
                    { "src": 1, "dst": 2, "capacity": 3 }
                ],
                "source": 0,
                "sink": 2
            }"#,
        )?;
        let t = read_graph(&path)?;
        assert_eq!(t.graph.nr_nodes(), 3);
        assert_eq!(t.graph.capacity(NodeId::new(1), NodeId::new(2)), Capacity::new(3));
        assert_eq!((t.source, t.sink), (NodeId::new(0), NodeId::new(2)));
        Ok(())
    }

    #[test]
    fn dhall_topology() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("topo.dhall");
        std::fs::write(
            &path,
            "{ nr_nodes = 2, links = [ { src = 0, dst = 1, capacity = 8 } ], source = 0, sink = 1 }",
        )?;
        let t = read_graph(&path)?;
        assert_eq!(t.graph.nr_links(), 1);
        assert_eq!(t.graph.capacity(NodeId::new(0), NodeId::new(1)), Capacity::new(8));
        Ok(())
    }

    #[test]
    fn invalid_topology_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("topo.json");
        std::fs::write(
            &path,
            r#"{ "nr_nodes": 2, "links": [{ "src": 0, "dst": 5, "capacity": 1 }], "source": 0, "sink": 1 }"#,
        )?;
        assert!(matches!(read_graph(&path), Err(Error::Topology(..))));
        Ok(())
    }

    #[test]
    fn unknown_extension() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("topo.yaml");
        std::fs::write(&path, "")?;
        assert!(matches!(read_graph(&path), Err(Error::UnknownFileType(..))));
        Ok(())
    }
}
