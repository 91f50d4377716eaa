//! This module defines how packets are mapped onto the paths of a flow decomposition.

use crate::maxflow::PathId;
use crate::packet::PacketId;

/// The trait implemented by all path assignment policies.
pub trait AssignmentPolicy {
    /// Assign each of `nr_packets` packets to one of `nr_paths` paths.
    ///
    /// Fails if there are packets to route but no paths to route them over.
    fn assign(&self, nr_packets: usize, nr_paths: usize) -> Result<Assignment, Error>;
}

impl<T: AssignmentPolicy> AssignmentPolicy for &T {
    fn assign(&self, nr_packets: usize, nr_paths: usize) -> Result<Assignment, Error> {
        (**self).assign(nr_packets, nr_paths)
    }
}

/// Cycles through the paths in discovery order: packet `i` uses path `i mod nr_paths`. The
/// flow carried by each path plays no part.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl AssignmentPolicy for RoundRobin {
    fn assign(&self, nr_packets: usize, nr_paths: usize) -> Result<Assignment, Error> {
        if nr_packets == 0 {
            return Ok(Assignment::empty(nr_paths));
        }
        if nr_paths == 0 {
            return Err(Error::NoRoutablePath { nr_packets });
        }
        let inner = (0..nr_packets).map(|i| PathId::new(i % nr_paths)).collect();
        Ok(Assignment { inner, nr_paths })
    }
}

/// A total map from packet IDs `0..len` to path IDs `0..nr_paths`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Assignment {
    inner: Vec<PathId>,
    nr_paths: usize,
}

impl Assignment {
    fn empty(nr_paths: usize) -> Self {
        Self {
            inner: Vec::new(),
            nr_paths,
        }
    }

    /// The path assigned to `packet`, if the packet exists.
    pub fn path_of(&self, packet: PacketId) -> Option<PathId> {
        self.inner.get(packet.inner()).copied()
    }

    /// The number of paths this assignment was made over.
    pub fn nr_paths(&self) -> usize {
        self.nr_paths
    }

    /// Iterates over `(packet, path)` pairs in increasing packet order.
    pub fn iter(&self) -> impl Iterator<Item = (PacketId, PathId)> + '_ {
        self.inner
            .iter()
            .enumerate()
            .map(|(i, &path)| (PacketId::new(i), path))
    }

    delegate::delegate! {
        to self.inner {
            /// The number of packets assigned.
            #[call(len)]
            pub fn nr_packets(&self) -> usize;

            pub fn is_empty(&self) -> bool;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no path to route {nr_packets} packets over")]
    NoRoutablePath { nr_packets: usize },
}
