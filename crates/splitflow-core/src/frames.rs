//! Frame-by-frame records of packets travelling along their paths, for animation.
//!
//! With [`Traversal::Reference`] there are `nr_packets * nr_paths` frames and frame `i` shows
//! packet `i / nr_paths` on its assigned path at node `i mod len(path)`. The node index follows
//! the global frame counter rather than the packet's own progress, so a packet does not
//! generally move monotonically from source to sink. [`Traversal::Walk`] is the alternative in
//! which every packet visits each node of its path in order.

use std::str::FromStr;

use crate::assign::Assignment;
use crate::maxflow::{Path, PathId};
use crate::network::NodeId;
use crate::packet::PacketId;

/// One tick of the animation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub frame_index: usize,
    pub packet_id: PacketId,
    pub path_id: PathId,
    pub current_node: NodeId,
}

/// How frames are derived from an assignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// `nr_packets * nr_paths` frames indexed by the global frame counter.
    #[default]
    Reference,
    /// One frame per node of each packet's path, packets in increasing order.
    Walk,
}

impl FromStr for Traversal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Self::Reference),
            "walk" => Ok(Self::Walk),
            _ => Err(Error::UnknownTraversal(s.to_owned())),
        }
    }
}

/// A lazy, finite sequence of [`Frame`]s.
#[derive(Debug)]
pub struct Frames<'a> {
    paths: &'a [Path],
    assignment: &'a Assignment,
    traversal: Traversal,
    index: usize,
    // Walk state
    packet: usize,
    hop: usize,
}

impl<'a> Frames<'a> {
    /// Returns an error if `assignment` was made over a different number of paths.
    pub fn new(
        paths: &'a [Path],
        assignment: &'a Assignment,
        traversal: Traversal,
    ) -> Result<Self, Error> {
        if assignment.nr_paths() != paths.len() {
            return Err(Error::PathCountMismatch {
                expected: paths.len(),
                got: assignment.nr_paths(),
            });
        }
        Ok(Self {
            paths,
            assignment,
            traversal,
            index: 0,
            packet: 0,
            hop: 0,
        })
    }

    /// The total number of frames in the sequence.
    pub fn total(&self) -> usize {
        match self.traversal {
            Traversal::Reference => self.assignment.nr_packets() * self.paths.len(),
            Traversal::Walk => self
                .assignment
                .iter()
                .filter_map(|(_, path)| self.paths.get(path.inner()))
                .map(|p| p.len())
                .sum(),
        }
    }

    fn path(&self, packet: usize) -> Option<(PathId, &'a Path)> {
        let id = self.assignment.path_of(PacketId::new(packet))?;
        self.paths.get(id.inner()).map(|p| (id, p))
    }

    fn next_reference(&mut self) -> Option<Frame> {
        let nr_paths = self.paths.len();
        if self.index >= self.assignment.nr_packets() * nr_paths {
            return None;
        }
        let packet = self.index / nr_paths;
        let (path_id, path) = self.path(packet)?;
        let frame = Frame {
            frame_index: self.index,
            packet_id: PacketId::new(packet),
            path_id,
            current_node: path.node_at(self.index % path.len())?,
        };
        self.index += 1;
        Some(frame)
    }

    fn next_walk(&mut self) -> Option<Frame> {
        loop {
            let (path_id, path) = self.path(self.packet)?;
            match path.node_at(self.hop) {
                Some(node) => {
                    let frame = Frame {
                        frame_index: self.index,
                        packet_id: PacketId::new(self.packet),
                        path_id,
                        current_node: node,
                    };
                    self.index += 1;
                    self.hop += 1;
                    return Some(frame);
                }
                None => {
                    self.packet += 1;
                    self.hop = 0;
                }
            }
        }
    }
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        match self.traversal {
            Traversal::Reference => self.next_reference(),
            Traversal::Walk => self.next_walk(),
        }
    }
}

/// Collects the whole frame sequence.
pub fn frames(
    paths: &[Path],
    assignment: &Assignment,
    traversal: Traversal,
) -> Result<Vec<Frame>, Error> {
    Ok(Frames::new(paths, assignment, traversal)?.collect())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("assignment was made over {got} paths, but there are {expected}")]
    PathCountMismatch { expected: usize, got: usize },

    #[error("unknown traversal `{0}` (expected `reference` or `walk`)")]
    UnknownTraversal(String),
}
