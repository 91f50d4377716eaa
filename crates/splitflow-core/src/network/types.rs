use std::fmt;

use crate::units::Capacity;

identifier!(NodeId, usize);

/// A directed, capacitated channel from `src` to `dst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub src: NodeId,
    pub dst: NodeId,
    pub capacity: Capacity,
}

impl Link {
    pub fn new(src: NodeId, dst: NodeId, capacity: impl Into<Capacity>) -> Self {
        Self {
            src,
            dst,
            capacity: capacity.into(),
        }
    }
}

// Used as the edge label when rendering the topology.
impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.capacity)
    }
}
