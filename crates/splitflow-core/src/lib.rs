#![warn(unreachable_pub, missing_debug_implementations)]

//! The core Splitflow library. This crate defines [the routine](run::run) that carries a byte
//! stream over the [augmenting paths](maxflow::max_flow) of a [capacity graph](CapacityGraph),
//! producing a routing trace and a sequence of animation frames.

#[macro_use]
mod ident;

pub mod assign;
pub mod boundary;
pub mod frames;
pub mod maxflow;
pub mod network;
pub mod packet;
pub mod run;
pub mod session;
pub mod trace;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

pub use assign::{Assignment, AssignmentPolicy, Error as AssignError, RoundRobin};
pub use boundary::{ByteSource, Publisher};
pub use frames::{Error as FrameError, Frame, Traversal};
pub use maxflow::{max_flow, Error as FlowError, FlowDecomposition, Path, PathId};
pub use network::{CapacityGraph, Link, NodeId, TopologyError, REFERENCE_SINK, REFERENCE_SOURCE};
pub use packet::{Error as PacketError, Packet, PacketId, Segmenter, DEFAULT_PACKET_SIZE};
pub use run::{run, Error};
pub use session::{CodeError, Session, SessionCode, SessionOpts, SessionOutput};
pub use units::{Bytes, Capacity};
