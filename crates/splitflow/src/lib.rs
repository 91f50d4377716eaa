//! `Splitflow` carries a byte stream across a capacitated network. It computes a maximum flow
//! between two nodes, cuts the stream into packets, spreads the packets round-robin over the
//! augmenting paths, and records the routing as a text trace and a sequence of frames from
//! which an animation can be drawn.

#![warn(unreachable_pub, missing_docs)]

pub mod cipher;
pub mod core;
pub mod utils;
