//! Topology files and on-disk session storage.

pub use splitflow_utils::*;
