//! The cipher service sessions obtain their bytes from.

pub use cipher_frontend::*;
