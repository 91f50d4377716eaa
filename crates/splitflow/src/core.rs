//! Core Splitflow data structures, traits, and routines. The most common entry point is
//! [run::run()], which obtains a session's bytes, routes them, and publishes the results.

pub use splitflow_core::*;
