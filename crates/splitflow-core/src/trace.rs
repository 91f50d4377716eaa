//! The textual routing log of a session.

use std::fmt::Write;

use crate::assign::Assignment;
use crate::maxflow::Path;

/// Renders one `Path <i>: <n0> -> ... -> <nk>` line per path in discovery order, then one
/// `Packet ID <id> uses Path <path>` line per packet in increasing packet order. The output
/// depends only on its inputs.
pub fn render(paths: &[Path], assignment: &Assignment) -> String {
    let mut s = String::new();
    for (i, path) in paths.iter().enumerate() {
        writeln!(s, "Path {i}: {path}").unwrap();
    }
    for (packet, path) in assignment.iter() {
        writeln!(s, "Packet ID {packet} uses Path {path}").unwrap();
    }
    s
}
