//! Small topologies shared by tests.

use crate::network::types::{Link, NodeId};

fn links(edges: &[(usize, usize, u64)]) -> Vec<Link> {
    edges
        .iter()
        .map(|&(a, b, c)| Link::new(NodeId::new(a), NodeId::new(b), c))
        .collect()
}

/// The built-in five-node topology as a link list. Source 0, sink 4.
pub(crate) fn reference_config() -> (usize, Vec<Link>) {
    let links = links(&[
        (0, 1, 16),
        (0, 2, 13),
        (1, 2, 10),
        (1, 3, 12),
        (2, 1, 4),
        (2, 4, 14),
        (3, 2, 9),
        (3, 4, 20),
        (4, 3, 7),
    ]);
    (5, links)
}

/// The six-node flow network from CLRS. Source 0, sink 5, maximum flow 23.
pub(crate) fn clrs_config() -> (usize, Vec<Link>) {
    let links = links(&[
        (0, 1, 16),
        (0, 2, 13),
        (1, 2, 10),
        (1, 3, 12),
        (2, 1, 4),
        (2, 4, 14),
        (3, 2, 9),
        (3, 5, 20),
        (4, 3, 7),
        (4, 5, 4),
    ]);
    (6, links)
}

/// Two components: {0, 1} and {2, 3}. There is no path from 0 to 3.
pub(crate) fn split_config() -> (usize, Vec<Link>) {
    (4, links(&[(0, 1, 5), (2, 3, 5)]))
}
