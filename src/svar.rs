//! Homologous-edge propagation for time-series (SVAR) graphs.
//!
//! In a lag-unrolled graph the same structural edge appears once per lag
//! pair: if `X:0 -- Y:1` is present then so is `X:1 -- Y:2`, and the data
//! carry the same information about each copy. After orientation, marks
//! found on one copy are propagated to every homologous copy whose marks
//! are still circles. Marks already resolved the other way are left alone;
//! propagation is monotone like the rules themselves.
//!
//! Variable naming follows the `NAME:LAG` convention; a missing suffix
//! means lag 0.

use crate::graph::{Endpoint, NodeId, PagGraph};
use tracing::debug;

/// Split a lagged variable name into its base name and lag.
///
/// `"X:2"` gives `("X", 2)`; `"X"` gives `("X", 0)`. A non-numeric suffix
/// is treated as part of the base name.
pub fn base_and_lag(name: &str) -> (&str, i32) {
    if let Some((base, lag)) = name.rsplit_once(':') {
        if let Ok(lag) = lag.parse::<i32>() {
            return (base, lag);
        }
    }
    (name, 0)
}

/// Propagate every resolved mark to all homologous edges, using the
/// `NAME:LAG` naming convention. Returns the number of marks set.
pub fn propagate_homologous(graph: &mut PagGraph) -> usize {
    propagate_homologous_with(graph, |name| {
        let (base, lag) = base_and_lag(name);
        (base.to_string(), lag)
    })
}

/// Propagate resolved marks across homologous edges, with the lag
/// structure supplied by `classify`: a map from node name to (series
/// name, lag). Two edges are homologous when both endpoints share series
/// names and the lag offsets agree.
pub fn propagate_homologous_with<F>(graph: &mut PagGraph, classify: F) -> usize
where
    F: Fn(&str) -> (String, i32),
{
    let nodes = graph.nodes();
    let classified: Vec<(String, i32)> = nodes
        .iter()
        .map(|&n| classify(graph.name(n)))
        .collect();

    let series = |n: NodeId| -> &(String, i32) { &classified[n.0 as usize] };

    let mut set_count = 0;

    // Source edges are a snapshot; marks propagated this pass do not
    // themselves become sources until a caller runs another pass.
    for edge in graph.edges() {
        if edge.mark_x == Endpoint::Circle && edge.mark_y == Endpoint::Circle {
            continue;
        }
        let (sx, lx) = series(edge.x).clone();
        let (sy, ly) = series(edge.y).clone();
        let offset = ly - lx;

        for &x1 in &nodes {
            let (s1, l1) = series(x1).clone();
            if s1 != sx {
                continue;
            }
            for &y1 in &nodes {
                if x1 == edge.x && y1 == edge.y {
                    continue;
                }
                let (s2, l2) = series(y1).clone();
                if s2 != sy || l2 - l1 != offset {
                    continue;
                }
                if !graph.is_adjacent_to(x1, y1) {
                    continue;
                }
                if edge.mark_x != Endpoint::Circle
                    && graph.get_endpoint(y1, x1) == Some(Endpoint::Circle)
                {
                    let _ = graph.set_endpoint(y1, x1, edge.mark_x);
                    set_count += 1;
                    debug!(
                        from = graph.name(x1),
                        to = graph.name(y1),
                        mark = %edge.mark_x,
                        "homologous mark propagated"
                    );
                }
                if edge.mark_y != Endpoint::Circle
                    && graph.get_endpoint(x1, y1) == Some(Endpoint::Circle)
                {
                    let _ = graph.set_endpoint(x1, y1, edge.mark_y);
                    set_count += 1;
                    debug!(
                        from = graph.name(x1),
                        to = graph.name(y1),
                        mark = %edge.mark_y,
                        "homologous mark propagated"
                    );
                }
            }
        }
    }

    set_count
}
