//! Path-search primitives shared by the orientation rules.
//!
//! - Uncovered potentially-directed paths (R9, R10): depth-first
//!   enumeration of simple paths in which no edge points back toward the
//!   start and no node is adjacent to the node two positions behind it.
//! - Uncovered circle paths (R5): the same traversal restricted to edges
//!   carrying circles at both ends.
//! - Discriminating-path search (R4): breadth-first search backward from
//!   the triangle, tracking that every interior node is a definite
//!   collider on the path and a parent of the far endpoint.

use crate::discriminating::DiscriminatingPath;
use crate::engine::CancelFlag;
use crate::graph::{Endpoint, NodeId, PagGraph};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Map the -1 "unbounded" sentinel to a large finite bound so pathological
/// inputs still terminate.
pub(crate) fn effective_max_path_length(max_path_length: i32) -> usize {
    if max_path_length == -1 {
        1000
    } else {
        max_path_length as usize
    }
}

/// Every uncovered potentially-directed path from `n1` to `n2`.
///
/// Exponential in dense graphs; callers bound their usage via the engine's
/// configuration and cancellation.
pub fn uncovered_pd_paths(graph: &PagGraph, n1: NodeId, n2: NodeId) -> Vec<Vec<NodeId>> {
    let mut paths = Vec::new();
    let mut so_far = vec![n1];
    for curr in graph.adjacent_nodes(n1) {
        uncovered_pd_helper(graph, curr, &mut so_far, n2, &mut paths);
    }
    paths
}

fn uncovered_pd_helper(
    graph: &PagGraph,
    curr: NodeId,
    so_far: &mut Vec<NodeId>,
    end: NodeId,
    paths: &mut Vec<Vec<NodeId>>,
) {
    if so_far.contains(&curr) {
        return;
    }
    let prev = *so_far.last().unwrap();
    // Adding curr must keep the path potentially directed: no tail at curr
    // (edge would point back) and no arrowhead into prev.
    if graph.get_endpoint(prev, curr) == Some(Endpoint::Tail)
        || graph.get_endpoint(curr, prev) == Some(Endpoint::Arrow)
    {
        return;
    }
    // Uncovered: curr must not shortcut to the node two back.
    if so_far.len() >= 2 {
        let prev2 = so_far[so_far.len() - 2];
        if graph.is_adjacent_to(prev2, curr) {
            return;
        }
    }

    so_far.push(curr);
    if curr == end {
        paths.push(so_far.clone());
    } else {
        for next in graph.adjacent_nodes(curr) {
            uncovered_pd_helper(graph, next, so_far, end, paths);
        }
    }
    so_far.pop();
}

/// Every uncovered all-circle path from `n1` to `n2`: the potentially-
/// directed paths whose every edge is circle-circle.
pub fn uncovered_circle_paths(graph: &PagGraph, n1: NodeId, n2: NodeId) -> Vec<Vec<NodeId>> {
    uncovered_pd_paths(graph, n1, n2)
        .into_iter()
        .filter(|path| {
            path.windows(2).all(|w| {
                graph.get_endpoint(w[0], w[1]) == Some(Endpoint::Circle)
                    && graph.get_endpoint(w[1], w[0]) == Some(Endpoint::Circle)
            })
        })
        .collect()
}

/// Breadth-first discriminating-path search for the triangle `a, b, c`
/// (pattern `b *-> a`, `a --> c`, `b o-> c`), walking backward from `a`
/// through definite colliders that are parents of `c`, and emitting a
/// validated candidate for every reachable anchor not adjacent to `c`.
///
/// Candidates are emitted in discovery order (shortest first).
pub fn discriminating_paths_from(
    graph: &PagGraph,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    max_path_length: i32,
    cancel: &CancelFlag,
) -> Vec<DiscriminatingPath> {
    let bound = effective_max_path_length(max_path_length);
    let mut out = Vec::new();

    let c_parents: FxHashSet<NodeId> = graph.parents(c).into_iter().collect();

    let mut queue: VecDeque<NodeId> = VecDeque::new();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut previous: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    queue.push_back(a);
    visited.insert(a);
    visited.insert(b);
    previous.insert(a, b);

    while let Some(t) = queue.pop_front() {
        if cancel.is_cancelled() {
            break;
        }

        for d in graph.nodes_in_to(t, Endpoint::Arrow) {
            if visited.contains(&d) {
                continue;
            }

            // The step d *-> t must leave t a definite collider on the path.
            let p = previous[&t];
            if !graph.is_def_collider(d, t, p) {
                continue;
            }

            previous.insert(d, t);

            // Chain from t back down to a; collider path runs e-side first.
            let mut collider_path = Vec::new();
            let mut node = d;
            while let Some(&prev) = previous.get(&node) {
                if prev == b {
                    break;
                }
                collider_path.push(prev);
                node = prev;
            }

            if collider_path.len() + 1 > bound {
                continue;
            }

            if !graph.is_adjacent_to(d, c) {
                if let Ok(path) = DiscriminatingPath::new(d, a, b, c, collider_path) {
                    if path.exists_in(graph) {
                        out.push(path);
                    }
                }
            } else if c_parents.contains(&d) {
                queue.push_back(d);
                visited.insert(d);
            }
        }
    }

    out
}
