//! Discriminating-path record and its defensive validator.
//!
//! A discriminating path `<e, ..., a, b, c>` pins down whether `b` is a
//! collider or a non-collider on the triple `<a, b, c>`: every node strictly
//! between `e` and `b` is a definite collider on the path and a parent of
//! `c`, `e` is not adjacent to `c`, and the `b`—`c` edge is still unresolved
//! at `b` (`b o-> c`). Rule R4 consults a separating set for `(e, c)` to
//! decide the orientation.
//!
//! Because earlier rule firings may invalidate a candidate before it is
//! consumed, `exists_in` re-checks the full invariant against the current
//! graph; a stale path must be discarded, never acted on.

use crate::error::OrientError;
use crate::graph::{Endpoint, NodeId, PagGraph};

/// The nodes defining one discriminating path.
///
/// `collider_path` holds the nodes strictly between `e` and `b`, ordered
/// from the `e` side; its last element is `a`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiscriminatingPath {
    e: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    collider_path: Vec<NodeId>,
}

impl DiscriminatingPath {
    /// Build a path record, checking the shape constraints that do not
    /// depend on the graph. Shape violations are caller errors.
    pub fn new(
        e: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        collider_path: Vec<NodeId>,
    ) -> Result<Self, OrientError> {
        if collider_path.is_empty() || *collider_path.last().unwrap() != a {
            return Err(OrientError::MalformedDiscriminatingPath(
                "collider path must end at the node adjacent to the pivot".into(),
            ));
        }
        if collider_path.contains(&e) || collider_path.contains(&b) || collider_path.contains(&c) {
            return Err(OrientError::MalformedDiscriminatingPath(
                "collider path may not revisit the path endpoints".into(),
            ));
        }
        if e == b || e == c || b == c || e == a || a == b || a == c {
            return Err(OrientError::MalformedDiscriminatingPath(
                "path endpoints must be distinct".into(),
            ));
        }
        Ok(DiscriminatingPath {
            e,
            a,
            b,
            c,
            collider_path,
        })
    }

    pub fn e(&self) -> NodeId {
        self.e
    }

    pub fn a(&self) -> NodeId {
        self.a
    }

    /// The pivot whose collider status the path discriminates.
    pub fn b(&self) -> NodeId {
        self.b
    }

    pub fn c(&self) -> NodeId {
        self.c
    }

    pub fn collider_path(&self) -> &[NodeId] {
        &self.collider_path
    }

    /// The full node sequence `e, ..., a, b, c`.
    pub fn full_path(&self) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(self.collider_path.len() + 3);
        path.push(self.e);
        path.extend_from_slice(&self.collider_path);
        path.push(self.b);
        path.push(self.c);
        path
    }

    /// Re-check the full structural invariant against the current graph.
    ///
    /// Returns false as soon as any piece fails; a false result means the
    /// path is stale and must not be used for orientation.
    pub fn exists_in(&self, graph: &PagGraph) -> bool {
        // b o-> c still unresolved at b, arrow into c.
        if graph.get_endpoint(self.c, self.b) != Some(Endpoint::Circle) {
            return false;
        }
        if graph.get_endpoint(self.b, self.c) != Some(Endpoint::Arrow) {
            return false;
        }
        // Arrow into a on the a—b edge.
        if graph.get_endpoint(self.b, self.a) != Some(Endpoint::Arrow) {
            return false;
        }
        // The anchor stays non-adjacent to the far endpoint.
        if graph.is_adjacent_to(self.e, self.c) {
            return false;
        }
        // Every interior node is a parent of c.
        for &p in &self.collider_path {
            if !graph.is_parent_of(p, self.c) {
                return false;
            }
        }
        // Consecutive adjacency along e, ..., a, b, c, and definite
        // colliders at every interior node of e, ..., a, b.
        let spine: Vec<NodeId> = {
            let mut s = Vec::with_capacity(self.collider_path.len() + 2);
            s.push(self.e);
            s.extend_from_slice(&self.collider_path);
            s.push(self.b);
            s
        };
        for w in spine.windows(2) {
            if !graph.is_adjacent_to(w[0], w[1]) {
                return false;
            }
        }
        for w in spine.windows(3) {
            if !graph.is_def_collider(w[0], w[1], w[2]) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PagGraph;

    /// e *-> a <-> b o-> c with a --> c, e not adjacent to c.
    fn fixture() -> (PagGraph, NodeId, NodeId, NodeId, NodeId) {
        let mut g = PagGraph::new();
        let e = g.add_node("E").unwrap();
        let a = g.add_node("A").unwrap();
        let b = g.add_node("B").unwrap();
        let c = g.add_node("C").unwrap();
        g.add_edge_with(e, a, Endpoint::Circle, Endpoint::Arrow).unwrap();
        g.add_edge_with(a, b, Endpoint::Arrow, Endpoint::Arrow).unwrap();
        g.add_edge_with(b, c, Endpoint::Circle, Endpoint::Arrow).unwrap();
        g.add_edge_with(a, c, Endpoint::Tail, Endpoint::Arrow).unwrap();
        (g, e, a, b, c)
    }

    #[test]
    fn valid_path_exists() {
        let (g, e, a, b, c) = fixture();
        let path = DiscriminatingPath::new(e, a, b, c, vec![a]).unwrap();
        assert!(path.exists_in(&g));
        assert_eq!(path.full_path(), vec![e, a, b, c]);
    }

    #[test]
    fn stale_path_is_rejected() {
        let (mut g, e, a, b, c) = fixture();
        let path = DiscriminatingPath::new(e, a, b, c, vec![a]).unwrap();
        // A prior rule firing resolves b o-> c to b --> c.
        g.set_endpoint(c, b, Endpoint::Tail).unwrap();
        assert!(!path.exists_in(&g));
    }

    #[test]
    fn malformed_shape_is_a_caller_error() {
        let (_, e, a, b, c) = fixture();
        assert!(DiscriminatingPath::new(e, a, b, c, vec![]).is_err());
        assert!(DiscriminatingPath::new(e, a, b, c, vec![b]).is_err());
        assert!(DiscriminatingPath::new(e, a, b, a, vec![a]).is_err());
    }

    #[test]
    fn anchor_adjacent_to_far_endpoint_fails() {
        let (mut g, e, a, b, c) = fixture();
        g.add_edge(e, c).unwrap();
        let path = DiscriminatingPath::new(e, a, b, c, vec![a]).unwrap();
        assert!(!path.exists_in(&g));
    }
}
