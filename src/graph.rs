//! Mixed graph ADT for partial ancestral graphs.
//!
//! A `PagGraph` holds a skeleton in which every edge carries two independent
//! endpoint marks, one per side. An edge `A o-> B` has a circle at A and an
//! arrowhead at B. The orientation engine resolves circles toward arrows and
//! tails; it never adds or removes adjacencies.
//!
//! Endpoint accessors follow the convention `get_endpoint(x, y)` = the mark
//! at `y` on the edge between `x` and `y`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One end mark of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// Unresolved mark; may become an arrow or a tail.
    Circle,
    /// Arrowhead.
    Arrow,
    /// Tail.
    Tail,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Circle => write!(f, "o"),
            Endpoint::Arrow => write!(f, ">"),
            Endpoint::Tail => write!(f, "-"),
        }
    }
}

/// Whether a variable is observed or latent. Consumed by collaborators
/// (oracle sepset construction); never mutated by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Measured,
    Latent,
}

/// Opaque node handle, stable for the life of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A node: stable name (used for knowledge lookup) plus role tag.
#[derive(Clone, Debug)]
pub struct PagNode {
    pub name: String,
    pub role: NodeRole,
}

/// An edge snapshot: the two nodes and the mark at each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub x: NodeId,
    pub y: NodeId,
    /// Mark at `x`.
    pub mark_x: Endpoint,
    /// Mark at `y`.
    pub mark_y: Endpoint,
}

/// Errors from graph construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),
    #[error("node not found")]
    NodeNotFound,
    #[error("edge already exists between the pair")]
    DuplicateEdge,
    #[error("no edge between the pair")]
    NoSuchEdge,
    #[error("self loops are not allowed")]
    SelfLoop,
}

/// A mixed graph with endpoint-marked edges.
///
/// At most one edge exists between any unordered node pair. Node order and
/// per-node adjacency order are insertion order, which keeps rule iteration
/// deterministic for a given construction sequence.
#[derive(Clone, Debug, Default)]
pub struct PagGraph {
    nodes: Vec<PagNode>,
    by_name: FxHashMap<String, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
    /// Keyed by ordered pair (min, max); value is (mark at min, mark at max).
    marks: FxHashMap<(NodeId, NodeId), (Endpoint, Endpoint)>,
}

impl PagGraph {
    pub fn new() -> Self {
        PagGraph::default()
    }

    /// Add a measured node with the given name.
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<NodeId, GraphError> {
        self.add_node_with_role(name, NodeRole::Measured)
    }

    pub fn add_node_with_role(
        &mut self,
        name: impl Into<String>,
        role: NodeRole,
    ) -> Result<NodeId, GraphError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.nodes.push(PagNode { name, role });
        self.adjacency.push(Vec::new());
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &PagNode {
        &self.nodes[id.0 as usize]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0 as usize].name
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.marks.len()
    }

    /// All node handles, in insertion order.
    pub fn nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len() as u32).map(NodeId).collect()
    }

    fn key(x: NodeId, y: NodeId) -> (NodeId, NodeId) {
        if x <= y {
            (x, y)
        } else {
            (y, x)
        }
    }

    /// Add an edge with circles at both ends.
    pub fn add_edge(&mut self, x: NodeId, y: NodeId) -> Result<(), GraphError> {
        self.add_edge_with(x, y, Endpoint::Circle, Endpoint::Circle)
    }

    /// Add an edge with the given marks (`mark_x` at `x`, `mark_y` at `y`).
    pub fn add_edge_with(
        &mut self,
        x: NodeId,
        y: NodeId,
        mark_x: Endpoint,
        mark_y: Endpoint,
    ) -> Result<(), GraphError> {
        if x == y {
            return Err(GraphError::SelfLoop);
        }
        if x.0 as usize >= self.nodes.len() || y.0 as usize >= self.nodes.len() {
            return Err(GraphError::NodeNotFound);
        }
        let key = Self::key(x, y);
        if self.marks.contains_key(&key) {
            return Err(GraphError::DuplicateEdge);
        }
        let value = if key.0 == x { (mark_x, mark_y) } else { (mark_y, mark_x) };
        self.marks.insert(key, value);
        self.adjacency[x.0 as usize].push(y);
        self.adjacency[y.0 as usize].push(x);
        Ok(())
    }

    pub fn remove_edge(&mut self, x: NodeId, y: NodeId) -> Result<(), GraphError> {
        let key = Self::key(x, y);
        if self.marks.remove(&key).is_none() {
            return Err(GraphError::NoSuchEdge);
        }
        self.adjacency[x.0 as usize].retain(|&n| n != y);
        self.adjacency[y.0 as usize].retain(|&n| n != x);
        Ok(())
    }

    pub fn is_adjacent_to(&self, x: NodeId, y: NodeId) -> bool {
        self.marks.contains_key(&Self::key(x, y))
    }

    /// Neighbors of `x`, in insertion order.
    pub fn adjacent_nodes(&self, x: NodeId) -> Vec<NodeId> {
        self.adjacency[x.0 as usize].clone()
    }

    /// The mark at `y` on the edge between `x` and `y`, if the edge exists.
    pub fn get_endpoint(&self, x: NodeId, y: NodeId) -> Option<Endpoint> {
        let key = Self::key(x, y);
        self.marks.get(&key).map(|&(m_min, m_max)| {
            if key.1 == y {
                m_max
            } else {
                m_min
            }
        })
    }

    /// Set the mark at `y` on the edge between `x` and `y`.
    pub fn set_endpoint(
        &mut self,
        x: NodeId,
        y: NodeId,
        mark: Endpoint,
    ) -> Result<(), GraphError> {
        let key = Self::key(x, y);
        let entry = self.marks.get_mut(&key).ok_or(GraphError::NoSuchEdge)?;
        if key.1 == y {
            entry.1 = mark;
        } else {
            entry.0 = mark;
        }
        Ok(())
    }

    /// Edge snapshot between `x` and `y`.
    pub fn get_edge(&self, x: NodeId, y: NodeId) -> Option<Edge> {
        let mark_y = self.get_endpoint(x, y)?;
        let mark_x = self.get_endpoint(y, x)?;
        Some(Edge { x, y, mark_x, mark_y })
    }

    /// All edges, as snapshots keyed on the ordered pair.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out: Vec<Edge> = self
            .marks
            .iter()
            .map(|(&(x, y), &(mark_x, mark_y))| Edge { x, y, mark_x, mark_y })
            .collect();
        out.sort_by_key(|e| (e.x, e.y));
        out
    }

    /// Nodes `y` adjacent to `x` whose edge carries `mark` at `x`.
    ///
    /// `nodes_in_to(x, Arrow)` is every `y` with `y *-> x`.
    pub fn nodes_in_to(&self, x: NodeId, mark: Endpoint) -> Vec<NodeId> {
        self.adjacency[x.0 as usize]
            .iter()
            .copied()
            .filter(|&y| self.get_endpoint(y, x) == Some(mark))
            .collect()
    }

    /// Nodes `y` adjacent to `x` whose edge carries `mark` at `y`.
    ///
    /// `nodes_out_to(x, Arrow)` is every `y` with `x *-> y`.
    pub fn nodes_out_to(&self, x: NodeId, mark: Endpoint) -> Vec<NodeId> {
        self.adjacency[x.0 as usize]
            .iter()
            .copied()
            .filter(|&y| self.get_endpoint(x, y) == Some(mark))
            .collect()
    }

    /// Reset every endpoint of every edge to `mark`.
    pub fn reorient_all_with(&mut self, mark: Endpoint) {
        for value in self.marks.values_mut() {
            *value = (mark, mark);
        }
    }

    /// True iff `p --> x` (tail at `p`, arrowhead at `x`).
    pub fn is_parent_of(&self, p: NodeId, x: NodeId) -> bool {
        self.get_endpoint(p, x) == Some(Endpoint::Arrow)
            && self.get_endpoint(x, p) == Some(Endpoint::Tail)
    }

    /// Parents of `x`: nodes `p` with `p --> x`.
    pub fn parents(&self, x: NodeId) -> Vec<NodeId> {
        self.adjacency[x.0 as usize]
            .iter()
            .copied()
            .filter(|&p| self.is_parent_of(p, x))
            .collect()
    }

    /// True iff `a *-> b <-* c` with both arrowheads present at `b`.
    pub fn is_def_collider(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.get_endpoint(a, b) == Some(Endpoint::Arrow)
            && self.get_endpoint(c, b) == Some(Endpoint::Arrow)
    }
}

impl fmt::Display for PagGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in self.edges() {
            let left = match edge.mark_x {
                Endpoint::Circle => "o",
                Endpoint::Arrow => "<",
                Endpoint::Tail => "-",
            };
            let right = match edge.mark_y {
                Endpoint::Circle => "o",
                Endpoint::Arrow => ">",
                Endpoint::Tail => "-",
            };
            writeln!(f, "{} {}-{} {}", self.name(edge.x), left, right, self.name(edge.y))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple() -> (PagGraph, NodeId, NodeId, NodeId) {
        let mut g = PagGraph::new();
        let x = g.add_node("X").unwrap();
        let y = g.add_node("Y").unwrap();
        let z = g.add_node("Z").unwrap();
        g.add_edge(x, y).unwrap();
        g.add_edge(y, z).unwrap();
        (g, x, y, z)
    }

    #[test]
    fn endpoint_convention_is_per_side() {
        let (mut g, x, y, _) = triple();
        g.set_endpoint(x, y, Endpoint::Arrow).unwrap();
        assert_eq!(g.get_endpoint(x, y), Some(Endpoint::Arrow));
        assert_eq!(g.get_endpoint(y, x), Some(Endpoint::Circle));
    }

    #[test]
    fn one_edge_per_pair() {
        let (mut g, x, y, _) = triple();
        assert_eq!(g.add_edge(y, x), Err(GraphError::DuplicateEdge));
        assert_eq!(g.edge_count(), 2);
        assert!(g.is_adjacent_to(y, x));
    }

    #[test]
    fn nodes_in_to_and_out_to() {
        let (mut g, x, y, z) = triple();
        g.set_endpoint(x, y, Endpoint::Arrow).unwrap();
        g.set_endpoint(z, y, Endpoint::Arrow).unwrap();
        let into_y = g.nodes_in_to(y, Endpoint::Arrow);
        assert!(into_y.contains(&x) && into_y.contains(&z));
        assert_eq!(g.nodes_out_to(x, Endpoint::Arrow), vec![y]);
    }

    #[test]
    fn parents_require_tail_and_arrow() {
        let (mut g, x, y, _) = triple();
        g.set_endpoint(x, y, Endpoint::Arrow).unwrap();
        assert!(g.parents(y).is_empty());
        g.set_endpoint(y, x, Endpoint::Tail).unwrap();
        assert_eq!(g.parents(y), vec![x]);
        assert!(g.is_parent_of(x, y));
    }

    #[test]
    fn reorient_all_resets_marks() {
        let (mut g, x, y, z) = triple();
        g.set_endpoint(x, y, Endpoint::Arrow).unwrap();
        g.set_endpoint(y, z, Endpoint::Tail).unwrap();
        g.reorient_all_with(Endpoint::Circle);
        for e in g.edges() {
            assert_eq!(e.mark_x, Endpoint::Circle);
            assert_eq!(e.mark_y, Endpoint::Circle);
        }
    }

    #[test]
    fn def_collider() {
        let (mut g, x, y, z) = triple();
        g.set_endpoint(x, y, Endpoint::Arrow).unwrap();
        assert!(!g.is_def_collider(x, y, z));
        g.set_endpoint(z, y, Endpoint::Arrow).unwrap();
        assert!(g.is_def_collider(x, y, z));
    }
}
