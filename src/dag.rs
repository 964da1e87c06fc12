//! Reference DAG with exact d-separation.
//!
//! Used by the oracle strategy and by tests: a known ground-truth causal
//! graph against which conditional independence is decided exactly.
//! d-connection is computed with the Bayes-Ball reachability scheme.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors from reference DAG construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DagError {
    #[error("node '{0}' not found in DAG")]
    NodeNotFound(String),
    #[error("adding edge {from} -> {to} would create a cycle")]
    CycleDetected { from: String, to: String },
}

/// A directed acyclic graph keyed by variable name.
///
/// Nodes may be marked latent; latent variables participate in d-separation
/// but are excluded from conditioning sets the oracle hands out.
#[derive(Clone, Debug, Default)]
pub struct Dag {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    latent: FxHashSet<usize>,
    parents: Vec<FxHashSet<usize>>,
    children: Vec<FxHashSet<usize>>,
}

impl Dag {
    pub fn new() -> Self {
        Dag::default()
    }

    /// Add an observed variable; returns the existing node if the name is taken.
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.intern(name.into(), false);
    }

    /// Add a latent variable.
    pub fn add_latent(&mut self, name: impl Into<String>) {
        self.intern(name.into(), true);
    }

    fn intern(&mut self, name: String, latent: bool) -> usize {
        if let Some(&i) = self.index.get(&name) {
            return i;
        }
        let i = self.names.len();
        self.index.insert(name.clone(), i);
        self.names.push(name);
        self.parents.push(FxHashSet::default());
        self.children.push(FxHashSet::default());
        if latent {
            self.latent.insert(i);
        }
        i
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_latent(&self, name: &str) -> bool {
        self.index
            .get(name)
            .map(|i| self.latent.contains(i))
            .unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Add a directed edge `from -> to`, rejecting cycles.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), DagError> {
        let f = *self
            .index
            .get(from)
            .ok_or_else(|| DagError::NodeNotFound(from.to_string()))?;
        let t = *self
            .index
            .get(to)
            .ok_or_else(|| DagError::NodeNotFound(to.to_string()))?;
        if f == t || self.reaches(t, f) {
            return Err(DagError::CycleDetected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.parents[t].insert(f);
        self.children[f].insert(t);
        Ok(())
    }

    fn reaches(&self, from: usize, to: usize) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        while let Some(n) = queue.pop_front() {
            if n == to {
                return true;
            }
            for &c in &self.children[n] {
                if seen.insert(c) {
                    queue.push_back(c);
                }
            }
        }
        false
    }

    pub fn is_adjacent(&self, x: &str, y: &str) -> bool {
        match (self.index.get(x), self.index.get(y)) {
            (Some(&i), Some(&j)) => {
                self.parents[i].contains(&j) || self.parents[j].contains(&i)
            }
            _ => false,
        }
    }

    pub fn parents_of(&self, name: &str) -> Vec<String> {
        match self.index.get(name) {
            Some(&i) => {
                let mut out: Vec<String> = self.parents[i]
                    .iter()
                    .map(|&p| self.names[p].clone())
                    .collect();
                out.sort();
                out
            }
            None => Vec::new(),
        }
    }

    /// Neighbors of `name` (parents and children), observed and latent.
    pub fn adjacent_to(&self, name: &str) -> Vec<String> {
        match self.index.get(name) {
            Some(&i) => {
                let mut out: Vec<String> = self.parents[i]
                    .iter()
                    .chain(self.children[i].iter())
                    .map(|&n| self.names[n].clone())
                    .collect();
                out.sort();
                out.dedup();
                out
            }
            None => Vec::new(),
        }
    }

    pub fn descendants_of(&self, name: &str) -> FxHashSet<String> {
        let mut out = FxHashSet::default();
        let Some(&start) = self.index.get(name) else {
            return out;
        };
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(n) = queue.pop_front() {
            for &c in &self.children[n] {
                if seen.insert(c) {
                    out.insert(self.names[c].clone());
                    queue.push_back(c);
                }
            }
        }
        out
    }

    /// d-separation: `x` and `y` are d-separated given `z` iff no active
    /// path connects them.
    pub fn d_separated(&self, x: &str, y: &str, z: &[String]) -> bool {
        !self.d_connected(x, y, z)
    }

    /// Bayes-Ball reachability. States are (node, direction); a ball moving
    /// "up" arrived from a child, a ball moving "down" arrived from a parent.
    pub fn d_connected(&self, x: &str, y: &str, z: &[String]) -> bool {
        let (Some(&xi), Some(&yi)) = (self.index.get(x), self.index.get(y)) else {
            return false;
        };
        if xi == yi {
            return true;
        }
        let z: FxHashSet<usize> = z
            .iter()
            .filter_map(|name| self.index.get(name.as_str()).copied())
            .collect();

        let mut visited_up: FxHashSet<usize> = FxHashSet::default();
        let mut visited_down: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<(usize, bool)> = VecDeque::new();
        queue.push_back((xi, true));
        queue.push_back((xi, false));

        while let Some((node, going_up)) = queue.pop_front() {
            if node == yi {
                return true;
            }
            let in_z = z.contains(&node);

            if going_up {
                if !visited_up.insert(node) {
                    continue;
                }
                if !in_z {
                    for &p in &self.parents[node] {
                        queue.push_back((p, true));
                    }
                    for &c in &self.children[node] {
                        queue.push_back((c, false));
                    }
                }
            } else {
                if !visited_down.insert(node) {
                    continue;
                }
                if !in_z {
                    for &c in &self.children[node] {
                        queue.push_back((c, false));
                    }
                }
                // Collider: the ball bounces back up only if the node or one
                // of its descendants is conditioned on.
                if in_z || self.has_descendant_in(&z, node) {
                    for &p in &self.parents[node] {
                        queue.push_back((p, true));
                    }
                }
            }
        }

        false
    }

    fn has_descendant_in(&self, set: &FxHashSet<usize>, node: usize) -> bool {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(node);
        while let Some(n) = queue.pop_front() {
            for &c in &self.children[n] {
                if set.contains(&c) {
                    return true;
                }
                if seen.insert(c) {
                    queue.push_back(c);
                }
            }
        }
        false
    }
}
