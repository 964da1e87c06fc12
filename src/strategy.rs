//! Pluggable examination strategies for the two rules that consult data.
//!
//! R0 (unshielded colliders) and R4 (discriminating paths) are the only
//! rules that need conditional-independence facts; everything else is pure
//! graph rewriting. A `DataExaminationStrategy` answers those two questions,
//! either from an exact d-separation oracle over a reference DAG or from an
//! injected independence test searched over adjacency subsets.
//!
//! Strategies return decisions; the engine owns validation, the background-
//! knowledge gate, and the actual endpoint mutation.

use crate::dag::Dag;
use crate::discriminating::DiscriminatingPath;
use crate::error::OrientError;
use crate::graph::{NodeId, PagGraph};
use crate::independence::IndependenceTest;
use crate::sepset::SepsetMap;
use tracing::debug;

/// How a discriminating path resolves its pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathResolution {
    /// The pivot is a collider: arrowheads at `b` on both triangle edges.
    Collider,
    /// The pivot is a non-collider: tail at `b` on the `b`—`c` edge.
    Tail,
}

/// How the test-based strategy hunts for the blocking set behind R4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SepsetPolicy {
    /// Condition directly on the discriminating path's interior nodes,
    /// with and without the pivot.
    Recursive,
    /// Subset search over the union of the endpoints' neighborhoods.
    #[default]
    Greedy,
}

/// Source of the collider/non-collider judgments behind R0 and R4.
pub trait DataExaminationStrategy {
    /// Is `b` a collider on the unshielded triple `a *-* b *-* c`?
    ///
    /// A `false` answer covers both "non-collider" and "undecidable";
    /// the caller orients nothing in either case.
    fn is_unshielded_collider(
        &mut self,
        graph: &PagGraph,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    ) -> bool;

    /// Decide the pivot of a structurally valid discriminating path.
    /// `None` means no separating set could be produced, so the path
    /// yields no orientation.
    fn resolve_discriminating_path(
        &mut self,
        graph: &PagGraph,
        path: &DiscriminatingPath,
    ) -> Option<PathResolution>;

    /// Separating sets recorded along the way.
    fn sepsets(&self) -> &SepsetMap;
}

/// Lexicographic k-subset generator over `0..n`, in the manner of an
/// odometer: the analogue of iterating index combinations.
struct Choices {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
}

impl Choices {
    fn new(n: usize, k: usize) -> Self {
        Choices {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
        }
    }
}

impl Iterator for Choices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.k > self.n {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        // Advance the rightmost index that still has room.
        let mut i = self.k;
        loop {
            if i == 0 {
                return None;
            }
            i -= 1;
            if self.indices[i] < self.n - (self.k - i) {
                self.indices[i] += 1;
                for j in i + 1..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(self.indices.clone());
            }
        }
    }
}

fn pick<T: Clone>(pool: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| pool[i].clone()).collect()
}

/// Exact strategy: d-separation queries against a known true DAG.
///
/// Separating sets come from the non-descendant lemma (the parents of a
/// variable d-separate it from any non-descendant); when the canonical
/// parent set contains latent variables the strategy falls back to a subset
/// search over the measured neighborhoods.
#[derive(Clone, Debug)]
pub struct OracleStrategy {
    dag: Dag,
    sepsets: SepsetMap,
}

impl OracleStrategy {
    pub fn new(dag: Dag) -> Self {
        OracleStrategy {
            dag,
            sepsets: SepsetMap::new(),
        }
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// A measured separating set for `x` and `y`, by name, or `None` when
    /// the pair is adjacent in the true DAG or no measured set works.
    fn sepset_names(&self, graph: &PagGraph, x: NodeId, y: NodeId) -> Option<Vec<String>> {
        let xn = graph.name(x);
        let yn = graph.name(y);
        if !self.dag.contains_node(xn) || !self.dag.contains_node(yn) {
            return None;
        }
        if self.dag.is_adjacent(xn, yn) {
            return None;
        }

        let canonical = if !self.dag.descendants_of(xn).contains(yn) {
            self.dag.parents_of(xn)
        } else {
            self.dag.parents_of(yn)
        };
        if canonical.iter().all(|p| !self.dag.is_latent(p)) {
            return Some(canonical);
        }

        // Canonical set reaches into latents; hunt for a measured set over
        // the neighborhoods instead.
        let mut pool: Vec<String> = self
            .dag
            .adjacent_to(xn)
            .into_iter()
            .chain(self.dag.adjacent_to(yn))
            .filter(|n| n != xn && n != yn && !self.dag.is_latent(n))
            .collect();
        pool.sort();
        pool.dedup();

        for size in 0..=pool.len() {
            for indices in Choices::new(pool.len(), size) {
                let candidate = pick(&pool, &indices);
                if self.dag.d_separated(xn, yn, &candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn record(&mut self, graph: &PagGraph, x: NodeId, y: NodeId, names: &[String]) {
        let ids: Vec<NodeId> = names
            .iter()
            .filter_map(|n| graph.node_id(n))
            .collect();
        self.sepsets.set(x, y, ids);
    }
}

impl DataExaminationStrategy for OracleStrategy {
    fn is_unshielded_collider(
        &mut self,
        graph: &PagGraph,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    ) -> bool {
        let Some(sepset) = self.sepset_names(graph, a, c) else {
            return false;
        };
        self.record(graph, a, c, &sepset);
        !sepset.iter().any(|n| n == graph.name(b))
    }

    fn resolve_discriminating_path(
        &mut self,
        graph: &PagGraph,
        path: &DiscriminatingPath,
    ) -> Option<PathResolution> {
        let (e, b, c) = (path.e(), path.b(), path.c());
        let sepset = self.sepset_names(graph, e, c)?;
        self.record(graph, e, c, &sepset);
        debug!(
            e = graph.name(e),
            c = graph.name(c),
            sepset = ?sepset,
            "oracle resolved discriminating path"
        );
        if sepset.iter().any(|n| n == graph.name(b)) {
            Some(PathResolution::Tail)
        } else {
            Some(PathResolution::Collider)
        }
    }

    fn sepsets(&self) -> &SepsetMap {
        &self.sepsets
    }
}

/// Strategy backed by an injected independence test, searching conditioning
/// sets over the PAG's own adjacencies up to a depth bound.
#[derive(Clone, Debug)]
pub struct TestBasedStrategy<T> {
    test: T,
    depth: i32,
    policy: SepsetPolicy,
    sepsets: SepsetMap,
}

impl<T: IndependenceTest> TestBasedStrategy<T> {
    pub fn new(test: T) -> Self {
        TestBasedStrategy {
            test,
            depth: -1,
            policy: SepsetPolicy::default(),
            sepsets: SepsetMap::new(),
        }
    }

    /// Bound on conditioning-set size; -1 means unlimited.
    pub fn with_depth(mut self, depth: i32) -> Result<Self, OrientError> {
        if depth < -1 {
            return Err(OrientError::InvalidDepth(depth));
        }
        self.depth = depth;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: SepsetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn policy(&self) -> SepsetPolicy {
        self.policy
    }

    fn independent(&self, graph: &PagGraph, x: NodeId, y: NodeId, z: &[NodeId]) -> bool {
        let z_names: Vec<String> = z.iter().map(|&n| graph.name(n).to_string()).collect();
        self.test
            .check_independence(graph.name(x), graph.name(y), &z_names)
            .independent
    }

    /// Smallest separating subset of `adj(x) ∪ adj(y)`, searched in
    /// increasing size up to the depth bound.
    fn search_sepset(&self, graph: &PagGraph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        let mut pool: Vec<NodeId> = graph
            .adjacent_nodes(x)
            .into_iter()
            .chain(graph.adjacent_nodes(y))
            .filter(|&n| n != x && n != y)
            .collect();
        pool.sort();
        pool.dedup();

        let max_size = if self.depth == -1 {
            pool.len()
        } else {
            pool.len().min(self.depth as usize)
        };

        for size in 0..=max_size {
            for indices in Choices::new(pool.len(), size) {
                let candidate = pick(&pool, &indices);
                if self.independent(graph, x, y, &candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl<T: IndependenceTest> DataExaminationStrategy for TestBasedStrategy<T> {
    fn is_unshielded_collider(
        &mut self,
        graph: &PagGraph,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    ) -> bool {
        let Some(sepset) = self.search_sepset(graph, a, c) else {
            return false;
        };
        let collider = !sepset.contains(&b);
        self.sepsets.set(a, c, sepset);
        collider
    }

    fn resolve_discriminating_path(
        &mut self,
        graph: &PagGraph,
        path: &DiscriminatingPath,
    ) -> Option<PathResolution> {
        let (e, b, c) = (path.e(), path.b(), path.c());

        match self.policy {
            SepsetPolicy::Greedy => {
                let sepset = self.search_sepset(graph, e, c)?;
                let resolution = if sepset.contains(&b) {
                    PathResolution::Tail
                } else {
                    PathResolution::Collider
                };
                self.sepsets.set(e, c, sepset);
                Some(resolution)
            }
            SepsetPolicy::Recursive => {
                // The interior nodes block every non-collider route from e
                // to c; only the pivot's membership is in question.
                let without_b: Vec<NodeId> = path.collider_path().to_vec();
                if self.independent(graph, e, c, &without_b) {
                    self.sepsets.set(e, c, without_b);
                    return Some(PathResolution::Collider);
                }
                let mut with_b = without_b;
                with_b.push(b);
                if self.independent(graph, e, c, &with_b) {
                    self.sepsets.set(e, c, with_b);
                    return Some(PathResolution::Tail);
                }
                None
            }
        }
    }

    fn sepsets(&self) -> &SepsetMap {
        &self.sepsets
    }
}
