//! Property-based and scenario tests for the orientation engine.
//!
//! The property tests draw random true DAGs, derive the implied PAG
//! skeleton by exhaustive d-separation search, and check engine-level
//! invariants: idempotence, monotone mark resolution, and insertion-order
//! confluence. The scenario tests pin down the concrete rule behaviors on
//! minimal fixtures.

use proptest::prelude::*;

use pag_orient::engine::OrientConfig;
use pag_orient::paths::discriminating_paths_from;
use pag_orient::{
    CancelFlag, Dag, DataExaminationStrategy, DiscriminatingPath, Endpoint, FciOrient,
    IndependenceResult, IndependenceTest, MsepTest, NodeId, OracleStrategy, PagGraph,
    PathResolution, SepsetMap, SepsetPolicy, TestBasedStrategy,
};

/// Engine running Zhang's complete rule set over the oracle.
fn zhang_engine(dag: Dag) -> FciOrient<OracleStrategy> {
    let config = OrientConfig {
        complete_rule_set_used: true,
        ..OrientConfig::default()
    };
    FciOrient::with_config(OracleStrategy::new(dag), config).unwrap()
}

const N: usize = 5;

fn node_name(i: usize) -> String {
    format!("V{i}")
}

/// Build a DAG over `N` nodes from a mask over the index pairs `i < j`,
/// with every edge pointing from the lower index; acyclic by construction.
fn dag_from_mask(mask: &[bool]) -> Dag {
    let mut dag = Dag::new();
    for i in 0..N {
        dag.add_node(node_name(i));
    }
    let mut k = 0;
    for i in 0..N {
        for j in i + 1..N {
            if mask[k] {
                dag.add_edge(&node_name(i), &node_name(j)).unwrap();
            }
            k += 1;
        }
    }
    dag
}

/// The PAG skeleton the adjacency phase would produce: two nodes are
/// adjacent iff no subset of the remaining variables d-separates them.
fn implied_skeleton(dag: &Dag, order: &[usize]) -> PagGraph {
    let mut g = PagGraph::new();
    for &i in order {
        g.add_node(node_name(i)).unwrap();
    }
    for a in 0..order.len() {
        for b in a + 1..order.len() {
            let (i, j) = (order[a], order[b]);
            let x = node_name(i);
            let y = node_name(j);
            let others: Vec<String> = (0..N)
                .filter(|&k| k != i && k != j)
                .map(node_name)
                .collect();

            let mut separated = false;
            for subset in 0u32..(1 << others.len()) {
                let z: Vec<String> = others
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| subset & (1 << idx) != 0)
                    .map(|(_, n)| n.clone())
                    .collect();
                if dag.d_separated(&x, &y, &z) {
                    separated = true;
                    break;
                }
            }
            if !separated {
                let xi = g.node_id(&x).unwrap();
                let yi = g.node_id(&y).unwrap();
                g.add_edge(xi, yi).unwrap();
            }
        }
    }
    g
}

fn arb_mask() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), N * (N - 1) / 2)
}

/// Marks keyed by name pairs, for comparing graphs built in different
/// node orders.
fn marks_by_name(g: &PagGraph) -> Vec<(String, String, Endpoint, Endpoint)> {
    let mut out: Vec<_> = g
        .edges()
        .into_iter()
        .map(|e| {
            let (nx, ny) = (g.name(e.x).to_string(), g.name(e.y).to_string());
            if nx <= ny {
                (nx, ny, e.mark_x, e.mark_y)
            } else {
                (ny, nx, e.mark_y, e.mark_x)
            }
        })
        .collect();
    out.sort();
    out
}

proptest! {
    #[test]
    fn orient_is_idempotent(mask in arb_mask()) {
        let dag = dag_from_mask(&mask);
        let order: Vec<usize> = (0..N).collect();
        let mut g = implied_skeleton(&dag, &order);

        let mut engine = zhang_engine(dag);
        engine.orient(&mut g).unwrap();
        let first = g.edges();
        engine.orient(&mut g).unwrap();
        prop_assert_eq!(g.edges(), first);
    }

    #[test]
    fn final_orientation_only_resolves_circles(mask in arb_mask()) {
        let dag = dag_from_mask(&mask);
        let order: Vec<usize> = (0..N).collect();
        let mut g = implied_skeleton(&dag, &order);

        let mut engine = zhang_engine(dag);
        engine.rule_r0(&mut g).unwrap();
        let after_r0 = g.clone();
        engine.final_orientation(&mut g);

        for edge in after_r0.edges() {
            let post_x = g.get_endpoint(edge.y, edge.x).unwrap();
            let post_y = g.get_endpoint(edge.x, edge.y).unwrap();
            if edge.mark_x != Endpoint::Circle {
                prop_assert_eq!(post_x, edge.mark_x);
            }
            if edge.mark_y != Endpoint::Circle {
                prop_assert_eq!(post_y, edge.mark_y);
            }
        }
    }

    #[test]
    fn node_insertion_order_does_not_change_the_pag(mask in arb_mask()) {
        let dag = dag_from_mask(&mask);

        let forward: Vec<usize> = (0..N).collect();
        let backward: Vec<usize> = (0..N).rev().collect();

        let mut g1 = implied_skeleton(&dag, &forward);
        let mut g2 = implied_skeleton(&dag, &backward);

        let mut e1 = zhang_engine(dag.clone());
        let mut e2 = zhang_engine(dag);
        e1.orient(&mut g1).unwrap();
        e2.orient(&mut g2).unwrap();

        prop_assert_eq!(marks_by_name(&g1), marks_by_name(&g2));
    }

    #[test]
    fn discriminating_path_search_yields_valid_paths(mask in arb_mask()) {
        let dag = dag_from_mask(&mask);
        let order: Vec<usize> = (0..N).collect();
        let mut g = implied_skeleton(&dag, &order);

        let mut engine = FciOrient::new(OracleStrategy::new(dag));
        engine.rule_r0(&mut g).unwrap();
        engine.rules_r1_r2_cycle(&mut g);

        let cancel = CancelFlag::new();
        for b in g.nodes() {
            for a in g.nodes_out_to(b, Endpoint::Arrow) {
                for c in g.nodes_in_to(b, Endpoint::Circle) {
                    if !g.is_parent_of(a, c) || g.get_endpoint(b, c) != Some(Endpoint::Arrow) {
                        continue;
                    }
                    for path in discriminating_paths_from(&g, a, b, c, -1, &cancel) {
                        prop_assert!(path.exists_in(&g));
                    }
                }
            }
        }
    }

    #[test]
    fn test_based_strategy_agrees_with_oracle_r0(mask in arb_mask()) {
        let dag = dag_from_mask(&mask);
        let order: Vec<usize> = (0..N).collect();

        let mut g1 = implied_skeleton(&dag, &order);
        let mut g2 = g1.clone();

        let mut oracle = FciOrient::new(OracleStrategy::new(dag.clone()));
        let mut tested = FciOrient::new(TestBasedStrategy::new(MsepTest::new(dag)));
        oracle.rule_r0(&mut g1).unwrap();
        tested.rule_r0(&mut g2).unwrap();

        // Same colliders either way; without latents the sepsets agree on
        // the pivot membership even if the sets themselves differ.
        prop_assert_eq!(marks_by_name(&g1), marks_by_name(&g2));
    }
}

// Scenario fixtures.

fn chain_skeleton() -> (PagGraph, NodeId, NodeId, NodeId) {
    let mut g = PagGraph::new();
    let x = g.add_node("X").unwrap();
    let y = g.add_node("Y").unwrap();
    let z = g.add_node("Z").unwrap();
    g.add_edge(x, y).unwrap();
    g.add_edge(y, z).unwrap();
    (g, x, y, z)
}

#[test]
fn scenario_a_empty_sepset_orients_collider() {
    // True DAG X -> Y <- Z: sepset(X, Z) is empty.
    let mut dag = Dag::new();
    for n in ["X", "Y", "Z"] {
        dag.add_node(n);
    }
    dag.add_edge("X", "Y").unwrap();
    dag.add_edge("Z", "Y").unwrap();

    let (mut g, x, y, z) = chain_skeleton();
    let mut engine = FciOrient::new(OracleStrategy::new(dag));
    engine.rule_r0(&mut g).unwrap();

    assert_eq!(g.get_endpoint(x, y), Some(Endpoint::Arrow));
    assert_eq!(g.get_endpoint(z, y), Some(Endpoint::Arrow));
}

#[test]
fn scenario_b_sepset_with_pivot_leaves_triple_alone() {
    // True DAG X -> Y -> Z: sepset(X, Z) = {Y}, so no collider at Y.
    let mut dag = Dag::new();
    for n in ["X", "Y", "Z"] {
        dag.add_node(n);
    }
    dag.add_edge("X", "Y").unwrap();
    dag.add_edge("Y", "Z").unwrap();

    let (mut g, x, y, z) = chain_skeleton();
    let mut engine = FciOrient::new(OracleStrategy::new(dag));
    engine.orient(&mut g).unwrap();

    assert!(!g.is_def_collider(x, y, z));
}

#[test]
fn scenario_c_double_triangle_adds_one_arrowhead() {
    // a *-> b <-* c with d circle-adjacent to a, b, c; R3 orients d *-> b
    // and the rest of the run changes nothing else.
    let mut g = PagGraph::new();
    let a = g.add_node("A").unwrap();
    let b = g.add_node("B").unwrap();
    let c = g.add_node("C").unwrap();
    let d = g.add_node("D").unwrap();
    g.add_edge_with(a, b, Endpoint::Circle, Endpoint::Arrow).unwrap();
    g.add_edge_with(c, b, Endpoint::Circle, Endpoint::Arrow).unwrap();
    g.add_edge(a, d).unwrap();
    g.add_edge(c, d).unwrap();
    g.add_edge(d, b).unwrap();

    let before = g.edges();
    let mut engine = FciOrient::new(OracleStrategy::new(Dag::new()));
    engine.final_orientation(&mut g);

    let mut changed = Vec::new();
    for (pre, post) in before.iter().zip(g.edges()) {
        if *pre != post {
            changed.push(post);
        }
    }
    assert_eq!(changed.len(), 1);
    assert_eq!(g.get_endpoint(d, b), Some(Endpoint::Arrow));
    assert_eq!(g.get_endpoint(b, d), Some(Endpoint::Circle));
}

/// Scripted strategy answering every query from one fixed sepset.
struct Scripted {
    sepset: Vec<String>,
    cache: SepsetMap,
}

impl Scripted {
    fn new(sepset: &[&str]) -> Self {
        Scripted {
            sepset: sepset.iter().map(|s| s.to_string()).collect(),
            cache: SepsetMap::new(),
        }
    }
}

impl DataExaminationStrategy for Scripted {
    fn is_unshielded_collider(
        &mut self,
        graph: &PagGraph,
        _a: NodeId,
        b: NodeId,
        _c: NodeId,
    ) -> bool {
        !self.sepset.iter().any(|n| n == graph.name(b))
    }

    fn resolve_discriminating_path(
        &mut self,
        graph: &PagGraph,
        path: &DiscriminatingPath,
    ) -> Option<PathResolution> {
        if self.sepset.iter().any(|n| n == graph.name(path.b())) {
            Some(PathResolution::Tail)
        } else {
            Some(PathResolution::Collider)
        }
    }

    fn sepsets(&self) -> &SepsetMap {
        &self.cache
    }
}

fn ddp_fixture() -> (PagGraph, NodeId, NodeId, NodeId, NodeId) {
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
fn scenario_d_sepset_without_pivot_orients_collider() {
    let (mut g, _e, a, b, c) = ddp_fixture();
    let mut engine = FciOrient::new(Scripted::new(&["A"]));
    engine.rule_r4(&mut g);

    assert!(g.is_def_collider(a, b, c));
    assert_eq!(g.get_endpoint(a, b), Some(Endpoint::Arrow));
    assert_eq!(g.get_endpoint(c, b), Some(Endpoint::Arrow));
}

#[test]
fn scenario_d_sepset_with_pivot_orients_tail() {
    let (mut g, _e, _a, b, c) = ddp_fixture();
    let mut engine = FciOrient::new(Scripted::new(&["A", "B"]));
    engine.rule_r4(&mut g);

    assert_eq!(g.get_endpoint(c, b), Some(Endpoint::Tail));
    assert_eq!(g.get_endpoint(b, c), Some(Endpoint::Arrow));
    assert!(g.is_parent_of(b, c));
}

#[test]
fn forbidden_knowledge_is_never_violated() {
    // True collider at Y, but X -> Y is forbidden: the engine must not
    // produce a directed X --> Y edge.
    let mut dag = Dag::new();
    for n in ["X", "Y", "Z"] {
        dag.add_node(n);
    }
    dag.add_edge("X", "Y").unwrap();
    dag.add_edge("Z", "Y").unwrap();

    let (mut g, x, y, _z) = chain_skeleton();
    let mut k = pag_orient::Knowledge::new();
    k.forbid("X", "Y");

    let mut engine = FciOrient::new(OracleStrategy::new(dag));
    engine.set_knowledge(k);
    engine.orient(&mut g).unwrap();

    assert!(!g.is_parent_of(x, y));
}

#[test]
fn spirtes_schedule_skips_tail_completion() {
    // Chain skeleton with no colliders: under the restricted rule set the
    // run stops after R1-R4 and leaves all circles in place.
    let mut dag = Dag::new();
    for n in ["X", "Y", "Z"] {
        dag.add_node(n);
    }
    dag.add_edge("X", "Y").unwrap();
    dag.add_edge("Y", "Z").unwrap();

    let (mut g, _, _, _) = chain_skeleton();
    let mut engine = FciOrient::new(OracleStrategy::new(dag));
    engine.set_complete_rule_set_used(false);
    engine.orient(&mut g).unwrap();

    for edge in g.edges() {
        assert_eq!(edge.mark_x, Endpoint::Circle);
        assert_eq!(edge.mark_y, Endpoint::Circle);
    }
}

#[test]
fn recursive_and_greedy_policies_agree_on_oracle_data() {
    // E -> A -> C with B -> A, B -> C: B sits in sepset(E, C) either way.
    let mut dag = Dag::new();
    for n in ["E", "A", "B", "C"] {
        dag.add_node(n);
    }
    dag.add_edge("E", "A").unwrap();
    dag.add_edge("A", "C").unwrap();
    dag.add_edge("B", "A").unwrap();
    dag.add_edge("B", "C").unwrap();

    for policy in [SepsetPolicy::Greedy, SepsetPolicy::Recursive] {
        let (mut g, _e, _a, b, c) = ddp_fixture();
        let strategy =
            TestBasedStrategy::new(MsepTest::new(dag.clone())).with_policy(policy);
        let mut engine = FciOrient::new(strategy);
        engine.rule_r4(&mut g);
        assert_eq!(g.get_endpoint(c, b), Some(Endpoint::Tail));
    }
}

/// The trait-object seam: an independence test injected from outside the
/// crate, here just delegating to d-separation with a recorded call count.
struct CountingTest {
    inner: MsepTest,
    calls: std::cell::Cell<usize>,
}

impl IndependenceTest for CountingTest {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> IndependenceResult {
        self.calls.set(self.calls.get() + 1);
        self.inner.check_independence(x, y, z)
    }
}

#[test]
fn injected_test_is_consulted() {
    let mut dag = Dag::new();
    for n in ["X", "Y", "Z"] {
        dag.add_node(n);
    }
    dag.add_edge("X", "Y").unwrap();
    dag.add_edge("Z", "Y").unwrap();

    let test = CountingTest {
        inner: MsepTest::new(dag),
        calls: std::cell::Cell::new(0),
    };
    let (mut g, x, y, z) = chain_skeleton();
    let mut engine = FciOrient::new(TestBasedStrategy::new(test));
    engine.orient(&mut g).unwrap();

    assert!(g.is_def_collider(x, y, z));
    assert!(engine.strategy().sepsets().len() >= 1);
}
