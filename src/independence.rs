//! Conditional-independence sources.
//!
//! The engine's strategies consult an `IndependenceTest`. The in-crate
//! implementation is `MsepTest`, an exact oracle answering d-separation
//! queries against a reference DAG; statistical tests over data are
//! injected by callers implementing the same trait.

use crate::dag::Dag;

/// Outcome of one independence query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndependenceResult {
    pub independent: bool,
    /// Present for statistical tests, absent for the oracle.
    pub p_value: Option<f64>,
}

impl IndependenceResult {
    pub fn exact(independent: bool) -> Self {
        IndependenceResult {
            independent,
            p_value: None,
        }
    }
}

/// A source of conditional-independence facts over named variables.
pub trait IndependenceTest {
    /// Is `x` independent of `y` given `z`?
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> IndependenceResult;
}

/// Exact d-separation oracle over a reference DAG.
#[derive(Clone, Debug)]
pub struct MsepTest {
    dag: Dag,
}

impl MsepTest {
    pub fn new(dag: Dag) -> Self {
        MsepTest { dag }
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }
}

impl IndependenceTest for MsepTest {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> IndependenceResult {
        IndependenceResult::exact(self.dag.d_separated(x, y, z))
    }
}
