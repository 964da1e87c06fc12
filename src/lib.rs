//! Rule-based orientation of partial ancestral graphs.
//!
//! Constraint-based causal discovery under latent confounding ends with an
//! orientation phase: given an adjacency skeleton and a source of
//! conditional-independence judgments, resolve the circle marks on each
//! edge into arrowheads and tails. This crate implements that phase as a
//! standalone engine.
//!
//! The pieces:
//!
//! - [`PagGraph`]: a mixed graph whose edges carry one mark per side.
//! - [`DataExaminationStrategy`]: the seam through which R0 and R4 consult
//!   data, with an exact d-separation oracle ([`OracleStrategy`]) and a
//!   test-backed implementation ([`TestBasedStrategy`]) provided.
//! - [`FciOrient`]: the engine applying rules R0-R10 to a fixpoint, under
//!   optional background [`Knowledge`] and cooperative cancellation.
//! - [`svar`]: optional propagation of marks across lag-homologous edges
//!   in time-series graphs.
//!
//! ```
//! use pag_orient::{Dag, FciOrient, OracleStrategy, PagGraph};
//!
//! let mut dag = Dag::new();
//! for n in ["A", "B", "C"] {
//!     dag.add_node(n);
//! }
//! dag.add_edge("A", "B").unwrap();
//! dag.add_edge("C", "B").unwrap();
//!
//! let mut pag = PagGraph::new();
//! let a = pag.add_node("A").unwrap();
//! let b = pag.add_node("B").unwrap();
//! let c = pag.add_node("C").unwrap();
//! pag.add_edge(a, b).unwrap();
//! pag.add_edge(b, c).unwrap();
//!
//! let mut engine = FciOrient::new(OracleStrategy::new(dag));
//! engine.orient(&mut pag).unwrap();
//! assert!(pag.is_def_collider(a, b, c));
//! ```

pub mod dag;
pub mod discriminating;
pub mod engine;
pub mod error;
pub mod graph;
pub mod independence;
pub mod knowledge;
pub mod paths;
pub mod sepset;
pub mod strategy;
pub mod svar;

pub use dag::{Dag, DagError};
pub use discriminating::DiscriminatingPath;
pub use engine::{is_arrowhead_allowed, CancelFlag, FciOrient, OrientConfig};
pub use error::OrientError;
pub use graph::{Edge, Endpoint, GraphError, NodeId, NodeRole, PagGraph, PagNode};
pub use independence::{IndependenceResult, IndependenceTest, MsepTest};
pub use knowledge::Knowledge;
pub use sepset::SepsetMap;
pub use strategy::{
    DataExaminationStrategy, OracleStrategy, PathResolution, SepsetPolicy, TestBasedStrategy,
};
