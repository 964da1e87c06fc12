//! Error types for the orientation engine.

use thiserror::Error;

/// Errors surfaced by the orientation engine and its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrientError {
    /// `max_path_length` must be -1 (unlimited) or non-negative.
    #[error("invalid max path length {0}: must be -1 (unlimited) or >= 0")]
    InvalidMaxPathLength(i32),

    /// `depth` must be -1 (unlimited) or non-negative.
    #[error("invalid conditioning depth {0}: must be -1 (unlimited) or >= 0")]
    InvalidDepth(i32),

    /// Background knowledge demands an orientation the graph has already
    /// fixed the other way. The inputs are inconsistent; there is no PAG
    /// that satisfies both.
    #[error("background knowledge conflicts with the orientation {from} -> {to}")]
    InconsistentKnowledge { from: String, to: String },

    /// A discriminating path failed its structural invariant at
    /// construction. This is a caller error, not a runtime condition.
    #[error("malformed discriminating path: {0}")]
    MalformedDiscriminatingPath(String),
}
