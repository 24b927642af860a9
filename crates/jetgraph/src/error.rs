//! Error types for jetgraph.

use thiserror::Error;

use crate::codegen::ExpressionId;

/// Errors that can occur while recording or consuming an expression graph.
///
/// All of these indicate misuse by the caller rather than a transient
/// condition, so nothing in the crate retries on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// `start()` was called while this thread already records a graph.
    #[error("an expression recording session is already active on this thread")]
    SessionAlreadyActive,

    /// Lookup of an id that the graph never produced.
    #[error("invalid expression id {id} for graph with {size} expressions")]
    InvalidExpressionId { id: ExpressionId, size: usize },

    /// A node references an operand or slot that is not recorded before it.
    #[error("expression {id} references {reference}, which does not precede it")]
    ForwardReference {
        id: ExpressionId,
        reference: ExpressionId,
    },

    /// A stored id does not match the node's position.
    #[error("expression at position {position} carries id {id}")]
    MisplacedExpression { position: usize, id: ExpressionId },

    /// Seed index outside the derivative vector.
    #[error("seed index {index} out of range for jet of dimension {dimension}")]
    SeedIndexOutOfRange { index: usize, dimension: usize },

    /// An emitter rejected the graph.
    #[error("emitter failed: {message}")]
    Emit { message: String },
}
