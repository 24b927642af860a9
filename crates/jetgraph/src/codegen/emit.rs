//! Boundary to code emitters.
//!
//! An emitter turns a finished graph into imperative code. It walks
//! [`ExpressionGraph::live_nodes`] in id order and produces one statement
//! per node from its kind, `name`, `args` and `lhs_id`; the
//! [`Display`](std::fmt::Display) impl of [`Node`](super::Node) shows the
//! intended shape of each statement.

use super::graph::ExpressionGraph;
use crate::error::ExprError;

/// Something that can translate an expression graph.
pub trait ExpressionEmitter {
    /// What the emitter produces, e.g. source text.
    type Output;

    /// Translate `graph`. Implementations may assume the graph passed
    /// [`ExpressionGraph::validate`].
    fn emit(&mut self, graph: &ExpressionGraph) -> Result<Self::Output, ExprError>;
}

/// Validate `graph` and hand it to `emitter`.
pub fn emit<E: ExpressionEmitter>(
    graph: &ExpressionGraph,
    emitter: &mut E,
) -> Result<E::Output, ExprError> {
    graph.validate()?;
    emitter.emit(graph)
}
