//! Expression recording for code generation.
//!
//! Arithmetic on [`ExprRef`] handles is recorded into an
//! [`ExpressionGraph`] instead of being evaluated. The finished graph can be
//! deduplicated with [`eliminate_common_subexpressions`] and passed to an
//! [`ExpressionEmitter`].
//!
//! # Architecture
//!
//! ```text
//! ExpressionRecorder::start()
//!        │
//!        ▼
//!   ExprRef ──records into──► ExpressionGraph (Vec<Node>, id = position)
//!        │                           │
//!        ▼                           ▼
//!   recorder.stop() ──moves──► eliminate_common_subexpressions
//!                                    │
//!                                    ▼
//!                             ExpressionEmitter
//! ```
//!
//! # Example
//!
//! ```
//! use jetgraph::codegen::{ExpressionRecorder, eliminate_common_subexpressions};
//!
//! let recorder = ExpressionRecorder::start().unwrap();
//! let x = recorder.parameter("x[0]");
//! let y = recorder.parameter("x[1]");
//! let lhs = x * y;
//! let rhs = x * y;
//! recorder.output(lhs + rhs, "residual[0]");
//! let mut graph = recorder.stop();
//!
//! let report = eliminate_common_subexpressions(&mut graph);
//! assert_eq!(report.len(), 1);
//! assert_eq!(graph.live_nodes().count(), 5);
//! ```
//!
//! # Design Notes
//!
//! - Sessions are thread-scoped; the recorder value is the capability to
//!   record, and handles borrow it
//! - Operands always precede their users, so creation order is a
//!   topological order
//! - Overwrites are separate `Assignment` nodes, never in-place edits

mod emit;
mod expr_ref;
mod graph;
mod node;
mod optimize;
mod recorder;

pub use emit::{ExpressionEmitter, emit};
pub use expr_ref::ExprRef;
pub use graph::ExpressionGraph;
pub use node::{Arguments, ExpressionId, ExpressionKind, Node};
pub use optimize::{CseReport, eliminate_common_subexpressions};
pub use recorder::{ExpressionRecorder, start_recording, stop_recording};
