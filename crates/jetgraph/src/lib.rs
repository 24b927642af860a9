//! jetgraph - expression recording for automatic differentiation code generation
//!
//! Scalar arithmetic on traced handles is recorded into an expression graph
//! rather than evaluated. Combined with forward-mode dual numbers ([`jet`]),
//! the recorded graph computes a function together with its derivatives and
//! can be deduplicated and handed to a code emitter.
//!
//! # Architecture
//!
//! ```text
//! Jet<T, N>            (forward-mode rules, generic over Scalar)
//!     │
//!     ▼
//! Scalar ── f64 / f32  (evaluate immediately)
//!     │
//!     └──── ExprRef    (record a node per operation)
//!                │
//!                ▼
//!          ExpressionRecorder → ExpressionGraph → CSE → ExpressionEmitter
//! ```
//!
//! # Example
//!
//! ```
//! use jetgraph::codegen::{ExpressionKind, ExpressionRecorder};
//! use jetgraph::jet::Jet;
//!
//! let recorder = ExpressionRecorder::start().unwrap();
//! let a = Jet::<_, 1>::new(recorder.constant(2.0), 0).unwrap();
//! let b = a * a;
//! let ids = b.ids();
//! let graph = recorder.stop();
//!
//! assert_eq!(graph.size(), 8);
//! assert_eq!(graph[ids.primal].name(), "*");
//! assert_eq!(graph[ids.derivatives[0]].name(), "+");
//! assert_eq!(graph.nodes()[3].kind(), ExpressionKind::Assignment);
//! ```

pub mod codegen;
pub mod error;
#[cfg(feature = "jet")]
pub mod jet;
pub mod scalar;

pub use codegen::{ExprRef, ExpressionGraph, ExpressionId, ExpressionRecorder};
pub use error::ExprError;
#[cfg(feature = "jet")]
pub use jet::{Jet, JetIds};
pub use scalar::Scalar;
