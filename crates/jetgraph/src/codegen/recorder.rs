//! Recording session that owns the graph while arithmetic is traced.
//!
//! # Example
//!
//! ```
//! use jetgraph::codegen::ExpressionRecorder;
//!
//! let recorder = ExpressionRecorder::start().unwrap();
//! let a = recorder.constant(2.0);
//! let b = recorder.constant(3.0);
//! let c = a + b;
//! let (a_id, c_id) = (a.id(), c.id());
//!
//! let graph = recorder.stop();
//! assert_eq!(graph.size(), 3);
//! assert!(graph[c_id].directly_depends_on(a_id));
//! ```

use super::expr_ref::ExprRef;
use super::graph::ExpressionGraph;
use super::node::{ExpressionId, Node};
use crate::error::ExprError;
use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug};
use std::marker::PhantomData;

thread_local! {
    static SESSION_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// An active recording session.
///
/// Holding an `ExpressionRecorder` is the capability to record: every
/// [`ExprRef`] borrows the recorder that created it, so traced arithmetic
/// cannot outlive the session and [`stop`](Self::stop) can only be called
/// once. At most one recorder exists per thread at a time.
///
/// The recorder stays on the thread that started it, since the session
/// flag it clears on drop is per thread:
///
/// ```compile_fail
/// use jetgraph::codegen::ExpressionRecorder;
///
/// let recorder = ExpressionRecorder::start().unwrap();
/// std::thread::spawn(move || recorder.stop());
/// ```
pub struct ExpressionRecorder {
    graph: RefCell<ExpressionGraph>,
    _not_send: PhantomData<*const ()>,
}

impl ExpressionRecorder {
    /// Begin recording into a fresh, empty graph.
    ///
    /// # Errors
    /// Returns [`ExprError::SessionAlreadyActive`] if this thread is
    /// already recording. Sessions do not nest.
    pub fn start() -> Result<Self, ExprError> {
        SESSION_ACTIVE.with(|active| {
            if active.replace(true) {
                return Err(ExprError::SessionAlreadyActive);
            }
            debug!("started expression recording");
            Ok(Self {
                graph: RefCell::new(ExpressionGraph::new()),
                _not_send: PhantomData,
            })
        })
    }

    /// End the session and take ownership of the recorded graph.
    pub fn stop(self) -> ExpressionGraph {
        let graph = self.graph.take();
        debug!("stopped expression recording with {} expressions", graph.size());
        graph
    }

    /// Check whether a session is active on the current thread.
    pub fn is_recording() -> bool {
        SESSION_ACTIVE.with(Cell::get)
    }

    /// Number of nodes recorded so far.
    pub fn len(&self) -> usize {
        self.graph.borrow().size()
    }

    /// Check if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.graph.borrow().is_empty()
    }

    /// The single path through which a graph grows.
    pub(crate) fn record(&self, node: Node) -> ExpressionId {
        let mut graph = self.graph.borrow_mut();
        let id = graph.push(node);
        trace!("recorded {}", graph[id]);
        id
    }

    pub(crate) fn handle(&self, id: ExpressionId) -> ExprRef<'_> {
        ExprRef::new(id, self)
    }

    /// Record a compile-time constant.
    pub fn constant(&self, value: f64) -> ExprRef<'_> {
        self.handle(self.record(Node::compile_time_constant(value)))
    }

    /// Record a read of a runtime input, e.g. `"x[0]"`.
    pub fn parameter(&self, name: impl Into<String>) -> ExprRef<'_> {
        self.handle(self.record(Node::parameter(name)))
    }

    /// Mark `value` as a named result of the traced function.
    pub fn output(&self, value: ExprRef<'_>, name: impl Into<String>) -> ExpressionId {
        self.record(Node::output_assignment(value.id(), name))
    }

    /// Record a call of an external function. No derivative rule is
    /// attached; the emitter only sees the call.
    pub fn call(&self, name: impl Into<String>, args: &[ExprRef<'_>]) -> ExprRef<'_> {
        let ids: Vec<ExpressionId> = args.iter().map(ExprRef::id).collect();
        self.handle(self.record(Node::function_call(name, &ids)))
    }

    /// Record `condition ? if_true : if_false`.
    pub fn ternary(
        &self,
        condition: ExprRef<'_>,
        if_true: ExprRef<'_>,
        if_false: ExprRef<'_>,
    ) -> ExprRef<'_> {
        self.handle(self.record(Node::ternary(
            condition.id(),
            if_true.id(),
            if_false.id(),
        )))
    }
}

impl Drop for ExpressionRecorder {
    fn drop(&mut self) {
        SESSION_ACTIVE.with(|active| active.set(false));
    }
}

impl Debug for ExpressionRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionRecorder")
            .field("num_nodes", &self.len())
            .finish()
    }
}

/// Begin a recording session on the current thread.
pub fn start_recording() -> Result<ExpressionRecorder, ExprError> {
    ExpressionRecorder::start()
}

/// End a recording session, returning the graph it built.
pub fn stop_recording(recorder: ExpressionRecorder) -> ExpressionGraph {
    recorder.stop()
}
