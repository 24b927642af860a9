//! ExprRef - scalar handle whose arithmetic is recorded instead of evaluated.

use super::node::{ExpressionId, Node};
use super::recorder::ExpressionRecorder;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A traced scalar.
///
/// The handle names the node that currently holds its value. Every
/// operator application appends a new node to the recorder's graph and
/// returns a handle to it; existing nodes are never modified.
///
/// Handles are `Copy` and name a slot, not a value. Copies of a handle
/// alias the same slot, so after `let c = a; a += b;` reading `c` sees
/// the sum as well. Bind the result of `a + b` to a new handle to keep
/// the old value readable.
///
/// # Example
///
/// ```
/// use jetgraph::codegen::{ExpressionKind, ExpressionRecorder};
///
/// let recorder = ExpressionRecorder::start().unwrap();
/// let x = recorder.parameter("x[0]");
/// let y = x * 2.0 + 1.0;
/// let y_id = y.id();
/// let graph = recorder.stop();
///
/// // x, 2, x * 2, 1, (x * 2) + 1
/// assert_eq!(graph.size(), 5);
/// assert_eq!(graph[y_id].kind(), ExpressionKind::BinaryArithmetic);
/// assert_eq!(graph[y_id].name(), "+");
/// ```
#[derive(Clone, Copy)]
pub struct ExprRef<'r> {
    id: ExpressionId,
    recorder: &'r ExpressionRecorder,
}

impl<'r> ExprRef<'r> {
    pub(crate) fn new(id: ExpressionId, recorder: &'r ExpressionRecorder) -> Self {
        Self { id, recorder }
    }

    /// Get the id of the node holding this value.
    pub fn id(&self) -> ExpressionId {
        self.id
    }

    /// Recorder this handle belongs to.
    pub fn recorder(&self) -> &'r ExpressionRecorder {
        self.recorder
    }

    /// Record a literal in the same session.
    pub fn constant(&self, value: f64) -> Self {
        self.recorder.constant(value)
    }

    /// Overwrite this handle's slot with `value`.
    ///
    /// Records an assignment node whose `lhs_id` is this handle's id. The
    /// handle keeps naming the same slot, so later reads observe the new
    /// value. That includes reads through any copy of this handle.
    pub fn assign(&mut self, value: ExprRef<'r>) {
        self.check_same_recorder(&value);
        self.recorder.record(Node::assignment(self.id, value.id));
    }

    fn unary(self, op: &str) -> Self {
        self.recorder.handle(self.recorder.record(Node::unary_arithmetic(op, self.id)))
    }

    fn binary(self, op: &str, rhs: ExprRef<'r>) -> Self {
        self.check_same_recorder(&rhs);
        self.recorder
            .handle(self.recorder.record(Node::binary_arithmetic(op, self.id, rhs.id)))
    }

    fn compare(self, op: &str, rhs: ExprRef<'r>) -> Self {
        self.check_same_recorder(&rhs);
        self.recorder
            .handle(self.recorder.record(Node::binary_comparison(op, self.id, rhs.id)))
    }

    fn check_same_recorder(&self, other: &ExprRef<'r>) {
        debug_assert!(
            std::ptr::eq(self.recorder, other.recorder),
            "expression handles from different recording sessions"
        );
    }

    /// Record `self < rhs`.
    pub fn lt(self, rhs: ExprRef<'r>) -> Self {
        self.compare("<", rhs)
    }

    /// Record `self <= rhs`.
    pub fn le(self, rhs: ExprRef<'r>) -> Self {
        self.compare("<=", rhs)
    }

    /// Record `self > rhs`.
    pub fn gt(self, rhs: ExprRef<'r>) -> Self {
        self.compare(">", rhs)
    }

    /// Record `self >= rhs`.
    pub fn ge(self, rhs: ExprRef<'r>) -> Self {
        self.compare(">=", rhs)
    }

    /// Record `self == rhs`.
    pub fn eq_expr(self, rhs: ExprRef<'r>) -> Self {
        self.compare("==", rhs)
    }

    /// Record `self != rhs`.
    pub fn ne_expr(self, rhs: ExprRef<'r>) -> Self {
        self.compare("!=", rhs)
    }

    /// Record `!self` on a boolean-valued expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.recorder.handle(self.recorder.record(Node::logical_negation(self.id)))
    }
}

impl fmt::Debug for ExprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprRef").field("id", &self.id).finish()
    }
}

impl fmt::Display for ExprRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:literal) => {
        impl<'r> $trait for ExprRef<'r> {
            type Output = ExprRef<'r>;

            fn $method(self, rhs: ExprRef<'r>) -> ExprRef<'r> {
                self.binary($op, rhs)
            }
        }

        // Literal operands are recorded as constants first.
        impl<'r> $trait<f64> for ExprRef<'r> {
            type Output = ExprRef<'r>;

            fn $method(self, rhs: f64) -> ExprRef<'r> {
                let rhs = self.constant(rhs);
                self.binary($op, rhs)
            }
        }

        impl<'r> $trait<ExprRef<'r>> for f64 {
            type Output = ExprRef<'r>;

            fn $method(self, rhs: ExprRef<'r>) -> ExprRef<'r> {
                rhs.constant(self).binary($op, rhs)
            }
        }

        // `a op= b` is `a = a op b`: the result is written back into a's slot.
        impl<'r> $assign_trait for ExprRef<'r> {
            fn $assign_method(&mut self, rhs: ExprRef<'r>) {
                let value = self.binary($op, rhs);
                self.assign(value);
            }
        }

        impl $assign_trait<f64> for ExprRef<'_> {
            fn $assign_method(&mut self, rhs: f64) {
                let rhs = self.constant(rhs);
                let value = self.binary($op, rhs);
                self.assign(value);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, "+");
impl_binary_op!(Sub, sub, SubAssign, sub_assign, "-");
impl_binary_op!(Mul, mul, MulAssign, mul_assign, "*");
impl_binary_op!(Div, div, DivAssign, div_assign, "/");

impl<'r> Neg for ExprRef<'r> {
    type Output = ExprRef<'r>;

    fn neg(self) -> ExprRef<'r> {
        self.unary("-")
    }
}
