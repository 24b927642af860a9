//! Node model of the expression graph.

use smallvec::SmallVec;
use std::fmt;

/// Position of a node in an [`ExpressionGraph`](super::ExpressionGraph).
///
/// Ids are handed out in creation order starting at 0 and are only
/// meaningful inside the graph that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionId(usize);

impl ExpressionId {
    /// Sentinel for "no expression".
    pub const INVALID: ExpressionId = ExpressionId(usize::MAX);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Check whether this is a real position rather than [`Self::INVALID`].
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "v_{}", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}

/// Operand list of a node. No recorded kind takes more than three operands.
pub type Arguments = SmallVec<[ExpressionId; 3]>;

/// The operation a node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// Literal known when the code is generated, e.g. `v_0 = 3.2;`
    CompileTimeConstant,
    /// Value read from a runtime input, e.g. `v_0 = x[1];`
    Parameter,
    /// Named result of the traced function, e.g. `residual[0] = v_5;`
    OutputAssignment,
    /// Overwrite of an earlier slot, e.g. `v_1 = v_2;`
    Assignment,
    /// e.g. `v_1 = -v_0;`
    UnaryArithmetic,
    /// e.g. `v_2 = v_0 * v_1;`
    BinaryArithmetic,
    /// Boolean-valued, e.g. `v_2 = v_0 < v_1;`
    BinaryComparison,
    /// e.g. `v_1 = !v_0;`
    LogicalNegation,
    /// e.g. `v_1 = sin(v_0);`
    FunctionCall,
    /// e.g. `v_3 = v_0 ? v_1 : v_2;`
    Ternary,
    /// Eliminated node. Keeps its position so ids stay stable.
    Nop,
}

/// One recorded operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: ExpressionId,
    kind: ExpressionKind,
    lhs_id: ExpressionId,
    value: f64,
    name: String,
    args: Arguments,
}

impl Node {
    fn detached(kind: ExpressionKind, name: impl Into<String>, args: Arguments) -> Self {
        Self {
            id: ExpressionId::INVALID,
            kind,
            lhs_id: ExpressionId::INVALID,
            value: 0.0,
            name: name.into(),
            args,
        }
    }

    pub(crate) fn compile_time_constant(value: f64) -> Self {
        Self {
            value,
            ..Self::detached(ExpressionKind::CompileTimeConstant, "", Arguments::new())
        }
    }

    pub(crate) fn parameter(name: impl Into<String>) -> Self {
        Self::detached(ExpressionKind::Parameter, name, Arguments::new())
    }

    pub(crate) fn output_assignment(value: ExpressionId, name: impl Into<String>) -> Self {
        Self::detached(ExpressionKind::OutputAssignment, name, smallvec_of(&[value]))
    }

    pub(crate) fn assignment(lhs: ExpressionId, rhs: ExpressionId) -> Self {
        Self {
            lhs_id: lhs,
            ..Self::detached(ExpressionKind::Assignment, "", smallvec_of(&[rhs]))
        }
    }

    pub(crate) fn unary_arithmetic(op: &str, arg: ExpressionId) -> Self {
        Self::detached(ExpressionKind::UnaryArithmetic, op, smallvec_of(&[arg]))
    }

    pub(crate) fn binary_arithmetic(op: &str, lhs: ExpressionId, rhs: ExpressionId) -> Self {
        Self::detached(ExpressionKind::BinaryArithmetic, op, smallvec_of(&[lhs, rhs]))
    }

    pub(crate) fn binary_comparison(op: &str, lhs: ExpressionId, rhs: ExpressionId) -> Self {
        Self::detached(ExpressionKind::BinaryComparison, op, smallvec_of(&[lhs, rhs]))
    }

    pub(crate) fn logical_negation(arg: ExpressionId) -> Self {
        Self::detached(ExpressionKind::LogicalNegation, "!", smallvec_of(&[arg]))
    }

    pub(crate) fn function_call(name: impl Into<String>, args: &[ExpressionId]) -> Self {
        Self::detached(ExpressionKind::FunctionCall, name, args.iter().copied().collect())
    }

    pub(crate) fn ternary(
        condition: ExpressionId,
        if_true: ExpressionId,
        if_false: ExpressionId,
    ) -> Self {
        Self::detached(
            ExpressionKind::Ternary,
            "?:",
            smallvec_of(&[condition, if_true, if_false]),
        )
    }

    /// Give a detached node its position. Every kind except assignments
    /// writes its own slot.
    pub(crate) fn attach(&mut self, id: ExpressionId) {
        self.id = id;
        if self.kind != ExpressionKind::Assignment {
            self.lhs_id = id;
        }
    }

    /// Get node ID.
    pub fn id(&self) -> ExpressionId {
        self.id
    }

    pub fn kind(&self) -> ExpressionKind {
        self.kind
    }

    /// Slot written by this node.
    pub fn lhs_id(&self) -> ExpressionId {
        self.lhs_id
    }

    /// Literal payload. Only meaningful for compile-time constants.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Operator symbol, function name, parameter name or output name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ExpressionId] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut Arguments {
        &mut self.args
    }

    /// True for nodes that produce a numeric scalar. Comparisons and
    /// negations yield booleans; outputs and nops produce nothing.
    pub fn is_arithmetic_expression(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::CompileTimeConstant
                | ExpressionKind::Parameter
                | ExpressionKind::Assignment
                | ExpressionKind::UnaryArithmetic
                | ExpressionKind::BinaryArithmetic
                | ExpressionKind::FunctionCall
                | ExpressionKind::Ternary
        )
    }

    /// True iff this is a compile-time constant holding exactly `value`.
    pub fn is_compile_time_constant_and_equal_to(&self, value: f64) -> bool {
        self.kind == ExpressionKind::CompileTimeConstant && self.value == value
    }

    /// True iff `id` is one of this node's operands. Does not follow
    /// operands transitively; see
    /// [`ExpressionGraph::depends_on`](super::ExpressionGraph::depends_on).
    pub fn directly_depends_on(&self, id: ExpressionId) -> bool {
        self.args.contains(&id)
    }

    /// Check whether `other` computes the same value, so that consumers of
    /// `self` could read `other` instead.
    ///
    /// Constants compare by literal only. Everything else needs the same
    /// kind, name and operands in the same order. Assignments must also
    /// target the same slot.
    pub fn is_replaceable_by(&self, other: &Node) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            ExpressionKind::CompileTimeConstant => self.value == other.value,
            ExpressionKind::Assignment => {
                self.lhs_id == other.lhs_id && self.args == other.args
            }
            _ => self.name == other.name && self.args == other.args,
        }
    }

    pub fn is_nop(&self) -> bool {
        self.kind == ExpressionKind::Nop
    }

    /// Turn this node into a `Nop`, dropping its operands.
    pub fn make_nop(&mut self) {
        self.kind = ExpressionKind::Nop;
        self.lhs_id = self.id;
        self.value = 0.0;
        self.name.clear();
        self.args.clear();
    }
}

fn smallvec_of(ids: &[ExpressionId]) -> Arguments {
    ids.iter().copied().collect()
}

/// Renders the node as a C-like statement, for logs and debugging.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lhs = self.lhs_id;
        match self.kind {
            ExpressionKind::CompileTimeConstant => write!(f, "{lhs} = {:?};", self.value),
            ExpressionKind::Parameter => write!(f, "{lhs} = {};", self.name),
            ExpressionKind::OutputAssignment => write!(f, "{} = {};", self.name, self.args[0]),
            ExpressionKind::Assignment => write!(f, "{lhs} = {};", self.args[0]),
            ExpressionKind::UnaryArithmetic => write!(f, "{lhs} = {}{};", self.name, self.args[0]),
            ExpressionKind::BinaryArithmetic | ExpressionKind::BinaryComparison => write!(
                f,
                "{lhs} = {} {} {};",
                self.args[0], self.name, self.args[1]
            ),
            ExpressionKind::LogicalNegation => write!(f, "{lhs} = !{};", self.args[0]),
            ExpressionKind::FunctionCall => {
                write!(f, "{lhs} = {}(", self.name)?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ");")
            }
            ExpressionKind::Ternary => write!(
                f,
                "{lhs} = {} ? {} : {};",
                self.args[0], self.args[1], self.args[2]
            ),
            ExpressionKind::Nop => write!(f, "// nop {lhs}"),
        }
    }
}
