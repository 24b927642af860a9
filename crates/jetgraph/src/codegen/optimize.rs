//! Common subexpression elimination over a finished expression graph.
//!
//! ```text
//! // before                     // after
//! v_2 = v_0 + v_1;              v_2 = v_0 + v_1;
//! v_3 = v_0 + v_1;              // nop v_3
//! v_4 = v_3 * v_0;              v_4 = v_2 * v_0;
//! ```

use super::graph::ExpressionGraph;
use super::node::{Arguments, ExpressionId, ExpressionKind, Node};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Result of [`eliminate_common_subexpressions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CseReport {
    replacements: BTreeMap<ExpressionId, ExpressionId>,
}

impl CseReport {
    /// Earlier node that took over from `id`, if `id` was eliminated.
    pub fn replacement_for(&self, id: ExpressionId) -> Option<ExpressionId> {
        self.replacements.get(&id).copied()
    }

    /// The id to read instead of `id` after elimination. Use this on ids
    /// captured during recording, e.g. [`JetIds`](crate::jet::JetIds).
    pub fn resolve(&self, id: ExpressionId) -> ExpressionId {
        self.replacement_for(id).unwrap_or(id)
    }

    /// Eliminated ids with their replacements, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ExpressionId, ExpressionId)> + '_ {
        self.replacements.iter().map(|(&from, &to)| (from, to))
    }

    /// Number of eliminated nodes.
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

/// Hash key grouping nodes that may be replaceable by each other.
/// [`Node::is_replaceable_by`] has the final word.
#[derive(Debug, Hash, PartialEq, Eq)]
struct NodeKey {
    kind: ExpressionKind,
    name: String,
    value_bits: u64,
    args: Arguments,
}

impl NodeKey {
    fn of(node: &Node) -> Self {
        let value_bits = match node.kind() {
            // 0.0 == -0.0 must land in the same bucket.
            ExpressionKind::CompileTimeConstant if node.value() == 0.0 => 0.0f64.to_bits(),
            ExpressionKind::CompileTimeConstant => node.value().to_bits(),
            _ => 0,
        };
        let mut args: Arguments = node.args().iter().copied().collect();
        if is_commutative(node) {
            args.sort_unstable();
        }
        Self {
            kind: node.kind(),
            name: node.name().to_string(),
            value_bits,
            args,
        }
    }
}

/// `a + b` and `a * b`, whose operands may be swapped without changing
/// the result.
fn is_commutative(node: &Node) -> bool {
    node.kind() == ExpressionKind::BinaryArithmetic && matches!(node.name(), "+" | "*")
}

/// [`Node::is_replaceable_by`], extended to commutative operations with
/// swapped operands, e.g. `v_0 * v_1` and `v_1 * v_0`.
fn computes_same_value(node: &Node, earlier: &Node) -> bool {
    if node.is_replaceable_by(earlier) {
        return true;
    }
    is_commutative(node)
        && node.kind() == earlier.kind()
        && node.name() == earlier.name()
        && node.args().iter().rev().eq(earlier.args().iter())
}

/// Nodes whose value may be shared with an equivalent earlier node.
///
/// Writes are never shared, and neither is any slot that an assignment
/// overwrites later on: its value depends on where it is read.
fn is_candidate(node: &Node, overwritten: &HashSet<ExpressionId>) -> bool {
    let shareable_kind = match node.kind() {
        ExpressionKind::CompileTimeConstant => !node.value().is_nan(),
        ExpressionKind::Parameter
        | ExpressionKind::UnaryArithmetic
        | ExpressionKind::BinaryArithmetic
        | ExpressionKind::BinaryComparison
        | ExpressionKind::LogicalNegation
        | ExpressionKind::FunctionCall
        | ExpressionKind::Ternary => true,
        ExpressionKind::Assignment | ExpressionKind::OutputAssignment | ExpressionKind::Nop => {
            false
        }
    };
    shareable_kind && !overwritten.contains(&node.id())
}

/// Replace each redundant node by an earlier equivalent one.
///
/// Single pass in creation order. Operands are rewritten to their
/// replacements before a node is looked up, so chains of duplicates
/// collapse in one pass. Sums and products match regardless of operand
/// order, which folds the two cross terms of a jet's self-product. An eliminated node becomes a `Nop` and keeps its
/// position. Reads of a slot are only matched against reads that happened
/// after the slot's most recent assignment.
pub fn eliminate_common_subexpressions(graph: &mut ExpressionGraph) -> CseReport {
    let overwritten: HashSet<ExpressionId> = graph
        .iter()
        .filter(|node| node.kind() == ExpressionKind::Assignment)
        .map(Node::lhs_id)
        .collect();

    let mut seen: HashMap<NodeKey, ExpressionId> = HashMap::new();
    let mut report = CseReport::default();

    for index in 0..graph.size() {
        let id = ExpressionId::new(index);
        let node = graph.node_mut(id);
        for arg in node.args_mut().iter_mut() {
            if let Some(replacement) = report.replacement_for(*arg) {
                *arg = replacement;
            }
        }

        if node.kind() == ExpressionKind::Assignment {
            let slot = node.lhs_id();
            seen.retain(|key, _| !key.args.contains(&slot));
            continue;
        }
        if !is_candidate(node, &overwritten) {
            continue;
        }

        let key = NodeKey::of(node);
        match seen.get(&key) {
            Some(&earlier) if computes_same_value(&graph[id], &graph[earlier]) => {
                trace!("replacing {} by {}", graph[id], earlier);
                graph.node_mut(id).make_nop();
                report.replacements.insert(id, earlier);
            }
            Some(_) => {}
            None => {
                seen.insert(key, id);
            }
        }
    }

    debug!(
        "common subexpression elimination removed {} of {} expressions",
        report.len(),
        graph.size()
    );
    report
}
