//! Append-only expression graph produced by a recording session.

use super::node::{ExpressionId, Node};
use crate::error::ExprError;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::ops::Index;

/// The nodes recorded during one session, indexed by [`ExpressionId`].
///
/// Operands always point backwards, so creation order is a topological
/// order. After the session ends the only mutation is
/// [`eliminate_common_subexpressions`](super::eliminate_common_subexpressions),
/// which never removes positions.
#[derive(Clone, Default, PartialEq)]
pub struct ExpressionGraph {
    nodes: Vec<Node>,
}

impl ExpressionGraph {
    /// Create a new empty expression graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a detached node and return its id.
    pub(crate) fn push(&mut self, mut node: Node) -> ExpressionId {
        let id = ExpressionId::new(self.nodes.len());
        node.attach(id);
        debug_assert!(
            node.args().iter().all(|arg| arg.index() < id.index()),
            "operands of {id} must be recorded before it"
        );
        self.nodes.push(node);
        id
    }

    /// Get node by ID, or `None` for ids this graph never produced.
    pub fn get(&self, id: ExpressionId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get node by ID.
    ///
    /// # Errors
    /// Returns [`ExprError::InvalidExpressionId`] for [`ExpressionId::INVALID`]
    /// and ids past the end of the graph.
    pub fn try_expression_for_id(&self, id: ExpressionId) -> Result<&Node, ExprError> {
        self.get(id).ok_or(ExprError::InvalidExpressionId {
            id,
            size: self.nodes.len(),
        })
    }

    /// Get node by ID.
    ///
    /// # Panics
    /// Panics on an id this graph never produced. Such an id means the
    /// trace was built incorrectly upstream.
    pub fn expression_for_id(&self, id: ExpressionId) -> &Node {
        match self.try_expression_for_id(id) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: ExpressionId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of recorded nodes, including eliminated ones.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Same as [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Nodes an emitter has to translate, in creation order.
    pub fn live_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| !node.is_nop())
    }

    /// Check the structural invariants every consumer relies on: each node
    /// sits at its own position and references only earlier positions.
    pub fn validate(&self) -> Result<(), ExprError> {
        for (position, node) in self.nodes.iter().enumerate() {
            if node.id().index() != position {
                return Err(ExprError::MisplacedExpression {
                    position,
                    id: node.id(),
                });
            }
            let lhs = node.lhs_id();
            if !lhs.is_valid() || lhs.index() > position {
                return Err(ExprError::ForwardReference {
                    id: node.id(),
                    reference: lhs,
                });
            }
            if let Some(&arg) = node.args().iter().find(|arg| arg.index() >= position) {
                return Err(ExprError::ForwardReference {
                    id: node.id(),
                    reference: arg,
                });
            }
        }
        Ok(())
    }

    /// Build the data-flow graph of the trace.
    ///
    /// Node `i` of the result is expression `v_i`. Edges run from the node
    /// that last wrote an operand's slot to its reader, so a read of a slot
    /// that was overwritten depends on the assignment rather than the
    /// original value. An assignment additionally depends on the previous
    /// writer of its slot.
    pub fn dependency_graph(&self) -> DiGraph<ExpressionId, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len() * 2);
        for node in &self.nodes {
            graph.add_node(node.id());
        }

        let mut last_writer: HashMap<ExpressionId, ExpressionId> = HashMap::new();
        for node in &self.nodes {
            let target = NodeIndex::new(node.id().index());
            for &arg in node.args() {
                let writer = last_writer.get(&arg).copied().unwrap_or(arg);
                graph.add_edge(NodeIndex::new(writer.index()), target, ());
            }
            if node.lhs_id() != node.id() {
                let previous = last_writer.get(&node.lhs_id()).copied().unwrap_or(node.lhs_id());
                graph.add_edge(NodeIndex::new(previous.index()), target, ());
                last_writer.insert(node.lhs_id(), node.id());
            }
        }
        graph
    }

    /// True iff the value of `node` is influenced by `on`, directly or
    /// through intermediate nodes.
    pub fn depends_on(&self, node: ExpressionId, on: ExpressionId) -> Result<bool, ExprError> {
        self.try_expression_for_id(node)?;
        self.try_expression_for_id(on)?;
        if node == on {
            return Ok(false);
        }
        let graph = self.dependency_graph();
        Ok(has_path_connecting(
            &graph,
            NodeIndex::new(on.index()),
            NodeIndex::new(node.index()),
            None,
        ))
    }
}

impl Index<ExpressionId> for ExpressionGraph {
    type Output = Node;

    fn index(&self, id: ExpressionId) -> &Node {
        self.expression_for_id(id)
    }
}

impl Debug for ExpressionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionGraph")
            .field("num_nodes", &self.nodes.len())
            .field("num_live", &self.live_nodes().count())
            .finish()
    }
}

impl fmt::Display for ExpressionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.live_nodes() {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}
