//! Reference interpreter used to check that recorded graphs compute what
//! the plain-number arithmetic computes.

#![allow(dead_code)]

use jetgraph::ExprError;
use jetgraph::codegen::{ExpressionEmitter, ExpressionGraph, ExpressionId, ExpressionKind};
use std::collections::HashMap;

/// Executes the statements a graph describes, in id order.
#[derive(Debug, Default)]
pub struct Interpreter {
    pub inputs: HashMap<String, f64>,
}

/// Slot contents and named outputs after running a graph.
#[derive(Debug)]
pub struct Evaluation {
    slots: Vec<f64>,
    pub outputs: HashMap<String, f64>,
}

impl Evaluation {
    pub fn value(&self, id: ExpressionId) -> f64 {
        self.slots[id.index()]
    }
}

impl Interpreter {
    pub fn with_inputs(inputs: &[(&str, f64)]) -> Self {
        Self {
            inputs: inputs.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

impl ExpressionEmitter for Interpreter {
    type Output = Evaluation;

    fn emit(&mut self, graph: &ExpressionGraph) -> Result<Evaluation, ExprError> {
        let mut slots = vec![f64::NAN; graph.size()];
        let mut outputs = HashMap::new();

        for node in graph.live_nodes() {
            let arg = |i: usize| slots[node.args()[i].index()];
            let value = match node.kind() {
                ExpressionKind::CompileTimeConstant => node.value(),
                ExpressionKind::Parameter => {
                    *self.inputs.get(node.name()).ok_or_else(|| ExprError::Emit {
                        message: format!("missing input {}", node.name()),
                    })?
                }
                ExpressionKind::Assignment => arg(0),
                ExpressionKind::OutputAssignment => {
                    outputs.insert(node.name().to_string(), arg(0));
                    continue;
                }
                ExpressionKind::UnaryArithmetic => -arg(0),
                ExpressionKind::BinaryArithmetic => match node.name() {
                    "+" => arg(0) + arg(1),
                    "-" => arg(0) - arg(1),
                    "*" => arg(0) * arg(1),
                    "/" => arg(0) / arg(1),
                    op => {
                        return Err(ExprError::Emit {
                            message: format!("unknown operator {op}"),
                        });
                    }
                },
                ExpressionKind::BinaryComparison => match node.name() {
                    "<" => truth(arg(0) < arg(1)),
                    "<=" => truth(arg(0) <= arg(1)),
                    ">" => truth(arg(0) > arg(1)),
                    ">=" => truth(arg(0) >= arg(1)),
                    "==" => truth(arg(0) == arg(1)),
                    _ => truth(arg(0) != arg(1)),
                },
                ExpressionKind::LogicalNegation => truth(arg(0) == 0.0),
                ExpressionKind::FunctionCall => match node.name() {
                    "sin" => arg(0).sin(),
                    "cos" => arg(0).cos(),
                    "sqrt" => arg(0).sqrt(),
                    name => {
                        return Err(ExprError::Emit {
                            message: format!("unknown function {name}"),
                        });
                    }
                },
                ExpressionKind::Ternary => {
                    if arg(0) != 0.0 {
                        arg(1)
                    } else {
                        arg(2)
                    }
                }
                ExpressionKind::Nop => continue,
            };
            slots[node.lhs_id().index()] = value;
        }

        Ok(Evaluation { slots, outputs })
    }
}
