//! Integration tests for expression recording and graph queries.

mod common;

use approx::assert_relative_eq;
use common::Interpreter;
use jetgraph::ExprError;
use jetgraph::codegen::{
    ExpressionId, ExpressionRecorder, emit, eliminate_common_subexpressions,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_is_arithmetic() {
    let recorder = ExpressionRecorder::start().unwrap();
    let a = recorder.constant(2.0);
    let b = recorder.constant(3.0);
    let c = a + b;
    let d = c + a;
    let ids = [a.id(), b.id(), c.id(), d.id()];
    let graph = recorder.stop();

    for id in ids {
        assert!(graph.expression_for_id(id).is_arithmetic_expression());
    }
}

#[test]
fn test_calls_and_ternaries_are_arithmetic() {
    let recorder = ExpressionRecorder::start().unwrap();
    let x = recorder.parameter("x");
    let y = recorder.parameter("y");
    let s = recorder.call("sin", &[x]);
    let cond = x.lt(y);
    let pick = recorder.ternary(cond, s, y);
    let flipped = cond.not();
    let out = recorder.output(pick, "out");
    let [s, cond, pick, flipped] = [s.id(), cond.id(), pick.id(), flipped.id()];
    let graph = recorder.stop();

    assert!(graph[s].is_arithmetic_expression());
    assert!(graph[pick].is_arithmetic_expression());
    assert!(!graph[cond].is_arithmetic_expression());
    assert!(!graph[flipped].is_arithmetic_expression());
    assert!(!graph[out].is_arithmetic_expression());
}

#[test]
fn test_is_compile_time_constant_and_equal_to() {
    let recorder = ExpressionRecorder::start().unwrap();
    let a = recorder.constant(2.0);
    let b = recorder.constant(3.0);
    let c = a + b;
    let [a, b, c] = [a.id(), b.id(), c.id()];
    let graph = recorder.stop();

    assert!(graph[a].is_compile_time_constant_and_equal_to(2.0));
    assert!(!graph[a].is_compile_time_constant_and_equal_to(0.0));
    assert!(graph[b].is_compile_time_constant_and_equal_to(3.0));
    assert!(!graph[c].is_compile_time_constant_and_equal_to(0.0));
}

#[test]
fn test_is_replaceable_by() {
    let recorder = ExpressionRecorder::start().unwrap();
    // a2 is replaceable by a
    let a = recorder.constant(2.0);
    let b = recorder.constant(3.0);
    let a2 = recorder.constant(2.0);
    // two redundant sums: d is replaceable by c
    let c = a + b;
    let d = a + b;
    let [a, a2, c, d] = [a.id(), a2.id(), c.id(), d.id()];
    let graph = recorder.stop();

    assert!(graph[a2].is_replaceable_by(&graph[a]));
    assert!(graph[d].is_replaceable_by(&graph[c]));
    assert!(!graph[d].is_replaceable_by(&graph[a2]));
}

#[test]
fn test_directly_depends_on() {
    let recorder = ExpressionRecorder::start().unwrap();
    let unused = recorder.constant(6.0);
    let a = recorder.constant(2.0);
    let b = recorder.constant(3.0);
    let c = a + b;
    let d = c + a;
    let [unused, a, b, c, d] = [unused.id(), a.id(), b.id(), c.id(), d.id()];
    let graph = recorder.stop();

    assert!(!graph[a].directly_depends_on(unused));
    assert!(!graph[b].directly_depends_on(unused));
    assert!(graph[c].directly_depends_on(a));
    assert!(graph[c].directly_depends_on(b));
    assert!(graph[d].directly_depends_on(a));
    assert!(!graph[d].directly_depends_on(b));
    assert!(graph[d].directly_depends_on(c));

    // b still reaches d through c.
    assert!(graph.depends_on(d, b).unwrap());
    assert!(!graph.depends_on(d, unused).unwrap());
}

#[test]
fn test_depends_on_rejects_unknown_ids() {
    let recorder = ExpressionRecorder::start().unwrap();
    let a = recorder.constant(1.0).id();
    let graph = recorder.stop();

    assert_eq!(
        graph.depends_on(a, ExpressionId::INVALID),
        Err(ExprError::InvalidExpressionId {
            id: ExpressionId::INVALID,
            size: 1
        })
    );
}

#[test]
#[should_panic(expected = "invalid expression id")]
fn test_invalid_sentinel_lookup_panics() {
    let recorder = ExpressionRecorder::start().unwrap();
    recorder.constant(1.0);
    let graph = recorder.stop();
    let _ = &graph[ExpressionId::INVALID];
}

#[test]
fn test_equal_constants_are_mutually_replaceable() {
    let mut rng = StdRng::seed_from_u64(7);
    let recorder = ExpressionRecorder::start().unwrap();

    let literals: Vec<f64> = (0..8).map(|_| rng.random_range(-10.0..10.0)).collect();
    let mut ids = Vec::new();
    for &value in &literals {
        ids.push((value, recorder.constant(value).id()));
        // Unrelated noise between the constants.
        let noise = recorder.parameter("p");
        let _ = noise * noise;
    }
    // Same literals again in reverse order.
    for &value in literals.iter().rev() {
        ids.push((value, recorder.constant(value).id()));
    }
    let graph = recorder.stop();

    for &(value, id) in &ids {
        for &(other_value, other_id) in &ids {
            if id == other_id {
                continue;
            }
            let expected = value == other_value;
            assert_eq!(graph[id].is_replaceable_by(&graph[other_id]), expected);
            assert_eq!(graph[other_id].is_replaceable_by(&graph[id]), expected);
        }
    }
}

#[test]
fn test_binary_node_depends_only_on_operands() {
    let recorder = ExpressionRecorder::start().unwrap();
    let x = recorder.parameter("x");
    let y = recorder.parameter("y");
    let z = recorder.parameter("z");
    let xy = x * y;
    let w = xy - z;
    let all = [x.id(), y.id(), z.id(), xy.id(), w.id()];
    let graph = recorder.stop();

    let w_node = &graph[all[4]];
    for id in all {
        let expected = w_node.args().contains(&id);
        assert_eq!(w_node.directly_depends_on(id), expected);
    }
    assert!(!w_node.directly_depends_on(all[0]));
    assert!(graph.depends_on(all[4], all[0]).unwrap());
}

#[test]
fn test_round_trip_through_interpreter() {
    let recorder = ExpressionRecorder::start().unwrap();
    let x = recorder.parameter("x");
    let y = recorder.parameter("y");
    let r = (x * y + 2.0) / (x - y);
    let s = recorder.call("sqrt", &[x * x + y * y]);
    let m = recorder.ternary(x.gt(y), x, y);
    let n = x.le(y).not();
    recorder.output(r, "r");
    recorder.output(s, "s");
    recorder.output(m, "max");
    recorder.output(n, "x_gt_y");
    let mut graph = recorder.stop();

    let (xv, yv) = (3.0, 1.5);
    let mut interpreter = Interpreter::with_inputs(&[("x", xv), ("y", yv)]);
    let before = emit(&graph, &mut interpreter).unwrap();
    assert_relative_eq!(before.outputs["r"], (xv * yv + 2.0) / (xv - yv), epsilon = 1e-14);
    assert_relative_eq!(before.outputs["s"], (xv * xv + yv * yv).sqrt(), epsilon = 1e-14);
    assert_eq!(before.outputs["max"], xv);
    assert_eq!(before.outputs["x_gt_y"], 1.0);

    eliminate_common_subexpressions(&mut graph);
    let after = emit(&graph, &mut interpreter).unwrap();
    assert_eq!(before.outputs, after.outputs);
}

#[test]
fn test_copied_handle_reads_compound_assignment() {
    let recorder = ExpressionRecorder::start().unwrap();
    let mut a = recorder.parameter("x");
    let b = recorder.constant(3.0);
    let kept = a + 0.0;
    let alias = a;
    a += b;
    recorder.output(alias, "alias");
    recorder.output(kept, "kept");
    recorder.output(a, "a");
    let graph = recorder.stop();

    let result = emit(&graph, &mut Interpreter::with_inputs(&[("x", 2.0)])).unwrap();
    assert_eq!(result.outputs["alias"], 5.0);
    assert_eq!(result.outputs["a"], 5.0);
    assert_eq!(result.outputs["kept"], 2.0);
}

#[test]
fn test_missing_input_is_reported() {
    let recorder = ExpressionRecorder::start().unwrap();
    recorder.parameter("x");
    let graph = recorder.stop();

    let result = emit(&graph, &mut Interpreter::default());
    assert!(matches!(result, Err(ExprError::Emit { .. })));
}
