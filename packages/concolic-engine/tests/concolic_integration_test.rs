//! End-to-end concolic runs: hooks driven by a concrete interpreter, then
//! exploration of the recorded decisions.

mod common;

use common::*;
use concolic_engine::features::environment::domain::heap::STRING_CLASS;
use concolic_engine::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn config() -> ConcolicConfig {
    ConcolicConfig::default()
}

fn string_ref(id: u64, text: &str) -> ConcreteValue {
    ConcreteValue::Ref(ObjectHandle::new(id, STRING_CLASS).with_snapshot(text))
}

fn key(owner: &str, name: &str, desc: &str) -> FunctionKey {
    FunctionKey::parse(owner, name, desc).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// Shadowed library calls
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_abs_of_symbolic_input() {
    let mut i = ShadowInterpreter::new(&config());
    i.method_begin(&MethodId::new("Test", "run"), 1).unwrap();
    i.introduce_input(InputKind::Int, ConcreteValue::Int(-7)).unwrap();

    let abs = key("java/lang/Math", "abs", "(I)I");
    i.invoke(&abs, false).unwrap();
    i.call_result(&abs, Some(ConcreteValue::Int(7))).unwrap();

    let top = i.env().peek(0).unwrap();
    assert_eq!(top.concrete, ConcreteValue::Int(7));
    assert!(top.is_symbolic());
    let expr = top.symbolic.as_ref().unwrap();
    assert_eq!(expr.to_string(), "abs(var0)");
    assert_eq!(expr.concrete_value(), &Value::Int(7));
    assert_eq!(expr.operator(), Some(Operator::Abs));

    let result = i.finish();
    assert_eq!(result.variables.len(), 1);
    assert_eq!(result.variables[0].initial, Value::Int(-7));
}

#[test]
fn test_concrete_string_call_passes_through() {
    let mut i = ShadowInterpreter::new(&config());
    i.method_begin(&MethodId::new("Test", "run"), 1).unwrap();
    i.push_constant(string_ref(1, "abc")).unwrap();
    i.push_constant(string_ref(2, "a")).unwrap();

    let starts = key("java/lang/String", "startsWith", "(Ljava/lang/String;)Z");
    i.invoke(&starts, true).unwrap();
    i.call_result(&starts, Some(ConcreteValue::Int(1))).unwrap();

    let top = i.env().peek(0).unwrap();
    assert_eq!(top.concrete, ConcreteValue::Int(1));
    assert!(top.symbolic.is_none());
    assert!(i.env().heap().is_empty());

    // A branch on the concrete result records nothing
    i.branch_zero(BranchSite::new("Test", "run", 0), Comparator::Eq)
        .unwrap();
    let result = i.finish();
    assert!(result.path_condition.is_empty());
    assert!(result.variables.is_empty());
}

#[test]
fn test_reused_identity_drops_stale_contents() {
    let mut i = ShadowInterpreter::new(&config());
    i.method_begin(&MethodId::new("Test", "run"), 2).unwrap();
    let concat = key(
        "java/lang/String",
        "concat",
        "(Ljava/lang/String;)Ljava/lang/String;",
    );

    // input.concat("c") binds object 2 to a symbolic string
    i.introduce_input(InputKind::String, string_ref(1, "ab"))
        .unwrap();
    i.push_constant(string_ref(3, "c")).unwrap();
    i.invoke(&concat, true).unwrap();
    i.call_result(&concat, Some(string_ref(2, "abc"))).unwrap();
    assert_eq!(i.env().heap().symbolic_entries(), 2);
    i.pop().unwrap();

    // Object 2 is collected and its identity reused by a concrete concat
    i.push_constant(string_ref(4, "x")).unwrap();
    i.push_constant(string_ref(5, "y")).unwrap();
    i.invoke(&concat, true).unwrap();
    i.call_result(&concat, Some(string_ref(2, "xy"))).unwrap();
    assert_eq!(i.env().heap().symbolic_entries(), 1);

    // Repeating the concrete call changes nothing
    i.pop().unwrap();
    i.push_constant(string_ref(4, "x")).unwrap();
    i.push_constant(string_ref(5, "y")).unwrap();
    i.invoke(&concat, true).unwrap();
    i.call_result(&concat, Some(string_ref(2, "xy"))).unwrap();
    assert_eq!(i.env().heap().symbolic_entries(), 1);
    assert!(i.env().value_of(&ObjectHandle::new(2, STRING_CLASS).with_snapshot("xy"))
        .is_some_and(|e| !e.contains_symbolic_variable()));
}

#[test]
fn test_string_equals_boxed_number_is_not_a_condition() {
    let mut i = ShadowInterpreter::new(&config());
    i.method_begin(&MethodId::new("Test", "run"), 2).unwrap();
    i.introduce_input(InputKind::String, string_ref(1, "abc"))
        .unwrap();
    i.introduce_input(InputKind::Int, ConcreteValue::Int(5)).unwrap();

    // "abc".equals(Integer.valueOf(n))
    let value_of = key("java/lang/Integer", "valueOf", "(I)Ljava/lang/Integer;");
    let boxed = ObjectHandle::new(7, "java.lang.Integer").with_snapshot(5i64);
    i.invoke(&value_of, false).unwrap();
    i.call_result(&value_of, Some(ConcreteValue::Ref(boxed))).unwrap();
    let equals = key("java/lang/String", "equals", "(Ljava/lang/Object;)Z");
    i.invoke(&equals, true).unwrap();
    i.call_result(&equals, Some(ConcreteValue::Int(0))).unwrap();
    assert!(!i.env().peek(0).unwrap().is_symbolic());
    i.branch_zero(BranchSite::new("Test", "run", 9), Comparator::Eq)
        .unwrap();

    let result = i.finish();
    assert!(result.path_condition.is_empty());
    assert_eq!(result.variables.len(), 2);
    assert!(result.path_condition.is_satisfied_by(&result.initial_assignment()));
}

#[test]
fn test_string_equals_string_is_a_condition() {
    let mut i = ShadowInterpreter::new(&config());
    i.method_begin(&MethodId::new("Test", "run"), 1).unwrap();
    i.introduce_input(InputKind::String, string_ref(1, "abc"))
        .unwrap();
    i.push_constant(string_ref(2, "abd")).unwrap();
    let equals = key("java/lang/String", "equals", "(Ljava/lang/Object;)Z");
    i.invoke(&equals, true).unwrap();
    i.call_result(&equals, Some(ConcreteValue::Int(0))).unwrap();
    i.branch_zero(BranchSite::new("Test", "run", 4), Comparator::Eq)
        .unwrap();

    let result = i.finish();
    assert_eq!(result.path_condition.len(), 1);
    assert_eq!(
        result.path_condition.conditions()[0].constraint.to_string(),
        "equals(var0, \"abd\") == 0"
    );
    assert!(result.path_condition.is_satisfied_by(&result.initial_assignment()));
}

#[test]
fn test_math_call_inside_program() {
    use Insn::*;
    let program = Program::new(
        "distance",
        1,
        1,
        vec![
            Load(0),
            Math("abs", 1),
            Push(5),
            IfCmp(Comparator::Lt, 6),
            Push(1),
            Return,
            Push(0),
            Return,
        ],
    );
    let (exit, run) = concolic(&program, &[-9], &config());
    assert_eq!(exit, Exit::Returned(1));
    let condition = &run.path_condition.conditions()[0];
    assert!(!condition.taken);
    assert_eq!(condition.constraint.to_string(), "abs(var0) >= 5");
}

// ═══════════════════════════════════════════════════════════════════════════
// Lazy concretization
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_concrete_program_builds_nothing() {
    use Insn::*;
    let program = Program::new(
        "constant",
        0,
        1,
        vec![
            Push(6),
            Push(7),
            Arith(IntBinOp::Mul),
            Store(0),
            Load(0),
            Push(40),
            IfCmp(Comparator::Gt, 9),
            Push(0),
            Return,
            Load(0),
            Math("abs", 1),
            Return,
        ],
    );
    let mut i = ShadowInterpreter::new(&config());
    let exit = execute(&program, &[], &mut i).unwrap();
    assert_eq!(exit, Exit::Returned(42));
    assert!(i.env().heap().is_empty());
    assert_eq!(i.env().frame_depth(), 0);

    let result = i.finish();
    assert!(result.path_condition.is_empty());
    assert!(result.variables.is_empty());
}

#[test]
fn test_branch_not_depending_on_inputs_is_skipped() {
    use Insn::*;
    // x is read but the branch compares two constants
    let program = Program::new(
        "ignores",
        1,
        1,
        vec![
            Load(0),
            Store(0),
            Push(1),
            Push(2),
            IfCmp(Comparator::Lt, 7),
            Push(0),
            Return,
            Load(0),
            Return,
        ],
    );
    let (exit, run) = concolic(&program, &[3], &config());
    assert_eq!(exit, Exit::Returned(3));
    assert!(run.path_condition.is_empty());
    assert_eq!(run.variables.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Path conditions
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_path_condition_holds_for_original_inputs() {
    let (exit, run) = concolic(&classify_program(), &[60, 70], &config());
    assert_eq!(exit, Exit::Returned(2));

    let conditions = run.path_condition.conditions();
    assert_eq!(conditions.len(), 2);
    assert!(conditions[0].taken);
    assert_eq!(conditions[0].constraint.to_string(), "(var0 + var1) > 100");
    assert!(conditions[1].taken);
    assert_eq!(conditions[1].constraint.to_string(), "(var0 % 2) == 0");
    assert!(run.path_condition.is_satisfied_by(&run.initial_assignment()));
}

#[test]
fn test_max_path_constraints_caps_recording() {
    let config = ConcolicConfig::default().max_path_constraints(3);
    let (exit, run) = concolic(&countdown_program(), &[5], &config);
    assert_eq!(exit, Exit::Returned(0));
    // Six evaluations of `x <= 0`, three kept
    assert_eq!(run.path_condition.len(), 3);
    assert_eq!(run.ignored_branches, 3);
}

#[test]
fn test_max_constraint_size_skips_long_conditions() {
    // Evaluation k of `x <= 0` compares `var0 - 1 - ... - 1` (k subtractions)
    // against 0, which is 2k + 2 nodes
    let kept = |limit: usize| {
        let config = ConcolicConfig::default().max_constraint_size(limit);
        let (_, run) = concolic(&countdown_program(), &[10], &config);
        (run.path_condition.len(), run.oversized_branches)
    };
    assert_eq!(kept(100_000), (11, 0));
    assert_eq!(kept(21), (10, 1));
    assert_eq!(kept(5), (2, 9));
    assert_eq!(kept(ConcolicConfig::default().max_constraint_size), (11, 0));
}

/// `f(x)`: 1 when `x + 1 + ... + 1` (`steps` additions) exceeds `limit`
fn accumulate_program(steps: usize, limit: i32) -> Program {
    use Insn::*;
    let mut code = vec![Load(0)];
    for _ in 0..steps {
        code.extend([Push(1), Arith(IntBinOp::Add)]);
    }
    let exit = code.len() + 4;
    code.extend([Push(limit), IfCmp(Comparator::Le, exit), Push(1), Return, Push(0)]);
    code.push(Return);
    Program::new("accumulate", 1, 1, code)
}

#[test]
fn test_long_accumulation() {
    let program = accumulate_program(5_000, 10_000);
    let (exit, run) = concolic(&program, &[1], &config());
    assert_eq!(exit, Exit::Returned(0));
    assert_eq!(run.path_condition.len(), 1);

    let condition = &run.path_condition.conditions()[0];
    assert_eq!(condition.constraint.size(), 2 * 5_000 + 2);
    assert!(condition.constraint.to_string().ends_with("+ 1) <= 10000"));
    assert!(run.path_condition.is_satisfied_by(&run.initial_assignment()));

    let mut explorer = Explorer::from_config(&EngineConfig::preset(Preset::Balanced));
    let solution = explorer.solve_alternative(&run, 0).unwrap();
    let inputs = next_inputs(&run, &solution);
    assert!(inputs[0] > 5_000);
    let (exit, next) = concolic(&program, &inputs, &config());
    assert_eq!(exit, Exit::Returned(1));
    assert!(!next.path_condition.conditions()[0].taken);
}

#[test]
fn test_zero_divisor_unwinds_to_driver() {
    let mut run = ConcolicRun::new(&config());
    let exit = execute(&divide_program(), &[0], &mut run).unwrap();
    assert_eq!(exit, Exit::Threw);
    assert!(!run.is_poisoned());
    assert!(run.interpreter().pending_calls().is_empty());
    assert_eq!(run.interpreter().env().frame_depth(), 0);
    assert!(run.finish().is_ok());
}

#[test]
fn test_desynchronized_run_is_poisoned() {
    let mut run = ConcolicRun::new(&config());
    // A stray pop before any frame exists
    assert!(run.pop().is_err());
    assert!(execute(&classify_program(), &[1, 2], &mut run).is_err());
    assert!(matches!(run.finish(), Err(ConcolicError::RunPoisoned(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// Exploration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_alternative_flips_exactly_one_decision() {
    let program = classify_program();
    let (_, run) = concolic(&program, &[3, 4], &config());
    assert_eq!(run.path_condition.len(), 1);

    let mut explorer = Explorer::from_config(&EngineConfig::preset(Preset::Balanced));
    let solution = explorer.solve_alternative(&run, 0).unwrap();
    let inputs = next_inputs(&run, &solution);
    assert!(inputs[0].wrapping_add(inputs[1]) > 100);

    let (exit, next) = concolic(&program, &inputs, &config());
    assert_ne!(exit, Exit::Returned(0));
    assert!(next.path_condition.conditions()[0].taken);
}

#[test]
fn test_exploration_reaches_every_exit() {
    let program = classify_program();
    let mut explorer = Explorer::from_config(&EngineConfig::preset(Preset::Balanced));

    let mut seen: BTreeSet<Vec<i32>> = BTreeSet::new();
    let mut exits = BTreeSet::new();
    let mut worklist = vec![vec![3, 4]];

    while let Some(inputs) = worklist.pop() {
        if !seen.insert(inputs.clone()) || seen.len() > 16 {
            continue;
        }
        let (exit, run) = concolic(&program, &inputs, &config());
        if let Exit::Returned(v) = exit {
            exits.insert(v);
        }
        for (_, solution) in explorer.explore(&run) {
            worklist.push(next_inputs(&run, &solution));
        }
    }

    assert_eq!(exits, BTreeSet::from([0, 1, 2]));
    assert!(explorer.stats().sat >= 2);
}

#[test]
fn test_infeasible_alternative_yields_nothing() {
    use Insn::*;
    // if (x > 10) { if (x < 5) ... }: the inner branch cannot be taken
    let program = Program::new(
        "nested",
        1,
        1,
        vec![
            Load(0),
            Push(10),
            IfCmp(Comparator::Le, 8),
            Load(0),
            Push(5),
            IfCmp(Comparator::Lt, 8),
            Push(1),
            Return,
            Push(0),
            Return,
        ],
    );
    let (exit, run) = concolic(&program, &[20], &config());
    assert_eq!(exit, Exit::Returned(1));
    assert_eq!(run.path_condition.len(), 2);

    let mut explorer = Explorer::from_config(&EngineConfig::preset(Preset::Fast));
    assert!(explorer.solve_alternative(&run, 1).is_none());
    assert!(explorer.solve_alternative(&run, 0).is_some());
    assert_eq!(explorer.stats().unsat, 1);
}
