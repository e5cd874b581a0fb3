//! Branch distance
//!
//! How far an assignment is from satisfying a constraint: zero exactly when
//! the constraint holds, growing with the gap otherwise. String predicates
//! compared against 0/1 get a character-level distance so the search has a
//! gradient to follow.

use crate::features::expression::domain::{Comparator, Expr, Operator, Value};
use crate::features::expression::infrastructure::ExpressionEvaluator;
use crate::features::path_constraint::domain::Constraint;

/// Distance of an unsatisfiable evaluation (degenerate operation, NaN)
pub const MAX_DISTANCE: f64 = f64::MAX;

/// Map a distance into [0, 1)
pub fn normalize(distance: f64) -> f64 {
    if distance >= MAX_DISTANCE {
        1.0
    } else {
        distance / (distance + 1.0)
    }
}

/// Distance of one constraint under the evaluator's assignment
pub fn constraint_distance(constraint: &Constraint, evaluator: &mut ExpressionEvaluator<'_>) -> f64 {
    let (left, right) = match (
        evaluator.evaluate(&constraint.left),
        evaluator.evaluate(&constraint.right),
    ) {
        (Ok(l), Ok(r)) => (l, r),
        _ => return MAX_DISTANCE,
    };
    if constraint.holds(&left, &right) {
        return 0.0;
    }

    if let Some(distance) = predicate_distance(constraint, &left, evaluator) {
        return distance.max(f64::MIN_POSITIVE);
    }

    let distance = match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => int_distance(constraint.comparator, *l, *r),
        (Value::Real(l), Value::Real(r)) => real_distance(constraint.comparator, *l, *r),
        (Value::Str(l), Value::Str(r)) => match constraint.comparator {
            Comparator::Eq => str_equals(l, r),
            _ => 1.0,
        },
        _ => MAX_DISTANCE,
    };
    // The constraint does not hold, so the distance must be positive
    distance.max(f64::MIN_POSITIVE)
}

fn int_distance(cmp: Comparator, left: i64, right: i64) -> f64 {
    let d = left as i128 - right as i128;
    let d = match cmp {
        Comparator::Eq => d.abs(),
        Comparator::Ne => 1,
        Comparator::Lt => d + 1,
        Comparator::Le => d,
        Comparator::Gt => -d + 1,
        Comparator::Ge => -d,
    };
    d as f64
}

fn real_distance(cmp: Comparator, left: f64, right: f64) -> f64 {
    if left.is_nan() || right.is_nan() {
        return MAX_DISTANCE;
    }
    let d = left - right;
    let d = match cmp {
        Comparator::Eq => d.abs(),
        Comparator::Ne => 1.0,
        Comparator::Lt => d + 1.0,
        Comparator::Le => d,
        Comparator::Gt => -d + 1.0,
        Comparator::Ge => -d,
    };
    if d.is_finite() {
        d
    } else {
        MAX_DISTANCE
    }
}

/// Distance of `pred(a, b) <cmp> c` where `pred` is a 0/1 string predicate
///
/// The constraint failed, so the predicate has the wrong truth value. Making
/// it true gets a character-level distance; making it false only the flat
/// distance 1.
fn predicate_distance(
    constraint: &Constraint,
    left: &Value,
    evaluator: &mut ExpressionEvaluator<'_>,
) -> Option<f64> {
    let op = constraint.left.operator()?;
    if !op.is_predicate() || constraint.right.contains_symbolic_variable() {
        return None;
    }
    if left.as_int()? != 0 {
        return Some(1.0);
    }
    let children = constraint.left.children();
    let a = evaluate_str(children.first()?, evaluator)?;
    let b = evaluate_str(children.get(1)?, evaluator)?;
    let distance = match op {
        Operator::Equals => str_equals(&a, &b),
        Operator::EqualsIgnoreCase => str_equals(&a.to_lowercase(), &b.to_lowercase()),
        Operator::StartsWith => str_starts_with(&a, &b, 0),
        Operator::StartsWithFrom => {
            let from = evaluator.evaluate(children.get(2)?).ok()?.as_int()?;
            str_starts_with(&a, &b, from)
        }
        Operator::EndsWith => str_ends_with(&a, &b),
        Operator::Contains => str_contains(&a, &b),
        _ => 1.0,
    };
    Some(distance)
}

fn evaluate_str(expr: &Expr, evaluator: &mut ExpressionEvaluator<'_>) -> Option<String> {
    match evaluator.evaluate(expr).ok()? {
        Value::Str(s) => Some(s),
        _ => None,
    }
}

/// Length difference plus normalized per-character differences
pub fn avm_distance(s: &[char], t: &[char]) -> f64 {
    let mut distance = (s.len() as f64 - t.len() as f64).abs();
    for (a, b) in s.iter().zip(t) {
        distance += normalize((*a as i64 - *b as i64).abs() as f64);
    }
    distance
}

pub fn str_equals(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    avm_distance(&a, &b)
}

fn str_starts_with(value: &str, prefix: &str, from: i64) -> f64 {
    let value: Vec<char> = value.chars().collect();
    let prefix: Vec<char> = prefix.chars().collect();
    let start = usize::try_from(from).unwrap_or(0).min(value.len());
    let end = (start + prefix.len()).min(value.len());
    avm_distance(&value[start..end], &prefix)
}

fn str_ends_with(value: &str, suffix: &str) -> f64 {
    let value: Vec<char> = value.chars().collect();
    let suffix: Vec<char> = suffix.chars().collect();
    let len = suffix.len().min(value.len());
    avm_distance(&value[value.len() - len..], &suffix)
}

fn str_contains(value: &str, needle: &str) -> f64 {
    let value: Vec<char> = value.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > value.len() {
        return avm_distance(&value, &needle);
    }
    value
        .windows(needle.len().max(1))
        .map(|window| avm_distance(window, &needle))
        .fold(MAX_DISTANCE, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::{Sort, VariableFactory};
    use crate::features::expression::infrastructure::Assignment;

    fn distance(constraint: &Constraint) -> f64 {
        let assignment = Assignment::new();
        let mut evaluator = ExpressionEvaluator::new(&assignment);
        constraint_distance(constraint, &mut evaluator)
    }

    #[test]
    fn test_integer_distances() {
        assert_eq!(int_distance(Comparator::Eq, 3, 7), 4.0);
        assert_eq!(int_distance(Comparator::Lt, 7, 3), 5.0);
        assert_eq!(int_distance(Comparator::Ge, 3, 7), 4.0);
        assert_eq!(int_distance(Comparator::Ne, 3, 3), 1.0);
    }

    #[test]
    fn test_zero_iff_satisfied() {
        let mut f = VariableFactory::new();
        let v = Expr::variable(f.fresh(Sort::Int32, Value::Int(5), i32::MIN as i64, i32::MAX as i64));
        assert_eq!(distance(&Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0))), 0.0);
        assert!(distance(&Constraint::new(v, Comparator::Gt, Expr::int32(5))) > 0.0);
    }

    #[test]
    fn test_nan_is_never_satisfied() {
        let mut f = VariableFactory::new();
        let v = Expr::variable(f.fresh(Sort::Real, Value::Real(f64::NAN), i64::MIN, i64::MAX));
        let d = distance(&Constraint::new(v, Comparator::Le, Expr::real(1.0)));
        assert_eq!(d, MAX_DISTANCE);
        assert_eq!(normalize(d), 1.0);
    }

    #[test]
    fn test_string_equals_gradient() {
        let mut f = VariableFactory::new();
        let far = Expr::variable(f.fresh(Sort::String, Value::from("a"), i64::MIN, i64::MAX));
        let near = Expr::variable(f.fresh(Sort::String, Value::from("hellp"), i64::MIN, i64::MAX));
        let pred = |s: Expr, observed: i64| {
            let eq = Expr::binary(Operator::Equals, Sort::Int32, s, Expr::string("hello"), Value::Int(observed));
            Constraint::new(eq, Comparator::Ne, Expr::int32(0))
        };
        let d_far = distance(&pred(far, 0));
        let d_near = distance(&pred(near, 0));
        assert!(d_near < d_far);
        assert!(d_near > 0.0);
    }

    #[test]
    fn test_contains_uses_best_window() {
        assert_eq!(str_contains("xxabcxx", "abc"), 0.0);
        assert!(str_contains("xxabdxx", "abc") < str_contains("zzzzzzz", "abc"));
    }
}
