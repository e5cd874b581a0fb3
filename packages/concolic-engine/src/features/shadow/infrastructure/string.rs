//! String shadows: `java.lang.String`, `valueOf`/`toString`, `parseInt`

use super::catalogue::Registrar;
use crate::features::expression::domain::{Comparator, Expr, Operator, Sort, Value};
use crate::features::path_constraint::domain::Constraint;
use crate::features::shadow::domain::ShadowKind;

const STRING: &str = "java.lang.String";

pub(super) fn register(r: &mut Registrar<'_>) {
    use Operator::*;
    use ShadowKind::{ParseInt as Parse, StringComparison, StringProducer, StringToInt, ValueOfToString};

    // ━━━ String -> int ━━━
    r.method(STRING, "length", "()I", StringToInt(Length));
    r.method(STRING, "isEmpty", "()Z", StringToInt(IsEmpty));
    r.method(STRING, "charAt", "(I)C", StringToInt(CharAt));
    r.method(STRING, "indexOf", "(I)I", StringToInt(IndexOfChar));
    r.method(STRING, "indexOf", "(II)I", StringToInt(IndexOfCharFrom));
    r.method(STRING, "indexOf", "(Ljava/lang/String;)I", StringToInt(IndexOfStr));
    r.method(STRING, "indexOf", "(Ljava/lang/String;I)I", StringToInt(IndexOfStrFrom));
    r.method(STRING, "lastIndexOf", "(I)I", StringToInt(LastIndexOfChar));
    r.method(STRING, "lastIndexOf", "(Ljava/lang/String;)I", StringToInt(LastIndexOfStr));
    r.method(STRING, "compareTo", "(Ljava/lang/String;)I", StringToInt(CompareTo));
    r.method(
        STRING,
        "compareToIgnoreCase",
        "(Ljava/lang/String;)I",
        StringToInt(CompareToIgnoreCase),
    );

    // ━━━ Comparisons ━━━
    r.method(STRING, "equals", "(Ljava/lang/Object;)Z", StringComparison(Equals));
    r.method(
        STRING,
        "equalsIgnoreCase",
        "(Ljava/lang/String;)Z",
        StringComparison(EqualsIgnoreCase),
    );
    r.method(STRING, "startsWith", "(Ljava/lang/String;)Z", StringComparison(StartsWith));
    r.method(STRING, "startsWith", "(Ljava/lang/String;I)Z", StringComparison(StartsWithFrom));
    r.method(STRING, "endsWith", "(Ljava/lang/String;)Z", StringComparison(EndsWith));
    r.method(STRING, "contains", "(Ljava/lang/CharSequence;)Z", StringComparison(Contains));
    r.method(STRING, "matches", "(Ljava/lang/String;)Z", StringComparison(Matches));

    // ━━━ Producers ━━━
    r.method(STRING, "concat", "(Ljava/lang/String;)Ljava/lang/String;", StringProducer(Concat));
    r.method(STRING, "substring", "(I)Ljava/lang/String;", StringProducer(SubstringFrom));
    r.method(STRING, "substring", "(II)Ljava/lang/String;", StringProducer(Substring));
    r.method(STRING, "replace", "(CC)Ljava/lang/String;", StringProducer(ReplaceChar));
    r.method(
        STRING,
        "replace",
        "(Ljava/lang/CharSequence;Ljava/lang/CharSequence;)Ljava/lang/String;",
        StringProducer(ReplaceStr),
    );
    r.method(STRING, "toLowerCase", "()Ljava/lang/String;", StringProducer(ToLowerCase));
    r.method(STRING, "toUpperCase", "()Ljava/lang/String;", StringProducer(ToUpperCase));
    r.method(STRING, "trim", "()Ljava/lang/String;", StringProducer(Trim));

    // ━━━ Primitive <-> string ━━━
    r.static_fn(STRING, "valueOf", "(I)Ljava/lang/String;", ValueOfToString(IntToString));
    r.static_fn(STRING, "valueOf", "(J)Ljava/lang/String;", ValueOfToString(IntToString));
    r.static_fn(STRING, "valueOf", "(D)Ljava/lang/String;", ValueOfToString(RealToString));
    r.static_fn(STRING, "valueOf", "(C)Ljava/lang/String;", ValueOfToString(CharToString));
    r.static_fn(
        "java.lang.Integer",
        "toString",
        "(I)Ljava/lang/String;",
        ValueOfToString(IntToString),
    );
    r.static_fn(
        "java.lang.Long",
        "toString",
        "(J)Ljava/lang/String;",
        ValueOfToString(IntToString),
    );
    r.static_fn(
        "java.lang.Double",
        "toString",
        "(D)Ljava/lang/String;",
        ValueOfToString(RealToString),
    );
    r.static_fn("java.lang.Integer", "parseInt", "(Ljava/lang/String;)I", Parse);
    r.static_fn("java.lang.Long", "parseLong", "(Ljava/lang/String;)J", Parse);
}

/// Receiver-rooted composite: `op(receiver, args..)`
///
/// `None` when an argument has no expression (null, or an object that is
/// not a value object); the call is then concretized.
pub(super) fn build_receiver_op(
    op: Operator,
    receiver: &Expr,
    args: &[Option<Expr>],
    sort: Sort,
    observed: Value,
) -> Option<Expr> {
    let args: Vec<Expr> = args.iter().cloned().collect::<Option<Vec<_>>>()?;
    let expr = match args.as_slice() {
        [] => Expr::unary(op, sort, receiver.clone(), observed),
        [a] => Expr::binary(op, sort, receiver.clone(), a.clone(), observed),
        [a, rest @ ..] => Expr::nary(op, sort, receiver.clone(), a.clone(), rest.to_vec(), observed),
    };
    Some(expr)
}

fn length_of(s: &Expr) -> Expr {
    let len = s
        .concrete_value()
        .as_str()
        .map_or(0, |v| v.chars().count() as i64);
    Expr::unary(Operator::Length, Sort::Int32, s.clone(), Value::Int(len))
}

/// Index bounds the concrete call relied on (it returned, so they held)
pub(super) fn index_bounds(op: Operator, receiver: &Expr, args: &[Option<Expr>]) -> Vec<Constraint> {
    let zero = Expr::int32(0);
    match (op, args) {
        (Operator::CharAt, [Some(i)]) => vec![
            Constraint::new(i.clone(), Comparator::Ge, zero),
            Constraint::new(i.clone(), Comparator::Lt, length_of(receiver)),
        ],
        (Operator::SubstringFrom, [Some(b)]) => vec![
            Constraint::new(b.clone(), Comparator::Ge, zero),
            Constraint::new(b.clone(), Comparator::Le, length_of(receiver)),
        ],
        (Operator::Substring, [Some(b), Some(e)]) => vec![
            Constraint::new(b.clone(), Comparator::Ge, zero),
            Constraint::new(b.clone(), Comparator::Le, e.clone()),
            Constraint::new(e.clone(), Comparator::Le, length_of(receiver)),
        ],
        _ => Vec::new(),
    }
    .into_iter()
    .filter(Constraint::contains_symbolic_variable)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::VariableFactory;

    #[test]
    fn test_build_receiver_op_shapes() {
        let mut f = VariableFactory::new();
        let s = Expr::variable(f.fresh(Sort::String, Value::from("hello"), i64::MIN, i64::MAX));
        let len = build_receiver_op(Operator::Length, &s, &[], Sort::Int32, Value::Int(5)).unwrap();
        assert_eq!(len.to_string(), "length(var0)");

        let idx = build_receiver_op(
            Operator::IndexOfCharFrom,
            &s,
            &[Some(Expr::int32('l' as i32)), Some(Expr::int32(1))],
            Sort::Int32,
            Value::Int(2),
        )
        .unwrap();
        assert_eq!(idx.children().len(), 3);

        assert!(build_receiver_op(Operator::Equals, &s, &[None], Sort::Int32, Value::Int(0)).is_none());
    }

    #[test]
    fn test_index_bounds_hold_concretely() {
        let mut f = VariableFactory::new();
        let i = Expr::variable(f.fresh(Sort::Int32, Value::Int(1), i32::MIN as i64, i32::MAX as i64));
        let bounds = index_bounds(Operator::CharAt, &Expr::string("abc"), &[Some(i)]);
        assert_eq!(bounds.len(), 2);
        assert!(bounds.iter().all(Constraint::holds_concretely));

        let concrete = index_bounds(Operator::CharAt, &Expr::string("abc"), &[Some(Expr::int32(1))]);
        assert!(concrete.is_empty());
    }
}
