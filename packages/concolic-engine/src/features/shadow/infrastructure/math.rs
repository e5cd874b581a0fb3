//! Numeric shadows: `java.lang.Math`, `Integer.signum`, `Long.signum`

use super::catalogue::Registrar;
use crate::features::expression::domain::{Expr, Operator, Sort, Value};
use crate::features::shadow::domain::ShadowKind;

const MATH: &str = "java.lang.Math";

pub(super) fn register(r: &mut Registrar<'_>) {
    use Operator::*;

    r.static_fn(MATH, "abs", "(I)I", ShadowKind::IntUnary(Abs));
    r.static_fn(MATH, "abs", "(J)J", ShadowKind::IntUnary(Abs));
    r.static_fn(MATH, "abs", "(D)D", ShadowKind::RealUnary(Abs));

    for (name, op) in [("min", Min), ("max", Max)] {
        r.static_fn(MATH, name, "(II)I", ShadowKind::IntBinary(op));
        r.static_fn(MATH, name, "(JJ)J", ShadowKind::IntBinary(op));
        r.static_fn(MATH, name, "(DD)D", ShadowKind::RealBinary(op));
    }

    for (name, op) in [
        ("sqrt", Sqrt),
        ("cbrt", Cbrt),
        ("ceil", Ceil),
        ("floor", Floor),
        ("rint", Rint),
        ("sin", Sin),
        ("cos", Cos),
        ("tan", Tan),
        ("asin", Asin),
        ("acos", Acos),
        ("atan", Atan),
        ("exp", Exp),
        ("log", Log),
        ("log10", Log10),
        ("toDegrees", ToDegrees),
        ("toRadians", ToRadians),
        ("signum", Signum),
    ] {
        r.static_fn(MATH, name, "(D)D", ShadowKind::RealUnary(op));
    }

    for (name, op) in [("atan2", Atan2), ("pow", Pow), ("hypot", Hypot)] {
        r.static_fn(MATH, name, "(DD)D", ShadowKind::RealBinary(op));
    }

    r.static_fn(MATH, "round", "(D)J", ShadowKind::RealToInt(Round));
    r.static_fn(MATH, "round", "(F)I", ShadowKind::RealToInt(Round));

    r.static_fn("java.lang.Integer", "signum", "(I)I", ShadowKind::IntUnary(Signum));
    r.static_fn("java.lang.Long", "signum", "(J)I", ShadowKind::IntUnary(Signum));
}

/// Composite over primitive arguments; `None` if an argument has no expression
pub(super) fn build_numeric(op: Operator, args: &[Option<Expr>], sort: Sort, observed: Value) -> Option<Expr> {
    match args {
        [Some(a)] => Some(Expr::unary(op, sort, a.clone(), observed)),
        [Some(a), Some(b)] => Some(Expr::binary(op, sort, a.clone(), b.clone(), observed)),
        _ => None,
    }
}
