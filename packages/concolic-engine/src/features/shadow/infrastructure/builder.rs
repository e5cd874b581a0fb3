//! `java.lang.StringBuilder` shadows
//!
//! Builder contents live in the `$stringBuilderContents` backing slot of the
//! builder's identity. `append` re-binds it to `concat(old, str(arg))`.

use super::catalogue::Registrar;
use crate::features::environment::domain::ConcreteValue;
use crate::features::expression::domain::{Expr, Operator, Sort, Value};
use crate::features::expression::infrastructure::semantics;
use crate::features::shadow::domain::{ParamType, ShadowKind};

const BUILDER: &str = "java.lang.StringBuilder";

pub(super) fn register(r: &mut Registrar<'_>) {
    r.method(BUILDER, "<init>", "()V", ShadowKind::BuilderInit);
    r.method(BUILDER, "<init>", "(Ljava/lang/String;)V", ShadowKind::BuilderInit);
    for param in ["Ljava/lang/String;", "I", "C", "J", "D"] {
        r.method(
            BUILDER,
            "append",
            &format!("({})Ljava/lang/StringBuilder;", param),
            ShadowKind::BuilderAppend,
        );
    }
    r.method(BUILDER, "toString", "()Ljava/lang/String;", ShadowKind::BuilderToString);
    r.method(BUILDER, "length", "()I", ShadowKind::StringToInt(Operator::Length));
}

/// String form of an appended argument
///
/// Primitives are wrapped in the matching to-string operator; a null string
/// appends the literal `"null"`.
pub(super) fn stringify(param: &ParamType, arg: Option<&Expr>, concrete: &ConcreteValue) -> Option<Expr> {
    let op = match param {
        ParamType::Ref(_) => {
            return match (arg, concrete) {
                (Some(expr), _) => Some(expr.clone()),
                (None, ConcreteValue::Null) => Some(Expr::string("null")),
                (None, _) => None,
            };
        }
        ParamType::Char => Operator::CharToString,
        ParamType::Float | ParamType::Double => Operator::RealToString,
        ParamType::Void => return None,
        _ => Operator::IntToString,
    };
    let arg = arg?;
    let observed = semantics::apply(op, Sort::String, &[arg.concrete_value().clone()]).ok()?;
    Some(Expr::unary(op, Sort::String, arg.clone(), observed))
}

/// `concat(old, appended)` with the observed contents after the append
pub(super) fn append(old: &Expr, appended: Expr, observed: Option<Value>) -> Option<Expr> {
    let observed = match observed {
        Some(v) => v,
        None => semantics::apply(
            Operator::Concat,
            Sort::String,
            &[old.concrete_value().clone(), appended.concrete_value().clone()],
        )
        .ok()?,
    };
    Some(Expr::binary(Operator::Concat, Sort::String, old.clone(), appended, observed))
}
