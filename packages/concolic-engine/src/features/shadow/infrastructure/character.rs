//! `java.lang.Character` shadows

use super::catalogue::Registrar;
use crate::features::expression::domain::Operator;
use crate::features::shadow::domain::ShadowKind;

const CHARACTER: &str = "java.lang.Character";

pub(super) fn register(r: &mut Registrar<'_>) {
    r.static_fn(CHARACTER, "isDigit", "(C)Z", ShadowKind::CharacterPredicate(Operator::IsDigit));
    r.static_fn(CHARACTER, "isLetter", "(C)Z", ShadowKind::CharacterPredicate(Operator::IsLetter));
    r.static_fn(
        CHARACTER,
        "toString",
        "(C)Ljava/lang/String;",
        ShadowKind::ValueOfToString(Operator::CharToString),
    );
}
