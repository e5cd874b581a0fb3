//! Boxing shadows
//!
//! `valueOf` stores the primitive's expression in the backing slot of the
//! returned box; `xxxValue()` reads it back.

use super::catalogue::Registrar;
use crate::features::shadow::domain::ShadowKind;

const BOXES: [(&str, &str, &str); 5] = [
    ("java.lang.Integer", "I", "intValue"),
    ("java.lang.Long", "J", "longValue"),
    ("java.lang.Double", "D", "doubleValue"),
    ("java.lang.Boolean", "Z", "booleanValue"),
    ("java.lang.Character", "C", "charValue"),
];

pub(super) fn register(r: &mut Registrar<'_>) {
    for (class, prim, unbox) in BOXES {
        let slashed = class.replace('.', "/");
        r.static_fn(
            class,
            "valueOf",
            &format!("({})L{};", prim, slashed),
            ShadowKind::Box,
        );
        r.method(class, unbox, &format!("(){}", prim), ShadowKind::Unbox);
    }
}
