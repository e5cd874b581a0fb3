//! Symbolic heap
//!
//! Maps `(class, field, object)` to the expression currently stored there.
//! Value objects keep their contents in synthetic backing fields (see
//! [`backing_field`]) so that string and boxing shadows can re-bind them.

use rustc_hash::FxHashMap;

use crate::features::expression::domain::{Expr, ObjectId, Sort};

pub const STRING_CLASS: &str = "java.lang.String";
pub const BUILDER_CLASS: &str = "java.lang.StringBuilder";
pub const INTEGER_CLASS: &str = "java.lang.Integer";
pub const LONG_CLASS: &str = "java.lang.Long";
pub const DOUBLE_CLASS: &str = "java.lang.Double";
pub const BOOLEAN_CLASS: &str = "java.lang.Boolean";
pub const CHARACTER_CLASS: &str = "java.lang.Character";

pub const STRING_VALUE: &str = "$stringValue";
pub const BUILDER_VALUE: &str = "$stringBuilderContents";
pub const INT_VALUE: &str = "$intValue";
pub const LONG_VALUE: &str = "$longValue";
pub const REAL_VALUE: &str = "$doubleValue";
pub const BOOLEAN_VALUE: &str = "$booleanValue";
pub const CHAR_VALUE: &str = "$charValue";

/// Backing field and sort holding the contents of a value-object class
pub fn backing_field(class: &str) -> Option<(&'static str, Sort)> {
    match class {
        STRING_CLASS => Some((STRING_VALUE, Sort::String)),
        BUILDER_CLASS => Some((BUILDER_VALUE, Sort::String)),
        INTEGER_CLASS => Some((INT_VALUE, Sort::Int32)),
        LONG_CLASS => Some((LONG_VALUE, Sort::Int64)),
        DOUBLE_CLASS => Some((REAL_VALUE, Sort::Real)),
        BOOLEAN_CLASS => Some((BOOLEAN_VALUE, Sort::Int32)),
        CHARACTER_CLASS => Some((CHAR_VALUE, Sort::Int32)),
        _ => None,
    }
}

pub fn is_backing_field(field: &str) -> bool {
    field.starts_with('$')
}

type FieldKey = (String, String, ObjectId);
type StaticKey = (String, String);

#[derive(Debug, Default)]
pub struct SymbolicHeap {
    fields: FxHashMap<FieldKey, Expr>,
    statics: FxHashMap<StaticKey, Expr>,
}

impl SymbolicHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_field(&mut self, class: &str, field: &str, id: ObjectId, expr: Expr) {
        self.fields
            .insert((class.to_string(), field.to_string(), id), expr);
    }

    pub fn get_field(&self, class: &str, field: &str, id: ObjectId) -> Option<&Expr> {
        self.fields
            .get(&(class.to_string(), field.to_string(), id))
    }

    /// Forget a field so later reads fall back to the concrete value
    pub fn clear_field(&mut self, class: &str, field: &str, id: ObjectId) {
        self.fields
            .remove(&(class.to_string(), field.to_string(), id));
    }

    pub fn put_static(&mut self, class: &str, field: &str, expr: Expr) {
        self.statics
            .insert((class.to_string(), field.to_string()), expr);
    }

    pub fn get_static(&self, class: &str, field: &str) -> Option<&Expr> {
        self.statics.get(&(class.to_string(), field.to_string()))
    }

    pub fn clear_static(&mut self, class: &str, field: &str) {
        self.statics.remove(&(class.to_string(), field.to_string()));
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.statics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose expression references an input variable
    pub fn symbolic_entries(&self) -> usize {
        self.fields
            .values()
            .chain(self.statics.values())
            .filter(|e| e.contains_symbolic_variable())
            .count()
    }
}
