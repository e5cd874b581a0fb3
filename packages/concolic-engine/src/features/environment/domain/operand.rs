//! Operands: concrete values paired with their optional symbolic shadow

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::expression::domain::{Expr, ObjectId, Reference, Sort, Value};

/// Concrete object reference as reported by instrumentation
///
/// `snapshot` carries the concrete contents of value objects (strings, boxed
/// primitives, string builders) so their backing slots can default to a
/// constant without a symbolic heap entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectHandle {
    pub id: ObjectId,
    pub class: String,
    pub snapshot: Option<Value>,
}

impl ObjectHandle {
    pub fn new(id: u64, class: impl Into<String>) -> Self {
        Self {
            id: ObjectId(id),
            class: class.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: impl Into<Value>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    pub fn reference(&self) -> Reference {
        Reference::non_null(self.id, self.class.clone())
    }
}

/// Value actually produced by concrete execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcreteValue {
    /// 32-bit integer (also boolean, char, byte, short)
    Int(i32),
    Long(i64),
    Real(f64),
    Ref(ObjectHandle),
    Null,
}

impl ConcreteValue {
    /// Sort of a primitive value; `None` for references
    pub fn sort(&self) -> Option<Sort> {
        match self {
            Self::Int(_) => Some(Sort::Int32),
            Self::Long(_) => Some(Sort::Int64),
            Self::Real(_) => Some(Sort::Real),
            Self::Ref(_) | Self::Null => None,
        }
    }

    /// Primitive payload as an expression value
    pub fn value(&self) -> Option<Value> {
        match self {
            Self::Int(v) => Some(Value::Int(*v as i64)),
            Self::Long(v) => Some(Value::Int(*v)),
            Self::Real(v) => Some(Value::Real(*v)),
            Self::Ref(_) | Self::Null => None,
        }
    }

    pub fn from_value(sort: Sort, value: &Value) -> Option<Self> {
        match (sort, value) {
            (Sort::Int32, Value::Int(v)) => Some(Self::Int(*v as i32)),
            (Sort::Int64, Value::Int(v)) => Some(Self::Long(*v)),
            (Sort::Real, Value::Real(v)) => Some(Self::Real(*v)),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Ref(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::Null)
    }

    pub fn reference(&self) -> Option<Reference> {
        match self {
            Self::Ref(h) => Some(h.reference()),
            Self::Null => Some(Reference::Null),
            _ => None,
        }
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}L", v),
            Self::Real(v) => write!(f, "{:?}", v),
            Self::Ref(h) => write!(f, "{}{}", h.class, h.id),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Operand stack slot
#[derive(Debug, Clone)]
pub struct Operand {
    pub concrete: ConcreteValue,
    pub symbolic: Option<Expr>,
}

impl Operand {
    pub fn concrete(concrete: ConcreteValue) -> Self {
        Self {
            concrete,
            symbolic: None,
        }
    }

    pub fn with_expr(concrete: ConcreteValue, expr: Expr) -> Self {
        Self {
            concrete,
            symbolic: Some(expr),
        }
    }

    /// Keep the expression only if it actually references an input
    pub fn shadowed(concrete: ConcreteValue, expr: Option<Expr>) -> Self {
        Self {
            concrete,
            symbolic: expr.filter(Expr::contains_symbolic_variable),
        }
    }

    pub fn is_symbolic(&self) -> bool {
        self.symbolic
            .as_ref()
            .is_some_and(Expr::contains_symbolic_variable)
    }

    /// Symbolic shadow, or a constant of the concrete primitive value
    pub fn expr_or_constant(&self) -> Option<Expr> {
        if let Some(expr) = &self.symbolic {
            return Some(expr.clone());
        }
        let sort = self.concrete.sort()?;
        let value = self.concrete.value()?;
        Some(Expr::constant(sort, value))
    }
}
