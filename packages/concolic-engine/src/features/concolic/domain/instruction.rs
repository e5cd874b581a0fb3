//! Instruction vocabulary shared by the hooks and their callers
//!
//! Each enum maps one family of bytecode instructions onto the expression
//! `Operator` that shadows it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::environment::domain::ConcreteValue;
use crate::features::expression::domain::{Operator, Sort};

/// Method whose activation owns a frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    pub owner: String,
    pub name: String,
}

impl MethodId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into().replace('/', "."),
            name: name.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

// ═══════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════

/// `iadd`..`lxor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

impl IntBinOp {
    pub fn operator(&self) -> Operator {
        match self {
            Self::Add => Operator::Plus,
            Self::Sub => Operator::Minus,
            Self::Mul => Operator::Mul,
            Self::Div => Operator::Div,
            Self::Rem => Operator::Rem,
            Self::And => Operator::BitAnd,
            Self::Or => Operator::BitOr,
            Self::Xor => Operator::BitXor,
            Self::Shl => Operator::Shl,
            Self::Shr => Operator::Shr,
            Self::UShr => Operator::UShr,
        }
    }

    /// Shift counts stay `int` even for `long` shifts
    pub fn is_shift(&self) -> bool {
        matches!(self, Self::Shl | Self::Shr | Self::UShr)
    }

    /// Faults on a zero divisor
    pub fn is_division(&self) -> bool {
        matches!(self, Self::Div | Self::Rem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntUnOp {
    Neg,
}

impl IntUnOp {
    pub fn operator(&self) -> Operator {
        match self {
            Self::Neg => Operator::Neg,
        }
    }
}

/// `fadd`..`drem`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RealBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl RealBinOp {
    pub fn operator(&self) -> Operator {
        match self {
            Self::Add => Operator::Plus,
            Self::Sub => Operator::Minus,
            Self::Mul => Operator::Mul,
            Self::Div => Operator::Div,
            Self::Rem => Operator::Rem,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RealUnOp {
    Neg,
}

impl RealUnOp {
    pub fn operator(&self) -> Operator {
        match self {
            Self::Neg => Operator::Neg,
        }
    }
}

/// Result of `fcmpl`/`dcmpl` (NaN is less) versus `fcmpg`/`dcmpg`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NanOrdering {
    Less,
    Greater,
}

impl NanOrdering {
    pub fn operator(&self) -> Operator {
        match self {
            Self::Less => Operator::CmpL,
            Self::Greater => Operator::CmpG,
        }
    }
}

/// Primitive conversions (`i2l`, `d2i`, `i2c`, ...)
///
/// `float` and `double` share the real sort, so `f2d`/`d2f` keep the
/// operand's expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
}

impl CastOp {
    pub fn source(&self) -> Sort {
        match self {
            Self::I2L | Self::I2F | Self::I2D | Self::I2B | Self::I2C | Self::I2S => Sort::Int32,
            Self::L2I | Self::L2F | Self::L2D => Sort::Int64,
            Self::F2I | Self::F2L | Self::F2D | Self::D2I | Self::D2L | Self::D2F => Sort::Real,
        }
    }

    pub fn target(&self) -> Sort {
        match self {
            Self::L2I | Self::F2I | Self::D2I | Self::I2B | Self::I2C | Self::I2S => Sort::Int32,
            Self::I2L | Self::F2L | Self::D2L => Sort::Int64,
            Self::I2F | Self::I2D | Self::L2F | Self::L2D | Self::F2D | Self::D2F => Sort::Real,
        }
    }

    /// Shadow operator; `None` when the expression carries over unchanged
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Self::I2L => Some(Operator::Widen64),
            Self::L2I => Some(Operator::Narrow32),
            Self::I2F | Self::I2D | Self::L2F | Self::L2D => Some(Operator::IntToReal),
            Self::F2I | Self::F2L | Self::D2I | Self::D2L => Some(Operator::RealToInt),
            Self::I2B => Some(Operator::NarrowByte),
            Self::I2C => Some(Operator::NarrowChar),
            Self::I2S => Some(Operator::NarrowShort),
            Self::F2D | Self::D2F => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════════════════════════

/// Type of a test input turned into a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl InputKind {
    pub fn sort(&self) -> Sort {
        match self {
            Self::Bool | Self::Char | Self::Byte | Self::Short | Self::Int => Sort::Int32,
            Self::Long => Sort::Int64,
            Self::Float | Self::Double => Sort::Real,
            Self::String => Sort::String,
        }
    }

    /// Representable range used as variable bounds
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Self::Bool => (0, 1),
            Self::Char => (0, u16::MAX as i64),
            Self::Byte => (i8::MIN as i64, i8::MAX as i64),
            Self::Short => (i16::MIN as i64, i16::MAX as i64),
            Self::Int => (i32::MIN as i64, i32::MAX as i64),
            Self::Long | Self::Float | Self::Double | Self::String => (i64::MIN, i64::MAX),
        }
    }

    /// Does the concrete value have this input's shape
    pub fn accepts(&self, value: &ConcreteValue) -> bool {
        match (self, value) {
            (Self::String, ConcreteValue::Ref(handle)) => {
                handle.snapshot.as_ref().is_some_and(|s| s.as_str().is_some())
            }
            (Self::String, _) => false,
            (kind, value) => value.sort() == Some(kind.sort()),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "java.lang.String",
        };
        write!(f, "{}", name)
    }
}
