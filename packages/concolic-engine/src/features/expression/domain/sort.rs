//! Sorts and concrete values
//!
//! Integer expressions are stored as `i64` regardless of width; the sort
//! decides where two's-complement wraparound happens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value domain of an expression (the three theories the solver speaks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Integer,
    Real,
    String,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "Integer"),
            Self::Real => write!(f, "Real"),
            Self::String => write!(f, "String"),
        }
    }
}

/// Concrete sort of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sort {
    /// 32-bit two's-complement integer (also bool, char, byte, short)
    Int32,
    /// 64-bit two's-complement integer
    Int64,
    /// IEEE-754 double
    Real,
    /// Immutable character sequence
    String,
}

impl Sort {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Int32 | Self::Int64 => Domain::Integer,
            Self::Real => Domain::Real,
            Self::String => Domain::String,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.domain() == Domain::Integer
    }

    /// Bit width of an integer sort
    pub fn width(&self) -> Option<u32> {
        match self {
            Self::Int32 => Some(32),
            Self::Int64 => Some(64),
            _ => None,
        }
    }

    /// Wrap an integer into the representable range of this sort
    pub fn wrap(&self, value: i64) -> i64 {
        match self {
            Self::Int32 => value as i32 as i64,
            _ => value,
        }
    }

    /// Widest of two integer sorts (binary numeric promotion)
    pub fn promote(a: Sort, b: Sort) -> Sort {
        if a == Sort::Int64 || b == Sort::Int64 {
            Sort::Int64
        } else {
            a
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "Int32"),
            Self::Int64 => write!(f, "Int64"),
            Self::Real => write!(f, "Real"),
            Self::String => write!(f, "String"),
        }
    }
}

/// Concrete value observed during execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Real(f64),
    Str(String),
}

impl Value {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Int(_) => Domain::Integer,
            Self::Real(_) => Domain::Real,
            Self::Str(_) => Domain::String,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Default value of a sort (used when a model omits a variable)
    pub fn default_for(sort: Sort) -> Self {
        match sort {
            Sort::Int32 | Sort::Int64 => Self::Int(0),
            Sort::Real => Self::Real(0.0),
            Sort::String => Self::Str(String::new()),
        }
    }

    /// Bitwise equality for reals so NaN observations compare equal to themselves
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits() || a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{:?}", v),
            Self::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
