//! Shadow behaviours
//!
//! A closed set of tagged variants. Each variant fixes how receiver and
//! arguments are turned into expressions and where the result goes (the
//! returned operand, or the heap entry of a returned value object).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::signature::FunctionKey;
use crate::features::expression::domain::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowKind {
    /// `Math.abs(int)`, `Integer.signum(int)`
    IntUnary(Operator),
    /// `Math.min(int, int)`
    IntBinary(Operator),
    /// `Math.sqrt(double)`
    RealUnary(Operator),
    /// `Math.pow(double, double)`
    RealBinary(Operator),
    /// `Math.round(double)`
    RealToInt(Operator),
    /// Receiver string plus primitive or string arguments to an integer
    /// (`length`, `charAt`, `indexOf`, `compareTo`)
    StringToInt(Operator),
    /// Receiver string compared with string arguments, yielding 0/1
    StringComparison(Operator),
    /// Receiver string to a new string (`concat`, `substring`, `trim`)
    StringProducer(Operator),
    /// Primitive to a new string (`String.valueOf(int)`)
    ValueOfToString(Operator),
    /// `Integer.parseInt(String)`
    ParseInt,
    /// `Integer.valueOf(int)`: primitive into a value object
    Box,
    /// `Integer.intValue()`: value object back to a primitive
    Unbox,
    /// `Character.isDigit(char)`
    CharacterPredicate(Operator),
    /// `new StringBuilder()` / `new StringBuilder(String)`
    BuilderInit,
    /// `StringBuilder.append(..)`
    BuilderAppend,
    /// `StringBuilder.toString()`
    BuilderToString,
}

impl ShadowKind {
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Self::IntUnary(op)
            | Self::IntBinary(op)
            | Self::RealUnary(op)
            | Self::RealBinary(op)
            | Self::RealToInt(op)
            | Self::StringToInt(op)
            | Self::StringComparison(op)
            | Self::StringProducer(op)
            | Self::ValueOfToString(op)
            | Self::CharacterPredicate(op) => Some(*op),
            Self::ParseInt => Some(Operator::ParseInt),
            Self::BuilderAppend => Some(Operator::Concat),
            Self::Box | Self::Unbox | Self::BuilderInit | Self::BuilderToString => None,
        }
    }
}

impl fmt::Display for ShadowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator() {
            Some(op) => write!(f, "shadow[{}]", op.name()),
            None => write!(f, "{:?}", self),
        }
    }
}

/// One registered shadow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowFunction {
    pub key: FunctionKey,
    pub kind: ShadowKind,
    /// Instance methods and constructors consume a receiver
    pub has_receiver: bool,
}

impl ShadowFunction {
    pub fn new(key: FunctionKey, kind: ShadowKind, has_receiver: bool) -> Self {
        Self {
            key,
            kind,
            has_receiver,
        }
    }

    /// Operands consumed from the caller's stack at ENTER
    pub fn stack_arity(&self) -> usize {
        self.key.signature.params.len() + usize::from(self.has_receiver)
    }
}
