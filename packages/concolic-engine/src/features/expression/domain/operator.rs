//! Operator and comparator tags
//!
//! Operators are domain-agnostic tags: `Plus` over an `Int32` node wraps at
//! 32 bits, over a `Real` node it rounds as IEEE-754 double. The node's sort
//! decides.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator tag of a composite expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // ━━━ Arithmetic (integer and real) ━━━
    Plus,
    Minus,
    Mul,
    Div,
    Rem,
    Neg,
    Abs,
    Min,
    Max,
    Signum,

    // ━━━ Bitwise (integer) ━━━
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,

    // ━━━ Three-way comparisons producing -1/0/1 ━━━
    /// Integer compare
    Cmp,
    /// Real compare, NaN yields -1
    CmpL,
    /// Real compare, NaN yields 1
    CmpG,

    // ━━━ Casts ━━━
    IntToReal,
    RealToInt,
    Round,
    Narrow32,
    NarrowChar,
    NarrowShort,
    NarrowByte,
    Widen64,

    // ━━━ Real functions ━━━
    Sqrt,
    Cbrt,
    Ceil,
    Floor,
    Rint,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Exp,
    Log,
    Log10,
    Pow,
    Hypot,
    ToDegrees,
    ToRadians,

    // ━━━ String -> integer ━━━
    Length,
    CharAt,
    IndexOfChar,
    IndexOfStr,
    IndexOfCharFrom,
    IndexOfStrFrom,
    LastIndexOfChar,
    LastIndexOfStr,
    CompareTo,
    CompareToIgnoreCase,
    ParseInt,
    IsEmpty,

    // ━━━ String comparisons (integer 0/1) ━━━
    Equals,
    EqualsIgnoreCase,
    StartsWith,
    StartsWithFrom,
    EndsWith,
    Contains,
    Matches,

    // ━━━ Character predicates (integer 0/1) ━━━
    IsDigit,
    IsLetter,

    // ━━━ String producers ━━━
    Concat,
    Substring,
    SubstringFrom,
    ReplaceChar,
    ReplaceStr,
    ToLowerCase,
    ToUpperCase,
    Trim,
    IntToString,
    RealToString,
    CharToString,
}

impl Operator {
    /// Lower-case mnemonic used in displays and SMT comments
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Signum => "signum",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Cmp => "cmp",
            Self::CmpL => "cmpl",
            Self::CmpG => "cmpg",
            Self::IntToReal => "i2r",
            Self::RealToInt => "r2i",
            Self::Round => "round",
            Self::Narrow32 => "l2i",
            Self::NarrowChar => "i2c",
            Self::NarrowShort => "i2s",
            Self::NarrowByte => "i2b",
            Self::Widen64 => "i2l",
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Rint => "rint",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Pow => "pow",
            Self::Hypot => "hypot",
            Self::ToDegrees => "toDegrees",
            Self::ToRadians => "toRadians",
            Self::Length => "length",
            Self::CharAt => "charAt",
            Self::IndexOfChar => "indexOfC",
            Self::IndexOfStr => "indexOfS",
            Self::IndexOfCharFrom => "indexOfCI",
            Self::IndexOfStrFrom => "indexOfSI",
            Self::LastIndexOfChar => "lastIndexOfC",
            Self::LastIndexOfStr => "lastIndexOfS",
            Self::CompareTo => "compareTo",
            Self::CompareToIgnoreCase => "compareToIgnoreCase",
            Self::ParseInt => "parseInt",
            Self::IsEmpty => "isEmpty",
            Self::Equals => "equals",
            Self::EqualsIgnoreCase => "equalsIgnoreCase",
            Self::StartsWith => "startsWith",
            Self::StartsWithFrom => "startsWithFrom",
            Self::EndsWith => "endsWith",
            Self::Contains => "contains",
            Self::Matches => "matches",
            Self::IsDigit => "isDigit",
            Self::IsLetter => "isLetter",
            Self::Concat => "concat",
            Self::Substring => "substring",
            Self::SubstringFrom => "substringFrom",
            Self::ReplaceChar => "replaceC",
            Self::ReplaceStr => "replaceCS",
            Self::ToLowerCase => "toLowerCase",
            Self::ToUpperCase => "toUpperCase",
            Self::Trim => "trim",
            Self::IntToString => "intToString",
            Self::RealToString => "realToString",
            Self::CharToString => "charToString",
        }
    }

    /// Infix operators render as `(a op b)`, the rest as `op(a, b)`
    pub fn is_infix(&self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Mul
                | Self::Div
                | Self::Rem
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor
                | Self::Shl
                | Self::Shr
                | Self::UShr
        )
    }

    /// Operators whose result is a 0/1 truth value
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::EqualsIgnoreCase
                | Self::StartsWith
                | Self::StartsWithFrom
                | Self::EndsWith
                | Self::Contains
                | Self::Matches
                | Self::IsEmpty
                | Self::IsDigit
                | Self::IsLetter
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Comparison operators for constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl Comparator {
    /// Logical negation: `!(a < b)` is `a >= b`
    pub fn negate(&self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    /// Operand swap: `a < b` is `b > a`
    pub fn swap(&self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }

    pub fn holds_int(&self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }

    /// IEEE comparison: every ordered comparison with NaN is false, `!=` is true
    pub fn holds_real(&self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate_is_involution() {
        for cmp in [
            Comparator::Eq,
            Comparator::Ne,
            Comparator::Lt,
            Comparator::Le,
            Comparator::Gt,
            Comparator::Ge,
        ] {
            assert_eq!(cmp.negate().negate(), cmp);
            for (l, r) in [(1, 2), (2, 2), (3, 2)] {
                assert_ne!(cmp.holds_int(l, r), cmp.negate().holds_int(l, r));
                assert_eq!(cmp.holds_int(l, r), cmp.swap().holds_int(r, l));
            }
        }
    }

    #[test]
    fn test_nan_comparisons() {
        assert!(!Comparator::Lt.holds_real(f64::NAN, 1.0));
        assert!(!Comparator::Eq.holds_real(f64::NAN, f64::NAN));
        assert!(Comparator::Ne.holds_real(f64::NAN, f64::NAN));
    }

    #[test]
    fn test_operator_classes() {
        assert!(Operator::Plus.is_infix());
        assert!(!Operator::Abs.is_infix());
        assert!(Operator::StartsWith.is_predicate());
        assert!(!Operator::Length.is_predicate());
    }
}
