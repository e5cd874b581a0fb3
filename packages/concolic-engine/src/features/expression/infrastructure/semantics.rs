//! Concrete operator semantics
//!
//! One definition of what every `Operator` computes, shared by the
//! evaluator (replay, in-process search) and by test harnesses that play
//! the concrete interpreter. Integers wrap at the width of the result sort,
//! reals follow IEEE-754 double rounding, and strings are indexed by
//! `char`.
//!
//! Degenerate operations (division by zero, out-of-range index, malformed
//! number) return `EvalError` rather than panicking.

use thiserror::Error;

use crate::features::expression::domain::{Operator, Sort, Value};

/// Evaluation failure mirroring a concrete fault
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("Number format: {0:?}")]
    NumberFormat(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Operator {op} expects {expected} argument(s), got {found}")]
    Arity {
        op: Operator,
        expected: usize,
        found: usize,
    },

    #[error("Operator {op} cannot produce {sort} from {found}")]
    TypeMismatch {
        op: Operator,
        sort: Sort,
        found: String,
    },
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;

// ═══════════════════════════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════════════════════════

/// Apply `op` to already evaluated arguments, producing a value of `sort`
pub fn apply(op: Operator, sort: Sort, args: &[Value]) -> EvalResult<Value> {
    use Operator::*;

    match op {
        // Arithmetic is shared between integers and reals; the result sort decides
        Plus | Minus | Mul | Div | Rem | Min | Max if sort == Sort::Real => {
            arity(op, args, 2)?;
            let (a, b) = (real(op, sort, args, 0)?, real(op, sort, args, 1)?);
            Ok(Value::Real(real_binary(op, a, b)))
        }
        Neg | Abs | Signum if sort == Sort::Real => {
            arity(op, args, 1)?;
            let a = real(op, sort, args, 0)?;
            Ok(Value::Real(real_unary(op, a)))
        }
        Plus | Minus | Mul | Div | Rem | Min | Max | BitAnd | BitOr | BitXor | Shl | Shr
        | UShr => {
            arity(op, args, 2)?;
            let (a, b) = (int(op, sort, args, 0)?, int(op, sort, args, 1)?);
            int_binary(op, sort, a, b).map(Value::Int)
        }
        Neg | Abs | Signum => {
            arity(op, args, 1)?;
            let a = int(op, sort, args, 0)?;
            Ok(Value::Int(int_unary(op, sort, a)))
        }

        Cmp => {
            arity(op, args, 2)?;
            let (a, b) = (int(op, sort, args, 0)?, int(op, sort, args, 1)?);
            Ok(Value::Int(a.cmp(&b) as i64))
        }
        CmpL | CmpG => {
            arity(op, args, 2)?;
            let (a, b) = (real(op, sort, args, 0)?, real(op, sort, args, 1)?);
            Ok(Value::Int(real_compare(op, a, b)))
        }

        // ━━━ Casts ━━━
        IntToReal => {
            arity(op, args, 1)?;
            Ok(Value::Real(int(op, sort, args, 0)? as f64))
        }
        RealToInt => {
            arity(op, args, 1)?;
            Ok(Value::Int(real_to_int(sort, real(op, sort, args, 0)?)))
        }
        Round => {
            arity(op, args, 1)?;
            Ok(Value::Int(round_half_up(sort, real(op, sort, args, 0)?)))
        }
        Narrow32 | NarrowChar | NarrowShort | NarrowByte | Widen64 => {
            arity(op, args, 1)?;
            Ok(Value::Int(narrow(op, int(op, sort, args, 0)?)))
        }

        // ━━━ Real functions ━━━
        Sqrt | Cbrt | Ceil | Floor | Rint | Sin | Cos | Tan | Asin | Acos | Atan | Exp | Log
        | Log10 | ToDegrees | ToRadians => {
            arity(op, args, 1)?;
            Ok(Value::Real(real_unary(op, real(op, sort, args, 0)?)))
        }
        Atan2 | Pow | Hypot => {
            arity(op, args, 2)?;
            let (a, b) = (real(op, sort, args, 0)?, real(op, sort, args, 1)?);
            Ok(Value::Real(real_binary(op, a, b)))
        }

        // ━━━ Strings ━━━
        Length | IsEmpty | Trim | ToLowerCase | ToUpperCase | ParseInt => {
            arity(op, args, 1)?;
            string_unary(op, sort, text(op, sort, args, 0)?)
        }
        CharAt | IndexOfChar | LastIndexOfChar | SubstringFrom => {
            arity(op, args, 2)?;
            string_int(op, text(op, sort, args, 0)?, int(op, sort, args, 1)?)
        }
        IndexOfStr | LastIndexOfStr | CompareTo | CompareToIgnoreCase | Equals
        | EqualsIgnoreCase | StartsWith | EndsWith | Contains | Matches | Concat => {
            arity(op, args, 2)?;
            string_string(op, text(op, sort, args, 0)?, text(op, sort, args, 1)?)
        }
        IndexOfCharFrom => {
            arity(op, args, 3)?;
            let s = text(op, sort, args, 0)?;
            let c = int(op, sort, args, 1)?;
            let from = int(op, sort, args, 2)?;
            Ok(Value::Int(index_of_char(s, c, from)))
        }
        IndexOfStrFrom | StartsWithFrom => {
            arity(op, args, 3)?;
            let s = text(op, sort, args, 0)?;
            let t = text(op, sort, args, 1)?;
            let from = int(op, sort, args, 2)?;
            Ok(Value::Int(if op == IndexOfStrFrom {
                index_of_str(s, t, from)
            } else {
                truth(starts_with_at(s, t, from))
            }))
        }
        Substring => {
            arity(op, args, 3)?;
            let s = text(op, sort, args, 0)?;
            let begin = int(op, sort, args, 1)?;
            let end = int(op, sort, args, 2)?;
            substring(s, begin, end).map(Value::Str)
        }
        ReplaceChar => {
            arity(op, args, 3)?;
            let s = text(op, sort, args, 0)?;
            let from = code_point(int(op, sort, args, 1)?);
            let to = code_point(int(op, sort, args, 2)?);
            Ok(Value::Str(s.chars().map(|c| if c == from { to } else { c }).collect()))
        }
        ReplaceStr => {
            arity(op, args, 3)?;
            let s = text(op, sort, args, 0)?;
            let target = text(op, sort, args, 1)?;
            let replacement = text(op, sort, args, 2)?;
            Ok(Value::Str(s.replace(target, replacement)))
        }

        // ASCII classes only, matching the solver encodings
        IsDigit | IsLetter => {
            arity(op, args, 1)?;
            let c = code_point(int(op, sort, args, 0)?);
            Ok(Value::Int(truth(if op == IsDigit {
                c.is_ascii_digit()
            } else {
                c.is_ascii_alphabetic()
            })))
        }

        IntToString => {
            arity(op, args, 1)?;
            Ok(Value::Str(int(op, sort, args, 0)?.to_string()))
        }
        RealToString => {
            arity(op, args, 1)?;
            Ok(Value::Str(real_to_string(real(op, sort, args, 0)?)))
        }
        CharToString => {
            arity(op, args, 1)?;
            Ok(Value::Str(code_point(int(op, sort, args, 0)?).to_string()))
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Argument extraction
// ═══════════════════════════════════════════════════════════════

fn arity(op: Operator, args: &[Value], expected: usize) -> EvalResult<()> {
    if args.len() != expected {
        return Err(EvalError::Arity {
            op,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn mismatch(op: Operator, sort: Sort, found: Option<&Value>) -> EvalError {
    EvalError::TypeMismatch {
        op,
        sort,
        found: found.map_or_else(|| "nothing".to_string(), |v| v.domain().to_string()),
    }
}

fn int(op: Operator, sort: Sort, args: &[Value], i: usize) -> EvalResult<i64> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| mismatch(op, sort, args.get(i)))
}

fn real(op: Operator, sort: Sort, args: &[Value], i: usize) -> EvalResult<f64> {
    args.get(i)
        .and_then(Value::as_real)
        .ok_or_else(|| mismatch(op, sort, args.get(i)))
}

fn text<'a>(op: Operator, sort: Sort, args: &'a [Value], i: usize) -> EvalResult<&'a str> {
    args.get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(op, sort, args.get(i)))
}

fn truth(b: bool) -> i64 {
    b as i64
}

/// Integer to char; invalid code points map to U+FFFD
fn code_point(c: i64) -> char {
    u32::try_from(c)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

// ═══════════════════════════════════════════════════════════════
// Integers
// ═══════════════════════════════════════════════════════════════

/// Binary integer operation at the width of `sort`
pub fn int_binary(op: Operator, sort: Sort, a: i64, b: i64) -> EvalResult<i64> {
    use Operator::*;

    if sort == Sort::Int32 {
        let (a, b) = (a as i32, b as i32);
        let r = match op {
            Plus => a.wrapping_add(b),
            Minus => a.wrapping_sub(b),
            Mul => a.wrapping_mul(b),
            Div | Rem if b == 0 => return Err(EvalError::DivisionByZero),
            Div => a.wrapping_div(b),
            Rem => a.wrapping_rem(b),
            Min => a.min(b),
            Max => a.max(b),
            BitAnd => a & b,
            BitOr => a | b,
            BitXor => a ^ b,
            Shl => a.wrapping_shl(b as u32 & 31),
            Shr => a.wrapping_shr(b as u32 & 31),
            UShr => ((a as u32) >> (b as u32 & 31)) as i32,
            _ => return Err(mismatch(op, sort, None)),
        };
        return Ok(r as i64);
    }

    let r = match op {
        Plus => a.wrapping_add(b),
        Minus => a.wrapping_sub(b),
        Mul => a.wrapping_mul(b),
        Div | Rem if b == 0 => return Err(EvalError::DivisionByZero),
        Div => a.wrapping_div(b),
        Rem => a.wrapping_rem(b),
        Min => a.min(b),
        Max => a.max(b),
        BitAnd => a & b,
        BitOr => a | b,
        BitXor => a ^ b,
        Shl => a.wrapping_shl(b as u32 & 63),
        Shr => a.wrapping_shr(b as u32 & 63),
        UShr => ((a as u64) >> (b as u32 & 63)) as i64,
        _ => return Err(mismatch(op, sort, None)),
    };
    Ok(r)
}

pub fn int_unary(op: Operator, sort: Sort, a: i64) -> i64 {
    let r = match op {
        Operator::Neg => a.wrapping_neg(),
        Operator::Abs => a.wrapping_abs(),
        Operator::Signum => a.signum(),
        _ => a,
    };
    sort.wrap(r)
}

fn narrow(op: Operator, a: i64) -> i64 {
    match op {
        Operator::Narrow32 => a as i32 as i64,
        Operator::NarrowChar => a as u16 as i64,
        Operator::NarrowShort => a as i16 as i64,
        Operator::NarrowByte => a as i8 as i64,
        _ => a,
    }
}

// ═══════════════════════════════════════════════════════════════
// Reals
// ═══════════════════════════════════════════════════════════════

pub fn real_binary(op: Operator, a: f64, b: f64) -> f64 {
    use Operator::*;

    match op {
        Plus => a + b,
        Minus => a - b,
        Mul => a * b,
        Div => a / b,
        Rem => a % b,
        Min | Max if a.is_nan() || b.is_nan() => f64::NAN,
        // -0.0 is smaller than 0.0
        Min if a == b => f64::from_bits(a.to_bits() | b.to_bits()),
        Max if a == b => f64::from_bits(a.to_bits() & b.to_bits()),
        Min => a.min(b),
        Max => a.max(b),
        Atan2 => a.atan2(b),
        Pow => a.powf(b),
        Hypot => a.hypot(b),
        _ => f64::NAN,
    }
}

pub fn real_unary(op: Operator, a: f64) -> f64 {
    use Operator::*;

    match op {
        Neg => -a,
        Abs => a.abs(),
        Signum if a == 0.0 || a.is_nan() => a,
        Signum => a.signum(),
        Sqrt => a.sqrt(),
        Cbrt => a.cbrt(),
        Ceil => a.ceil(),
        Floor => a.floor(),
        Rint => round_half_even(a),
        Sin => a.sin(),
        Cos => a.cos(),
        Tan => a.tan(),
        Asin => a.asin(),
        Acos => a.acos(),
        Atan => a.atan(),
        Exp => a.exp(),
        Log => a.ln(),
        Log10 => a.log10(),
        ToDegrees => a.to_degrees(),
        ToRadians => a.to_radians(),
        _ => f64::NAN,
    }
}

/// Three-way real comparison; NaN yields -1 for `CmpL` and 1 for `CmpG`
pub fn real_compare(op: Operator, a: f64, b: f64) -> i64 {
    match a.partial_cmp(&b) {
        Some(ordering) => ordering as i64,
        None if op == Operator::CmpL => -1,
        None => 1,
    }
}

/// Saturating conversion, NaN maps to zero
pub fn real_to_int(sort: Sort, a: f64) -> i64 {
    match sort {
        Sort::Int32 => a as i32 as i64,
        _ => a as i64,
    }
}

/// Round half towards positive infinity, then saturate
pub fn round_half_up(sort: Sort, a: f64) -> i64 {
    let floor = a.floor();
    let rounded = if a - floor >= 0.5 { floor + 1.0 } else { floor };
    real_to_int(sort, rounded)
}

fn round_half_even(a: f64) -> f64 {
    if (a - a.trunc()).abs() == 0.5 {
        2.0 * (a / 2.0).round()
    } else {
        a.round()
    }
}

/// Decimal rendering of a double: `1.0`, `0.25`, `1.0E10`, `NaN`, `-Infinity`
pub fn real_to_string(a: f64) -> String {
    if a.is_nan() {
        return "NaN".to_string();
    }
    if a.is_infinite() {
        return if a > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = a.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = format!("{:?}", a);
        return if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        };
    }
    let sci = format!("{:e}", a);
    match sci.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => sci,
    }
}

// ═══════════════════════════════════════════════════════════════
// Strings (char indexed)
// ═══════════════════════════════════════════════════════════════

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn string_unary(op: Operator, sort: Sort, s: &str) -> EvalResult<Value> {
    match op {
        Operator::Length => Ok(Value::Int(char_len(s) as i64)),
        Operator::IsEmpty => Ok(Value::Int(truth(s.is_empty()))),
        Operator::Trim => Ok(Value::Str(s.trim_matches(|c: char| c <= ' ').to_string())),
        Operator::ToLowerCase => Ok(Value::Str(s.to_lowercase())),
        Operator::ToUpperCase => Ok(Value::Str(s.to_uppercase())),
        Operator::ParseInt => parse_int(sort, s).map(Value::Int),
        _ => Err(mismatch(op, sort, None)),
    }
}

fn parse_int(sort: Sort, s: &str) -> EvalResult<i64> {
    let parsed = match sort {
        Sort::Int32 => s.parse::<i32>().map(i64::from),
        _ => s.parse::<i64>(),
    };
    parsed.map_err(|_| EvalError::NumberFormat(s.to_string()))
}

fn string_int(op: Operator, s: &str, n: i64) -> EvalResult<Value> {
    match op {
        Operator::CharAt => {
            let c = usize::try_from(n)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .ok_or(EvalError::IndexOutOfBounds {
                    index: n,
                    length: char_len(s),
                })?;
            Ok(Value::Int(c as i64))
        }
        Operator::IndexOfChar => Ok(Value::Int(index_of_char(s, n, 0))),
        Operator::LastIndexOfChar => {
            let target = code_point(n);
            let chars: Vec<char> = s.chars().collect();
            let found = chars.iter().rposition(|c| *c == target);
            Ok(Value::Int(found.map_or(-1, |i| i as i64)))
        }
        Operator::SubstringFrom => substring(s, n, char_len(s) as i64).map(Value::Str),
        _ => Err(mismatch(op, Sort::String, None)),
    }
}

fn string_string(op: Operator, a: &str, b: &str) -> EvalResult<Value> {
    use Operator::*;

    let v = match op {
        IndexOfStr => index_of_str(a, b, 0),
        LastIndexOfStr => last_index_of_str(a, b),
        CompareTo => compare_to(a.chars(), b.chars()),
        CompareToIgnoreCase => compare_to(a.chars().map(fold_case), b.chars().map(fold_case)),
        Equals => truth(a == b),
        EqualsIgnoreCase => truth(
            char_len(a) == char_len(b) && a.chars().map(fold_case).eq(b.chars().map(fold_case)),
        ),
        StartsWith => truth(a.starts_with(b)),
        EndsWith => truth(a.ends_with(b)),
        Contains => truth(a.contains(b)),
        Matches => truth(full_match(a, b)?),
        Concat => return Ok(Value::Str(format!("{}{}", a, b))),
        _ => return Err(mismatch(op, Sort::Int32, None)),
    };
    Ok(Value::Int(v))
}

fn fold_case(c: char) -> char {
    let upper = c.to_uppercase().next().unwrap_or(c);
    upper.to_lowercase().next().unwrap_or(upper)
}

/// Lexicographic difference of the first mismatching chars, else of lengths
fn compare_to(a: impl Iterator<Item = char>, b: impl Iterator<Item = char>) -> i64 {
    let a: Vec<char> = a.collect();
    let b: Vec<char> = b.collect();
    for (x, y) in a.iter().zip(b.iter()) {
        if x != y {
            return *x as i64 - *y as i64;
        }
    }
    a.len() as i64 - b.len() as i64
}

fn index_of_char(s: &str, c: i64, from: i64) -> i64 {
    let target = code_point(c);
    let from = from.max(0) as usize;
    s.chars()
        .enumerate()
        .skip(from)
        .find(|(_, ch)| *ch == target)
        .map_or(-1, |(i, _)| i as i64)
}

fn index_of_str(s: &str, t: &str, from: i64) -> i64 {
    let chars: Vec<char> = s.chars().collect();
    let needle: Vec<char> = t.chars().collect();
    let from = from.max(0) as usize;
    if from > chars.len() {
        return if needle.is_empty() { chars.len() as i64 } else { -1 };
    }
    if needle.is_empty() {
        return from as i64;
    }
    (from..chars.len())
        .find(|&i| chars[i..].starts_with(&needle))
        .map_or(-1, |i| i as i64)
}

fn last_index_of_str(s: &str, t: &str) -> i64 {
    let chars: Vec<char> = s.chars().collect();
    let needle: Vec<char> = t.chars().collect();
    if needle.len() > chars.len() {
        return -1;
    }
    (0..=chars.len() - needle.len())
        .rev()
        .find(|&i| chars[i..].starts_with(&needle))
        .map_or(-1, |i| i as i64)
}

fn starts_with_at(s: &str, prefix: &str, offset: i64) -> bool {
    let Ok(offset) = usize::try_from(offset) else {
        return false;
    };
    let chars: Vec<char> = s.chars().collect();
    let prefix: Vec<char> = prefix.chars().collect();
    offset <= chars.len() && chars[offset..].starts_with(&prefix)
}

fn substring(s: &str, begin: i64, end: i64) -> EvalResult<String> {
    let length = char_len(s);
    if begin < 0 || end > length as i64 || begin > end {
        return Err(EvalError::IndexOutOfBounds {
            index: if begin < 0 || begin > end { begin } else { end },
            length,
        });
    }
    Ok(s.chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect())
}

fn full_match(s: &str, pattern: &str) -> EvalResult<bool> {
    let anchored = format!("^(?:{})$", pattern);
    let re = regex::Regex::new(&anchored)
        .map_err(|e| EvalError::InvalidPattern(e.to_string()))?;
    Ok(re.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_args(a: i64, b: i64) -> Vec<Value> {
        vec![Value::Int(a), Value::Int(b)]
    }

    #[test]
    fn test_character_classes_are_ascii() {
        let class = |op, c: char| apply(op, Sort::Int32, &[Value::Int(c as i64)]).unwrap();
        assert_eq!(class(Operator::IsDigit, '7'), Value::Int(1));
        assert_eq!(class(Operator::IsLetter, 'q'), Value::Int(1));
        for c in ['½', '²', '٣'] {
            assert_eq!(class(Operator::IsDigit, c), Value::Int(0), "{}", c);
        }
        for c in ['é', 'ß', 'λ'] {
            assert_eq!(class(Operator::IsLetter, c), Value::Int(0), "{}", c);
        }
    }

    #[test]
    fn test_int32_wraparound() {
        let r = apply(Operator::Plus, Sort::Int32, &int_args(i32::MAX as i64, 1)).unwrap();
        assert_eq!(r, Value::Int(i32::MIN as i64));
        let r = apply(Operator::Mul, Sort::Int64, &int_args(i64::MAX, 2)).unwrap();
        assert_eq!(r, Value::Int(-2));
    }

    #[test]
    fn test_division_by_zero_is_degenerate() {
        let err = apply(Operator::Div, Sort::Int32, &int_args(1, 0)).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
        // reals do not fault
        let r = apply(
            Operator::Div,
            Sort::Real,
            &[Value::Real(1.0), Value::Real(0.0)],
        )
        .unwrap();
        assert_eq!(r, Value::Real(f64::INFINITY));
    }

    #[test]
    fn test_shift_masks_count() {
        assert_eq!(int_binary(Operator::Shl, Sort::Int32, 1, 33).unwrap(), 2);
        assert_eq!(int_binary(Operator::UShr, Sort::Int32, -1, 28).unwrap(), 15);
        assert_eq!(int_binary(Operator::Shr, Sort::Int64, -16, 2).unwrap(), -4);
    }

    #[test]
    fn test_abs_of_min_value_wraps() {
        assert_eq!(
            int_unary(Operator::Abs, Sort::Int32, i32::MIN as i64),
            i32::MIN as i64
        );
        assert_eq!(int_unary(Operator::Abs, Sort::Int32, -7), 7);
    }

    #[test]
    fn test_real_conversions() {
        assert_eq!(real_to_int(Sort::Int32, f64::NAN), 0);
        assert_eq!(real_to_int(Sort::Int32, 1e20), i32::MAX as i64);
        assert_eq!(round_half_up(Sort::Int64, -2.5), -2);
        assert_eq!(round_half_up(Sort::Int64, 2.5), 3);
        assert_eq!(round_half_up(Sort::Int64, 0.49999999999999994), 0);
        assert_eq!(real_unary(Operator::Rint, 2.5), 2.0);
        assert_eq!(real_unary(Operator::Rint, 3.5), 4.0);
        assert_eq!(real_compare(Operator::CmpL, f64::NAN, 0.0), -1);
        assert_eq!(real_compare(Operator::CmpG, f64::NAN, 0.0), 1);
    }

    #[test]
    fn test_real_min_signed_zero() {
        let r = real_binary(Operator::Min, 0.0, -0.0);
        assert!(r == 0.0 && r.is_sign_negative());
        assert!(real_binary(Operator::Max, 1.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_real_to_string() {
        assert_eq!(real_to_string(1.0), "1.0");
        assert_eq!(real_to_string(0.25), "0.25");
        assert_eq!(real_to_string(1e10), "1.0E10");
        assert_eq!(real_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_operations_are_char_indexed() {
        let s = Value::from("héllo");
        assert_eq!(
            apply(Operator::Length, Sort::Int32, &[s.clone()]).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            apply(Operator::CharAt, Sort::Int32, &[s.clone(), Value::Int(1)]).unwrap(),
            Value::Int('é' as i64)
        );
        assert_eq!(
            apply(
                Operator::Substring,
                Sort::String,
                &[s.clone(), Value::Int(1), Value::Int(3)]
            )
            .unwrap(),
            Value::from("él")
        );
        assert!(matches!(
            apply(Operator::CharAt, Sort::Int32, &[s, Value::Int(9)]),
            Err(EvalError::IndexOutOfBounds { index: 9, length: 5 })
        ));
    }

    #[test]
    fn test_string_predicates() {
        let check = |op, a: &str, b: &str| {
            apply(op, Sort::Int32, &[Value::from(a), Value::from(b)]).unwrap()
        };
        assert_eq!(check(Operator::StartsWith, "abc", "a"), Value::Int(1));
        assert_eq!(check(Operator::EndsWith, "abc", "a"), Value::Int(0));
        assert_eq!(check(Operator::EqualsIgnoreCase, "AbC", "aBc"), Value::Int(1));
        assert_eq!(check(Operator::CompareTo, "abc", "abd"), Value::Int(-1));
        assert_eq!(check(Operator::CompareTo, "ab", "abcd"), Value::Int(-2));
        assert_eq!(check(Operator::Matches, "a1", "[a-z][0-9]"), Value::Int(1));
        assert_eq!(check(Operator::Matches, "a1x", "[a-z][0-9]"), Value::Int(0));
        assert_eq!(check(Operator::IndexOfStr, "banana", "na"), Value::Int(2));
        assert_eq!(check(Operator::LastIndexOfStr, "banana", "na"), Value::Int(4));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(
            apply(Operator::ParseInt, Sort::Int32, &[Value::from("-42")]).unwrap(),
            Value::Int(-42)
        );
        assert!(matches!(
            apply(Operator::ParseInt, Sort::Int32, &[Value::from("4x")]),
            Err(EvalError::NumberFormat(_))
        ));
        assert!(apply(Operator::ParseInt, Sort::Int32, &[Value::from("3000000000")]).is_err());
    }

    #[test]
    fn test_trim_and_replace() {
        assert_eq!(
            apply(Operator::Trim, Sort::String, &[Value::from("\t ab \n")]).unwrap(),
            Value::from("ab")
        );
        assert_eq!(
            apply(
                Operator::ReplaceChar,
                Sort::String,
                &[Value::from("a-b-c"), Value::Int('-' as i64), Value::Int('+' as i64)]
            )
            .unwrap(),
            Value::from("a+b+c")
        );
    }

    #[test]
    fn test_arity_checked() {
        assert!(matches!(
            apply(Operator::Plus, Sort::Int32, &[Value::Int(1)]),
            Err(EvalError::Arity { expected: 2, found: 1, .. })
        ));
    }
}
