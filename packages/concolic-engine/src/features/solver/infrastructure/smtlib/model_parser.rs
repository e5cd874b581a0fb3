//! Solver response -> outcome
//!
//! The first s-expression decides: `sat` is followed by a `get-value` model,
//! `unsat` is final, `unknown` means the solver gave up (treated as a
//! timeout), and `(error ...)` is a backend failure.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::sexpr::{parse_all, SExpr};
use crate::features::expression::domain::{Sort, Value, Variable};
use crate::features::solver::domain::{Solution, SolverError, SolverOutcome, SolverResult};

pub fn parse_response(output: &str, variables: &[Arc<Variable>]) -> SolverResult<SolverOutcome> {
    let items = parse_all(output)?;
    let first = items
        .first()
        .ok_or_else(|| SolverError::Parse("empty solver output".to_string()))?;

    match first {
        SExpr::Atom(status) if status == "sat" => {
            let model = match items.get(1) {
                Some(model) => model,
                None if variables.is_empty() => return Ok(SolverOutcome::Sat(Solution::new())),
                None => return Err(SolverError::Parse("'sat' without a model".to_string())),
            };
            read_model(model, variables).map(SolverOutcome::Sat)
        }
        SExpr::Atom(status) if status == "unsat" => Ok(SolverOutcome::Unsat),
        SExpr::Atom(status) if status == "unknown" || status == "timeout" => {
            Err(SolverError::Timeout)
        }
        SExpr::List(items) if items.first().and_then(SExpr::as_atom) == Some("error") => {
            let message = match items.get(1) {
                Some(SExpr::Str(s)) | Some(SExpr::Atom(s)) => s.clone(),
                _ => "unspecified solver error".to_string(),
            };
            Err(SolverError::Backend(message))
        }
        other => Err(SolverError::Parse(format!("unexpected solver response: {:?}", other))),
    }
}

fn read_model(model: &SExpr, variables: &[Arc<Variable>]) -> SolverResult<Solution> {
    let pairs = model
        .as_list()
        .ok_or_else(|| SolverError::Parse(format!("model is not a list: {:?}", model)))?;
    let mut values: FxHashMap<&str, &SExpr> = FxHashMap::default();
    for pair in pairs {
        if let Some([SExpr::Atom(name), value]) = pair.as_list() {
            values.insert(name.as_str(), value);
        }
    }

    let mut solution = Solution::new();
    for var in variables {
        // Unmentioned variables are unconstrained; the bridge fills them in
        let Some(raw) = values.get(var.name.as_str()) else {
            continue;
        };
        let value = decode(raw, var.sort).ok_or_else(|| {
            SolverError::Parse(format!(
                "cannot read {:?} as {} for {}",
                raw, var.sort, var.name
            ))
        })?;
        solution.insert(var.name.clone(), value);
    }
    Ok(solution)
}

fn decode(raw: &SExpr, sort: Sort) -> Option<Value> {
    match sort {
        Sort::Int32 => decode_bitvector(raw, 32).map(Value::Int),
        Sort::Int64 => decode_bitvector(raw, 64).map(Value::Int),
        Sort::Real => decode_float(raw).map(Value::Real),
        Sort::String => match raw {
            SExpr::Str(s) => Some(Value::Str(unescape(s))),
            _ => None,
        },
    }
}

/// Bits of a `#x`/`#b` literal
fn literal_bits(atom: &str) -> Option<u128> {
    if let Some(hex) = atom.strip_prefix("#x") {
        u128::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = atom.strip_prefix("#b") {
        u128::from_str_radix(bin, 2).ok()
    } else {
        None
    }
}

/// Two's-complement reading at `width`
fn decode_bitvector(raw: &SExpr, width: u32) -> Option<i64> {
    let bits = match raw {
        SExpr::Atom(atom) => literal_bits(atom)?,
        // (_ bvN w)
        SExpr::List(items) => {
            let digits = items.get(1)?.as_atom()?.strip_prefix("bv")?;
            if items.first()?.as_atom()? != "_" {
                return None;
            }
            digits.parse::<u128>().ok()?
        }
        SExpr::Str(_) => return None,
    };
    let modulus = 1u128 << width;
    let bits = bits % modulus;
    let signed = if bits >= modulus >> 1 {
        bits as i128 - modulus as i128
    } else {
        bits as i128
    };
    i64::try_from(signed).ok()
}

fn decode_float(raw: &SExpr) -> Option<f64> {
    let items = raw.as_list()?;
    match items.first()? {
        // (fp sign exponent significand)
        SExpr::Atom(head) if head == "fp" => {
            let sign = literal_bits(items.get(1)?.as_atom()?)?;
            let exponent = literal_bits(items.get(2)?.as_atom()?)?;
            let significand = literal_bits(items.get(3)?.as_atom()?)?;
            let bits = (sign << 63) | (exponent << 52) | significand;
            Some(f64::from_bits(u64::try_from(bits).ok()?))
        }
        // (_ +zero 11 53) and friends
        SExpr::Atom(head) if head == "_" => match items.get(1)?.as_atom()? {
            "+zero" => Some(0.0),
            "-zero" => Some(-0.0),
            "+oo" => Some(f64::INFINITY),
            "-oo" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            _ => None,
        },
        // ((_ to_fp 11 53) #x...)
        SExpr::List(head) if head.get(1).and_then(SExpr::as_atom) == Some("to_fp") => {
            let bits = literal_bits(items.get(1)?.as_atom()?)?;
            Some(f64::from_bits(u64::try_from(bits).ok()?))
        }
        _ => None,
    }
}

/// Decode `\u{X}`, `\uXXXX` and `\xNN` escapes; malformed escapes stay literal
pub fn unescape(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            if let Some((c, consumed)) = read_escape(&chars[i + 1..]) {
                out.push(c);
                i += 1 + consumed;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Escaped char and the number of chars consumed after the backslash
fn read_escape(rest: &[char]) -> Option<(char, usize)> {
    let hex = |digits: &[char]| -> Option<char> {
        let text: String = digits.iter().collect();
        char::from_u32(u32::from_str_radix(&text, 16).ok()?)
    };
    match rest.first()? {
        'u' if rest.get(1) == Some(&'{') => {
            let close = rest.iter().position(|c| *c == '}')?;
            if close <= 2 || close > 7 {
                return None;
            }
            Some((hex(&rest[2..close])?, close + 1))
        }
        'u' if rest.len() >= 5 => Some((hex(&rest[1..5])?, 5)),
        'x' if rest.len() >= 3 => Some((hex(&rest[1..3])?, 3)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::VariableFactory;

    fn vars() -> Vec<Arc<Variable>> {
        let mut f = VariableFactory::new();
        vec![
            f.fresh(Sort::Int32, Value::Int(0), i32::MIN as i64, i32::MAX as i64),
            f.fresh(Sort::Real, Value::Real(0.0), i64::MIN, i64::MAX),
            f.fresh(Sort::String, Value::from(""), i64::MIN, i64::MAX),
            f.fresh(Sort::Int64, Value::Int(0), i64::MIN, i64::MAX),
        ]
    }

    #[test]
    fn test_sat_model() {
        let output = "sat\n((var0 #xfffffffe)\n (var1 (fp #b0 #b01111111111 #x0000000000000))\n (var2 \"a\\u{62}\"\"\")\n (var3 (_ bv7 64)))\n";
        let outcome = parse_response(output, &vars()).unwrap();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.int("var0"), Some(-2));
        assert_eq!(solution.real("var1"), Some(1.0));
        assert_eq!(solution.string("var2"), Some("ab\""));
        assert_eq!(solution.int("var3"), Some(7));
    }

    #[test]
    fn test_special_floats() {
        let nan = SExpr::List(vec![
            SExpr::Atom("_".into()),
            SExpr::Atom("NaN".into()),
            SExpr::Atom("11".into()),
            SExpr::Atom("53".into()),
        ]);
        assert!(decode_float(&nan).unwrap().is_nan());
        let neg_zero = parse_all("(_ -zero 11 53)").unwrap();
        assert!(decode_float(&neg_zero[0]).unwrap().is_sign_negative());
    }

    #[test]
    fn test_statuses() {
        assert_eq!(parse_response("unsat\n", &vars()), Ok(SolverOutcome::Unsat));
        assert_eq!(parse_response("unknown\n", &vars()), Err(SolverError::Timeout));
        assert_eq!(
            parse_response("(error \"line 1: bad sort\")\n", &vars()),
            Err(SolverError::Backend("line 1: bad sort".to_string()))
        );
        assert!(matches!(parse_response("", &vars()), Err(SolverError::Parse(_))));
        assert!(matches!(parse_response("hello\n", &vars()), Err(SolverError::Parse(_))));
    }

    #[test]
    fn test_sort_mismatch_is_parse_error() {
        let result = parse_response("sat\n((var0 \"oops\"))\n", &vars());
        assert!(matches!(result, Err(SolverError::Parse(_))));
    }

    #[test]
    fn test_unescape_forms() {
        assert_eq!(unescape("\\u{48}\\u0069\\x21"), "Hi!");
        assert_eq!(unescape("\\q\\u{zz}"), "\\q\\u{zz}");
    }
}
