//! Expression DAG -> SMT-LIB2 script
//!
//! Sort mapping:
//! - `Int32` / `Int64` -> `(_ BitVec 32)` / `(_ BitVec 64)`, two's complement
//! - `Real` -> `(_ FloatingPoint 11 53)`, round-nearest-even
//! - `String` -> `String` (theory of Unicode strings)
//!
//! Every symbolic composite node becomes one `define-fun`, so shared
//! sub-expressions are written once. Nodes without variables are written as
//! literals of their observed value. Operators with no exact counterpart in
//! the target theories (transcendentals, case conversion, regex matching)
//! are approximated by their observed value as well; replay of the model
//! catches the cases where that approximation was wrong.

use rustc_hash::FxHashMap;
use std::f64::consts::PI;
use std::fmt::Write;
use std::sync::Arc;

use crate::features::expression::domain::{
    Comparator, Domain, Expr, ExprKind, Operator, Sort, Value, Variable,
};
use crate::features::path_constraint::domain::Constraint;
use crate::features::solver::domain::SolverQuery;

const RNE: &str = "RNE";

/// Complete solver input plus the variables the model is read back for
#[derive(Debug, Clone)]
pub struct Script {
    pub text: String,
    pub variables: Vec<Arc<Variable>>,
}

pub fn build_script(query: &SolverQuery) -> Script {
    let variables: Vec<Arc<Variable>> = query.variables().into_iter().collect();
    let mut lowering = Lowering::default();

    let mut asserts = Vec::with_capacity(query.len());
    for var in &variables {
        asserts.extend(bound_asserts(var));
    }
    for constraint in query.constraints() {
        asserts.push(lowering.constraint(constraint));
    }

    let mut text = String::new();
    text.push_str("(set-option :produce-models true)\n");
    text.push_str("(set-logic ALL)\n");
    for var in &variables {
        let _ = writeln!(text, "(declare-fun {} () {})", symbol(&var.name), smt_sort(var.sort));
    }
    for define in &lowering.defines {
        text.push_str(define);
        text.push('\n');
    }
    for assert in &asserts {
        let _ = writeln!(text, "(assert {})", assert);
    }
    text.push_str("(check-sat)\n");
    if !variables.is_empty() {
        let names: Vec<String> = variables.iter().map(|v| symbol(&v.name)).collect();
        let _ = writeln!(text, "(get-value ({}))", names.join(" "));
    }
    text.push_str("(exit)\n");

    Script { text, variables }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sorts and literals
// ═══════════════════════════════════════════════════════════════════════════

pub fn smt_sort(sort: Sort) -> &'static str {
    match sort {
        Sort::Int32 => "(_ BitVec 32)",
        Sort::Int64 => "(_ BitVec 64)",
        Sort::Real => "(_ FloatingPoint 11 53)",
        Sort::String => "String",
    }
}

/// Simple symbols are written bare, anything else between bars
pub fn symbol(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.$!".contains(c));
    if simple {
        name.to_string()
    } else {
        format!("|{}|", name.replace(['|', '\\'], "_"))
    }
}

fn width(sort: Sort) -> u32 {
    sort.width().unwrap_or(32)
}

pub fn int_literal(w: u32, value: i64) -> String {
    if w == 32 {
        format!("#x{:08x}", value as i32 as u32)
    } else {
        format!("#x{:016x}", value as u64)
    }
}

pub fn real_literal(value: f64) -> String {
    format!("((_ to_fp 11 53) #x{:016x})", value.to_bits())
}

pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\u{5c}"),
            ' '..='~' => out.push(c),
            _ => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
        }
    }
    out.push('"');
    out
}

fn literal(sort: Sort, value: &Value) -> String {
    match (sort, value) {
        (Sort::Int32 | Sort::Int64, Value::Int(v)) => int_literal(width(sort), *v),
        (Sort::Real, Value::Real(v)) => real_literal(*v),
        (Sort::String, Value::Str(s)) => string_literal(s),
        (sort, _) => literal(sort, &Value::default_for(sort)),
    }
}

/// Convert between integer widths
fn coerce(term: String, from: Sort, to: Sort) -> String {
    match (from, to) {
        (Sort::Int32, Sort::Int64) => format!("((_ sign_extend 32) {})", term),
        (Sort::Int64, Sort::Int32) => format!("((_ extract 31 0) {})", term),
        _ => term,
    }
}

/// Signed bit-vector -> mathematical integer
fn to_int(term: &str, w: u32) -> String {
    format!(
        "(ite (bvslt {t} {zero}) (- (bv2nat {t}) {modulus}) (bv2nat {t}))",
        t = term,
        zero = int_literal(w, 0),
        modulus = 1u128 << w
    )
}

/// Mathematical integer -> bit-vector (wrapping)
fn from_int(term: &str, w: u32) -> String {
    format!("((_ int2bv {}) {})", w, term)
}

/// Negative string positions are treated as zero
fn nat(term: &str) -> String {
    format!("(ite (< {t} 0) 0 {t})", t = term)
}

fn truth(condition: String, sort: Sort) -> String {
    let w = width(sort);
    format!("(ite {} {} {})", condition, int_literal(w, 1), int_literal(w, 0))
}

/// Saturating real -> integer conversion, NaN maps to zero
fn saturate(real: &str, sort: Sort) -> String {
    let w = width(sort);
    let (min, max) = if w == 32 {
        (i32::MIN as i64, i32::MAX as i64)
    } else {
        (i64::MIN, i64::MAX)
    };
    format!(
        "(ite (fp.isNaN {a}) {zero} (ite (fp.geq {a} {maxf}) {max} (ite (fp.leq {a} {minf}) {min} ((_ fp.to_sbv {w}) RTZ {a}))))",
        a = real,
        zero = int_literal(w, 0),
        maxf = real_literal(max as f64),
        max = int_literal(w, max),
        minf = real_literal(min as f64),
        min = int_literal(w, min),
        w = w
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Lowering
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Lowering {
    defines: Vec<String>,
    names: FxHashMap<usize, String>,
}

impl Lowering {
    /// Term of `expr` in its own sort
    fn term(&mut self, expr: &Expr) -> String {
        if !expr.contains_symbolic_variable() {
            return literal(expr.sort(), expr.concrete_value());
        }
        if let ExprKind::Variable(var) = expr.kind() {
            return symbol(&var.name);
        }
        if let Some(name) = self.names.get(&expr.node_id()) {
            return name.clone();
        }
        // Define children first; `define` then only looks one level down
        for node in expr.symbolic_post_order() {
            if !self.names.contains_key(&node.node_id()) {
                self.define(&node);
            }
        }
        match self.names.get(&expr.node_id()) {
            Some(name) => name.clone(),
            None => literal(expr.sort(), expr.concrete_value()),
        }
    }

    /// One `define-fun` for a composite whose children are already defined
    fn define(&mut self, expr: &Expr) {
        let body = match expr.kind() {
            ExprKind::Constant | ExprKind::Variable(_) => return,
            ExprKind::Unary { op, operand } => self.lower(expr, *op, &[operand]),
            ExprKind::Binary { op, left, right } => self.lower(expr, *op, &[left, right]),
            ExprKind::Nary {
                op,
                left,
                right,
                others,
            } => {
                let mut args = vec![left, right];
                args.extend(others.iter());
                self.lower(expr, *op, &args)
            }
        };
        let body = body.unwrap_or_else(|| literal(expr.sort(), expr.concrete_value()));

        let name = format!("def!{}", self.defines.len());
        self.defines.push(format!(
            "(define-fun {} () {} {})",
            name,
            smt_sort(expr.sort()),
            body
        ));
        self.names.insert(expr.node_id(), name);
    }

    /// Term of an integer child at width `sort`
    fn int_arg(&mut self, expr: &Expr, sort: Sort) -> String {
        let term = self.term(expr);
        coerce(term, expr.sort(), sort)
    }

    /// Child as a mathematical integer (string positions, code points)
    fn math_int(&mut self, expr: &Expr) -> String {
        let term = self.term(expr);
        to_int(&term, width(expr.sort()))
    }

    /// `None` when the operator is approximated by its observed value
    fn lower(&mut self, expr: &Expr, op: Operator, args: &[&Expr]) -> Option<String> {
        let sort = expr.sort();
        match sort.domain() {
            Domain::Integer => self.lower_int(sort, op, args),
            Domain::Real => self.lower_real(op, args),
            Domain::String => self.lower_string(op, args),
        }
    }

    fn lower_int(&mut self, sort: Sort, op: Operator, args: &[&Expr]) -> Option<String> {
        use Operator::*;

        let w = width(sort);
        let zero = int_literal(w, 0);
        let term = match op {
            Plus | Minus | Mul | Div | Rem | BitAnd | BitOr | BitXor => {
                let a = self.int_arg(args.first()?, sort);
                let b = self.int_arg(args.get(1)?, sort);
                let name = match op {
                    Plus => "bvadd",
                    Minus => "bvsub",
                    Mul => "bvmul",
                    Div => "bvsdiv",
                    Rem => "bvsrem",
                    BitAnd => "bvand",
                    BitOr => "bvor",
                    _ => "bvxor",
                };
                format!("({} {} {})", name, a, b)
            }
            Min | Max => {
                let a = self.int_arg(args.first()?, sort);
                let b = self.int_arg(args.get(1)?, sort);
                let test = if op == Min { "bvsle" } else { "bvsge" };
                format!("(ite ({} {a} {b}) {a} {b})", test, a = a, b = b)
            }
            Shl | Shr | UShr => {
                let a = self.int_arg(args.first()?, sort);
                let b = self.int_arg(args.get(1)?, sort);
                let name = match op {
                    Shl => "bvshl",
                    Shr => "bvashr",
                    _ => "bvlshr",
                };
                format!("({} {} (bvand {} {}))", name, a, b, int_literal(w, i64::from(w) - 1))
            }
            Neg => format!("(bvneg {})", self.int_arg(args.first()?, sort)),
            Abs => {
                let a = self.int_arg(args.first()?, sort);
                format!("(ite (bvslt {a} {z}) (bvneg {a}) {a})", a = a, z = zero)
            }
            Signum => {
                let a = self.int_arg(args.first()?, sort);
                format!(
                    "(ite (bvslt {a} {z}) {m} (ite (= {a} {z}) {z} {p}))",
                    a = a,
                    z = zero,
                    m = int_literal(w, -1),
                    p = int_literal(w, 1)
                )
            }
            Cmp => {
                let (l, r) = (args.first()?, args.get(1)?);
                let wide = Sort::promote(l.sort(), r.sort());
                let a = self.int_arg(l, wide);
                let b = self.int_arg(r, wide);
                format!(
                    "(ite (bvslt {a} {b}) {m} (ite (= {a} {b}) {z} {p}))",
                    a = a,
                    b = b,
                    z = zero,
                    m = int_literal(w, -1),
                    p = int_literal(w, 1)
                )
            }
            CmpL | CmpG => {
                let a = self.term(args.first()?);
                let b = self.term(args.get(1)?);
                let unordered = int_literal(w, if op == CmpL { -1 } else { 1 });
                format!(
                    "(ite (or (fp.isNaN {a}) (fp.isNaN {b})) {u} (ite (fp.lt {a} {b}) {m} (ite (fp.eq {a} {b}) {z} {p})))",
                    a = a,
                    b = b,
                    u = unordered,
                    z = zero,
                    m = int_literal(w, -1),
                    p = int_literal(w, 1)
                )
            }
            RealToInt => saturate(&self.term(args.first()?), sort),
            Round => {
                let a = self.term(args.first()?);
                let floor = format!(
                    "(fp.roundToIntegral RTN (fp.add {} {} {}))",
                    RNE,
                    a,
                    real_literal(0.5)
                );
                saturate(&floor, sort)
            }
            Narrow32 | Widen64 => {
                let child = args.first()?;
                let wide = if op == Widen64 { Sort::Int64 } else { Sort::Int32 };
                let t = self.int_arg(child, wide);
                coerce(t, wide, sort)
            }
            NarrowChar | NarrowShort | NarrowByte => {
                let t = self.int_arg(args.first()?, Sort::Int32);
                let narrowed = match op {
                    NarrowChar => format!("((_ zero_extend 16) ((_ extract 15 0) {}))", t),
                    NarrowShort => format!("((_ sign_extend 16) ((_ extract 15 0) {}))", t),
                    _ => format!("((_ sign_extend 24) ((_ extract 7 0) {}))", t),
                };
                coerce(narrowed, Sort::Int32, sort)
            }

            // ━━━ Strings -> integers ━━━
            Length => from_int(&format!("(str.len {})", self.term(args.first()?)), w),
            CharAt => {
                let s = self.term(args.first()?);
                let i = self.math_int(args.get(1)?);
                from_int(&format!("(str.to_code (str.at {} {}))", s, i), w)
            }
            IndexOfStr | IndexOfStrFrom => {
                let s = self.term(args.first()?);
                let t = self.term(args.get(1)?);
                let from = match args.get(2) {
                    Some(from) => nat(&self.math_int(from)),
                    None => "0".to_string(),
                };
                from_int(&format!("(str.indexof {} {} {})", s, t, from), w)
            }
            IndexOfChar | IndexOfCharFrom => {
                let s = self.term(args.first()?);
                let c = self.math_int(args.get(1)?);
                let from = match args.get(2) {
                    Some(from) => nat(&self.math_int(from)),
                    None => "0".to_string(),
                };
                from_int(&format!("(str.indexof {} (str.from_code {}) {})", s, c, from), w)
            }
            ParseInt => {
                let s = self.term(args.first()?);
                let n = format!(
                    "(ite (str.prefixof \"-\" {s}) (- (str.to_int (str.substr {s} 1 (str.len {s})))) (str.to_int {s}))",
                    s = s
                );
                from_int(&n, w)
            }

            // ━━━ Predicates ━━━
            Equals => {
                let a = self.term(args.first()?);
                let b = self.term(args.get(1)?);
                truth(format!("(= {} {})", a, b), sort)
            }
            StartsWith => {
                let s = self.term(args.first()?);
                let p = self.term(args.get(1)?);
                truth(format!("(str.prefixof {} {})", p, s), sort)
            }
            StartsWithFrom => {
                let s = self.term(args.first()?);
                let p = self.term(args.get(1)?);
                let i = self.math_int(args.get(2)?);
                truth(
                    format!(
                        "(and (>= {i} 0) (<= {i} (str.len {s})) (str.prefixof {p} (str.substr {s} {i} (- (str.len {s}) {i}))))",
                        i = i,
                        s = s,
                        p = p
                    ),
                    sort,
                )
            }
            EndsWith => {
                let s = self.term(args.first()?);
                let t = self.term(args.get(1)?);
                truth(format!("(str.suffixof {} {})", t, s), sort)
            }
            Contains => {
                let s = self.term(args.first()?);
                let t = self.term(args.get(1)?);
                truth(format!("(str.contains {} {})", s, t), sort)
            }
            IsEmpty => {
                let s = self.term(args.first()?);
                truth(format!("(= (str.len {}) 0)", s), sort)
            }
            IsDigit => {
                let child = args.first()?;
                let cw = width(child.sort());
                let c = self.term(child);
                truth(
                    format!(
                        "(and (bvsge {c} {lo}) (bvsle {c} {hi}))",
                        c = c,
                        lo = int_literal(cw, '0' as i64),
                        hi = int_literal(cw, '9' as i64)
                    ),
                    sort,
                )
            }
            IsLetter => {
                let child = args.first()?;
                let cw = width(child.sort());
                let c = self.term(child);
                let range = |lo: char, hi: char| {
                    format!(
                        "(and (bvsge {c} {lo}) (bvsle {c} {hi}))",
                        c = c,
                        lo = int_literal(cw, lo as i64),
                        hi = int_literal(cw, hi as i64)
                    )
                };
                truth(format!("(or {} {})", range('a', 'z'), range('A', 'Z')), sort)
            }

            _ => return None,
        };
        Some(term)
    }

    fn lower_real(&mut self, op: Operator, args: &[&Expr]) -> Option<String> {
        use Operator::*;

        let term = match op {
            Plus | Minus | Mul | Div => {
                let a = self.term(args.first()?);
                let b = self.term(args.get(1)?);
                let name = match op {
                    Plus => "fp.add",
                    Minus => "fp.sub",
                    Mul => "fp.mul",
                    _ => "fp.div",
                };
                format!("({} {} {} {})", name, RNE, a, b)
            }
            Min | Max => {
                let a = self.term(args.first()?);
                let b = self.term(args.get(1)?);
                let test = if op == Min { "fp.lt" } else { "fp.gt" };
                format!(
                    "(ite (or (fp.isNaN {a}) (fp.isNaN {b})) (_ NaN 11 53) (ite ({t} {a} {b}) {a} {b}))",
                    a = a,
                    b = b,
                    t = test
                )
            }
            Neg => format!("(fp.neg {})", self.term(args.first()?)),
            Abs => format!("(fp.abs {})", self.term(args.first()?)),
            Signum => {
                let a = self.term(args.first()?);
                format!(
                    "(ite (or (fp.isZero {a}) (fp.isNaN {a})) {a} (ite (fp.isPositive {a}) {one} {minus}))",
                    a = a,
                    one = real_literal(1.0),
                    minus = real_literal(-1.0)
                )
            }
            Sqrt => format!("(fp.sqrt {} {})", RNE, self.term(args.first()?)),
            Ceil | Floor | Rint => {
                let mode = match op {
                    Ceil => "RTP",
                    Floor => "RTN",
                    _ => RNE,
                };
                format!("(fp.roundToIntegral {} {})", mode, self.term(args.first()?))
            }
            ToDegrees | ToRadians => {
                let factor = if op == ToDegrees { 180.0 / PI } else { PI / 180.0 };
                format!(
                    "(fp.mul {} {} {})",
                    RNE,
                    self.term(args.first()?),
                    real_literal(factor)
                )
            }
            IntToReal => format!("((_ to_fp 11 53) {} {})", RNE, self.term(args.first()?)),
            _ => return None,
        };
        Some(term)
    }

    fn lower_string(&mut self, op: Operator, args: &[&Expr]) -> Option<String> {
        use Operator::*;

        let term = match op {
            Concat => {
                let a = self.term(args.first()?);
                let b = self.term(args.get(1)?);
                format!("(str.++ {} {})", a, b)
            }
            Substring => {
                let s = self.term(args.first()?);
                let begin = self.math_int(args.get(1)?);
                let end = self.math_int(args.get(2)?);
                format!("(str.substr {} {b} (- {} {b}))", s, end, b = begin)
            }
            SubstringFrom => {
                let s = self.term(args.first()?);
                let begin = self.math_int(args.get(1)?);
                format!("(str.substr {s} {b} (- (str.len {s}) {b}))", s = s, b = begin)
            }
            ReplaceStr => {
                let s = self.term(args.first()?);
                let target = self.term(args.get(1)?);
                let replacement = self.term(args.get(2)?);
                format!("(str.replace_all {} {} {})", s, target, replacement)
            }
            ReplaceChar => {
                let s = self.term(args.first()?);
                let from = self.math_int(args.get(1)?);
                let to = self.math_int(args.get(2)?);
                format!("(str.replace_all {} (str.from_code {}) (str.from_code {}))", s, from, to)
            }
            IntToString => {
                let n = self.math_int(args.first()?);
                format!(
                    "(ite (< {n} 0) (str.++ \"-\" (str.from_int (- {n}))) (str.from_int {n}))",
                    n = n
                )
            }
            CharToString => format!("(str.from_code {})", self.math_int(args.first()?)),
            _ => return None,
        };
        Some(term)
    }

    fn constraint(&mut self, constraint: &Constraint) -> String {
        let (left, right) = (&constraint.left, &constraint.right);
        let cmp = constraint.comparator;
        match constraint.domain() {
            Domain::Integer => {
                let sort = Sort::promote(left.sort(), right.sort());
                let a = self.int_arg(left, sort);
                let b = self.int_arg(right, sort);
                let name = match cmp {
                    Comparator::Eq => "=",
                    Comparator::Ne => return format!("(not (= {} {}))", a, b),
                    Comparator::Lt => "bvslt",
                    Comparator::Le => "bvsle",
                    Comparator::Gt => "bvsgt",
                    Comparator::Ge => "bvsge",
                };
                format!("({} {} {})", name, a, b)
            }
            Domain::Real => {
                let a = self.term(left);
                let b = self.term(right);
                let name = match cmp {
                    Comparator::Eq => "fp.eq",
                    Comparator::Ne => return format!("(not (fp.eq {} {}))", a, b),
                    Comparator::Lt => "fp.lt",
                    Comparator::Le => "fp.leq",
                    Comparator::Gt => "fp.gt",
                    Comparator::Ge => "fp.geq",
                };
                format!("({} {} {})", name, a, b)
            }
            Domain::String => {
                let a = self.term(left);
                let b = self.term(right);
                match cmp {
                    Comparator::Eq => format!("(= {} {})", a, b),
                    Comparator::Ne => format!("(not (= {} {}))", a, b),
                    Comparator::Lt => format!("(str.< {} {})", a, b),
                    Comparator::Le => format!("(str.<= {} {})", a, b),
                    Comparator::Gt => format!("(str.< {} {})", b, a),
                    Comparator::Ge => format!("(str.<= {} {})", b, a),
                }
            }
        }
    }
}

/// Declared bounds narrower than the sort (bool, char, byte, short slots)
fn bound_asserts(var: &Variable) -> Vec<String> {
    let (lo, hi) = match var.sort {
        Sort::Int32 => (i32::MIN as i64, i32::MAX as i64),
        Sort::Int64 => (i64::MIN, i64::MAX),
        _ => return Vec::new(),
    };
    let w = width(var.sort);
    let name = symbol(&var.name);
    let mut out = Vec::new();
    if var.min > lo {
        out.push(format!("(bvsge {} {})", name, int_literal(w, var.min.min(hi))));
    }
    if var.max < hi {
        out.push(format!("(bvsle {} {})", name, int_literal(w, var.max.max(lo))));
    }
    out
}
