//! Solver answers

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::features::expression::domain::Value;
use crate::features::expression::infrastructure::semantics::real_to_string;
use crate::features::expression::infrastructure::Assignment;

/// Variable name -> concrete value satisfying every constraint of a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    values: Assignment,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn real(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_real)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// View as an evaluator assignment (for replay)
    pub fn assignment(&self) -> &Assignment {
        &self.values
    }

    /// JSON object for the test-patch step; non-finite reals become strings
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::new();
        for (name, value) in &self.values {
            let v = match value {
                Value::Int(i) => json!(i),
                Value::Real(r) if r.is_finite() => json!(r),
                Value::Real(r) => json!(real_to_string(*r)),
                Value::Str(s) => json!(s),
            };
            map.insert(name.clone(), v);
        }
        serde_json::Value::Object(map)
    }
}

impl From<Assignment> for Solution {
    fn from(values: Assignment) -> Self {
        Self { values }
    }
}

/// Definitive answer of a backend
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    Sat(Solution),
    /// The targeted alternative is infeasible
    Unsat,
}

impl SolverOutcome {
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Sat(s) => Some(s),
            Self::Unsat => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Self::Sat(s) => Some(s),
            Self::Unsat => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut s = Solution::new();
        s.insert("var0", Value::Int(5));
        s.insert("var1", Value::from("ab"));
        assert_eq!(s.int("var0"), Some(5));
        assert_eq!(s.string("var1"), Some("ab"));
        assert_eq!(s.real("var0"), None);
        assert!(!s.contains("var2"));
    }

    #[test]
    fn test_to_json() {
        let mut s = Solution::new();
        s.insert("var0", Value::Int(-3));
        s.insert("var1", Value::Real(f64::NAN));
        s.insert("var2", Value::from("x"));
        assert_eq!(
            s.to_json(),
            json!({"var0": -3, "var1": "NaN", "var2": "x"})
        );
    }

    #[test]
    fn test_serde_is_transparent() {
        let mut s = Solution::new();
        s.insert("var0", Value::Int(1));
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"var0":1}"#);
    }
}
