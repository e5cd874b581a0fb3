//! Symbolic input variables and run-scoped naming

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::sort::{Sort, Value};

/// Named leaf bound to one concrete input slot
///
/// Identity is the name: two variables with the same name within one run are
/// the same variable. `min`/`max` bound integer sorts (bool is 0..=1, char is
/// 0..=65535); they are the full `i64` range for reals and strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub sort: Sort,
    /// Concrete value the input held when the variable was introduced
    pub initial: Value,
    pub min: i64,
    pub max: i64,
}

impl Variable {
    pub fn new(name: impl Into<String>, sort: Sort, initial: Value) -> Self {
        let (min, max) = match sort {
            Sort::Int32 => (i32::MIN as i64, i32::MAX as i64),
            _ => (i64::MIN, i64::MAX),
        };
        Self {
            name: name.into(),
            sort,
            initial,
            min,
            max,
        }
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Clamp a candidate integer into the slot's representable range
    pub fn clamp_to_bounds(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    /// Natural order so `var2` sorts before `var10`
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .len()
            .cmp(&other.name.len())
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Run-scoped naming counter (`var0`, `var1`, ...)
///
/// Every run owns a fresh factory, so names never leak across runs.
#[derive(Debug, Default)]
pub struct VariableFactory {
    next: u32,
}

impl VariableFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, sort: Sort, initial: Value, min: i64, max: i64) -> Arc<Variable> {
        let name = format!("var{}", self.next);
        self.next += 1;
        Arc::new(Variable::new(name, sort, initial).with_bounds(min, max))
    }

    /// Number of variables introduced so far
    pub fn count(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_factory_names_are_sequential() {
        let mut factory = VariableFactory::new();
        let a = factory.fresh(Sort::Int32, Value::Int(1), 0, 10);
        let b = factory.fresh(Sort::Real, Value::Real(0.5), i64::MIN, i64::MAX);
        assert_eq!(a.name, "var0");
        assert_eq!(b.name, "var1");
        assert_eq!(factory.count(), 2);
    }

    #[test]
    fn test_fresh_factories_restart_naming() {
        let mut first = VariableFactory::new();
        first.fresh(Sort::Int32, Value::Int(0), 0, 0);
        let mut second = VariableFactory::new();
        assert_eq!(second.fresh(Sort::Int32, Value::Int(0), 0, 0).name, "var0");
    }

    #[test]
    fn test_natural_order() {
        let set: BTreeSet<Variable> = ["var10", "var2", "var1"]
            .iter()
            .map(|n| Variable::new(*n, Sort::Int32, Value::Int(0)))
            .collect();
        let names: Vec<_> = set.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["var1", "var2", "var10"]);
    }

    #[test]
    fn test_clamp_uses_bounds() {
        let v = Variable::new("c", Sort::Int32, Value::Int(0)).with_bounds(0, 65535);
        assert_eq!(v.clamp_to_bounds(-4), 0);
        assert_eq!(v.clamp_to_bounds(70000), 65535);
    }
}
