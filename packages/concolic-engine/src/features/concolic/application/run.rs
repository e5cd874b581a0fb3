/*
 * Concolic Run
 *
 * One run of one candidate test. The first internal-consistency fault
 * poisons the run: every later hook reports that same fault and `finish`
 * refuses to hand out the path condition, since nothing collected after a
 * desynchronization is sound.
 */

use std::time::Instant;
use tracing::{debug, warn};

use super::interpreter::ShadowInterpreter;
use crate::config::ConcolicConfig;
use crate::errors::{ConcolicError, Result};
use crate::features::concolic::domain::{
    CastOp, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering, RealBinOp, RealUnOp, RunResult,
};
use crate::features::concolic::ports::ShadowHooks;
use crate::features::environment::domain::{ConcreteValue, ObjectHandle};
use crate::features::expression::domain::Comparator;
use crate::features::path_constraint::domain::BranchSite;
use crate::features::shadow::domain::FunctionKey;
use crate::features::shadow::ShadowCatalogue;

pub struct ConcolicRun<'c> {
    interpreter: ShadowInterpreter<'c>,
    fault: Option<ConcolicError>,
    started: Instant,
}

impl ConcolicRun<'static> {
    pub fn new(config: &ConcolicConfig) -> Self {
        Self::with_catalogue(config, ShadowCatalogue::shared())
    }
}

impl<'c> ConcolicRun<'c> {
    pub fn with_catalogue(config: &ConcolicConfig, catalogue: &'c ShadowCatalogue) -> Self {
        debug!(
            max_path_constraints = config.max_path_constraints,
            max_constraint_size = config.max_constraint_size,
            lazy_field_variables = config.lazy_field_variables,
            "concolic run started"
        );
        Self {
            interpreter: ShadowInterpreter::with_catalogue(config, catalogue),
            fault: None,
            started: Instant::now(),
        }
    }

    pub fn interpreter(&self) -> &ShadowInterpreter<'c> {
        &self.interpreter
    }

    pub fn is_poisoned(&self) -> bool {
        self.fault.is_some()
    }

    /// First fault raised by the run
    pub fn fault(&self) -> Option<&ConcolicError> {
        self.fault.as_ref()
    }

    /// Path condition and inputs of a run that stayed in lock-step
    pub fn finish(self) -> Result<RunResult> {
        if let Some(fault) = self.fault {
            warn!(error = %fault, "discarding poisoned concolic run");
            return Err(ConcolicError::RunPoisoned(fault.to_string()));
        }
        let result = self.interpreter.finish();
        debug!(
            conditions = result.path_condition.len(),
            variables = result.variables.len(),
            ignored = result.ignored_branches,
            oversized = result.oversized_branches,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "concolic run finished"
        );
        Ok(result)
    }

    fn guard(&mut self, step: impl FnOnce(&mut ShadowInterpreter<'c>) -> Result<()>) -> Result<()> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        step(&mut self.interpreter).map_err(|e| {
            warn!(error = %e, "concolic run lost lock-step");
            self.fault = Some(e.clone());
            e
        })
    }
}

impl ShadowHooks for ConcolicRun<'_> {
    fn introduce_input(&mut self, kind: InputKind, concrete: ConcreteValue) -> Result<()> {
        self.guard(|i| i.introduce_input(kind, concrete))
    }

    fn push_constant(&mut self, value: ConcreteValue) -> Result<()> {
        self.guard(|i| i.push_constant(value))
    }

    fn load_local(&mut self, index: usize) -> Result<()> {
        self.guard(|i| i.load_local(index))
    }

    fn store_local(&mut self, index: usize) -> Result<()> {
        self.guard(|i| i.store_local(index))
    }

    fn increment_local(&mut self, index: usize, delta: i32) -> Result<()> {
        self.guard(|i| i.increment_local(index, delta))
    }

    fn pop(&mut self) -> Result<()> {
        self.guard(|i| i.pop())
    }

    fn dup(&mut self) -> Result<()> {
        self.guard(|i| i.dup())
    }

    fn int_binary(&mut self, op: IntBinOp, wide: bool) -> Result<()> {
        self.guard(|i| i.int_binary(op, wide))
    }

    fn int_unary(&mut self, op: IntUnOp, wide: bool) -> Result<()> {
        self.guard(|i| i.int_unary(op, wide))
    }

    fn real_binary(&mut self, op: RealBinOp) -> Result<()> {
        self.guard(|i| i.real_binary(op))
    }

    fn real_unary(&mut self, op: RealUnOp) -> Result<()> {
        self.guard(|i| i.real_unary(op))
    }

    fn cast(&mut self, op: CastOp) -> Result<()> {
        self.guard(|i| i.cast(op))
    }

    fn int_compare(&mut self) -> Result<()> {
        self.guard(|i| i.int_compare())
    }

    fn real_compare(&mut self, nan: NanOrdering) -> Result<()> {
        self.guard(|i| i.real_compare(nan))
    }

    fn branch_zero(&mut self, site: BranchSite, cmp: Comparator) -> Result<()> {
        self.guard(|i| i.branch_zero(site, cmp))
    }

    fn branch_compare(&mut self, site: BranchSite, cmp: Comparator) -> Result<()> {
        self.guard(|i| i.branch_compare(site, cmp))
    }

    fn branch_null(&mut self, site: BranchSite) -> Result<()> {
        self.guard(|i| i.branch_null(site))
    }

    fn get_field(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()> {
        self.guard(|i| i.get_field(class, field, descriptor, value))
    }

    fn put_field(&mut self, class: &str, field: &str) -> Result<()> {
        self.guard(|i| i.put_field(class, field))
    }

    fn get_static(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()> {
        self.guard(|i| i.get_static(class, field, descriptor, value))
    }

    fn put_static(&mut self, class: &str, field: &str) -> Result<()> {
        self.guard(|i| i.put_static(class, field))
    }

    fn new_object(&mut self, handle: ObjectHandle) -> Result<()> {
        self.guard(|i| i.new_object(handle))
    }

    fn method_begin(&mut self, method: &MethodId, max_locals: usize) -> Result<()> {
        self.guard(|i| i.method_begin(method, max_locals))
    }

    fn method_param(&mut self, index: usize, value: ConcreteValue) -> Result<()> {
        self.guard(|i| i.method_param(index, value))
    }

    fn method_return(&mut self, has_value: bool) -> Result<()> {
        self.guard(|i| i.method_return(has_value))
    }

    fn invoke(&mut self, key: &FunctionKey, has_receiver: bool) -> Result<()> {
        self.guard(|i| i.invoke(key, has_receiver))
    }

    fn call_result(&mut self, key: &FunctionKey, ret: Option<ConcreteValue>) -> Result<()> {
        self.guard(|i| i.call_result(key, ret))
    }

    fn call_exception(&mut self, key: &FunctionKey) -> Result<()> {
        self.guard(|i| i.call_exception(key))
    }

    fn exception_unwind(&mut self, depth: usize, exception: ConcreteValue) -> Result<()> {
        self.guard(|i| i.exception_unwind(depth, exception))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_poisons_run() {
        let mut run = ConcolicRun::new(&ConcolicConfig::default());
        run.method_begin(&MethodId::new("Test", "run"), 2).unwrap();
        let first = run.pop().unwrap_err();
        assert!(matches!(first, ConcolicError::StackUnderflow { .. }));
        assert!(run.is_poisoned());

        // Even a well-formed hook now reports the original fault
        let again = run.push_constant(ConcreteValue::Int(1)).unwrap_err();
        assert_eq!(again, first);

        match run.finish() {
            Err(ConcolicError::RunPoisoned(message)) => assert!(message.contains("underflow")),
            other => panic!("expected a poisoned run, got {:?}", other.map(|r| r.path_condition.len())),
        }
    }

    #[test]
    fn test_clean_run_finishes() {
        let mut run = ConcolicRun::new(&ConcolicConfig::default());
        run.method_begin(&MethodId::new("Test", "run"), 2).unwrap();
        run.introduce_input(InputKind::Int, ConcreteValue::Int(4)).unwrap();
        run.branch_zero(BranchSite::new("Test", "run", 0), Comparator::Gt)
            .unwrap();
        run.method_return(false).unwrap();
        let result = run.finish().unwrap();
        assert_eq!(result.path_condition.len(), 1);
        assert_eq!(result.variables.len(), 1);
        assert_eq!(result.ignored_branches, 0);
    }
}
