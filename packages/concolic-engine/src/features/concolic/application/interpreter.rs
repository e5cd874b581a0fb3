/*
 * Shadow Interpreter
 *
 * Mirrors one concrete execution instruction by instruction. Every operand
 * on the shadow stack pairs the value the concrete interpreter holds with an
 * optional expression over the run's inputs.
 *
 * # Lazy concretization
 * An instruction whose operands are all concrete pushes a concrete operand
 * and builds nothing. Only operations touching a symbolic operand allocate
 * expression nodes.
 *
 * # Calls
 * ```text
 * invoke (ENTER) ──> method_begin ... method_return ──> call_result (RESULT)
 *        │                                                     ▲
 *        └───────────── shadowed / uninstrumented callee ──────┘
 *        └──> call_exception (EXCEPTIONAL) / exception_unwind
 * ```
 * A direct call into instrumented code hands the captured operands to the
 * callee's locals and its return value back to the caller. Any other call
 * completes at RESULT: a registered shadow builds the returned expression,
 * everything else returns a concrete value.
 */

use tracing::{debug, trace};

use crate::config::ConcolicConfig;
use crate::errors::{ConcolicError, Result};
use crate::features::concolic::domain::{
    CastOp, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering, RealBinOp, RealUnOp, RunResult,
};
use crate::features::concolic::ports::ShadowHooks;
use crate::features::environment::domain::{ConcreteValue, ObjectHandle, Operand};
use crate::features::environment::SymbolicEnvironment;
use crate::features::expression::domain::{Comparator, Expr, ExprKind, Operator, Sort, Value};
use crate::features::expression::infrastructure::semantics;
use crate::features::path_constraint::domain::{BranchSite, Constraint};
use crate::features::path_constraint::PathConstraintCollector;
use crate::features::shadow::domain::{
    CallPhase, FunctionKey, ParamType, PendingCall, ShadowOutcome,
};
use crate::features::shadow::ShadowCatalogue;

/// Per-instruction tracing, compiled in with the `trace` feature
macro_rules! step {
    ($($arg:tt)*) => {
        #[cfg(feature = "trace")]
        tracing::trace!($($arg)*);
    };
}

/// How a frame received its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameOrigin {
    /// Operands handed over from an instrumented caller's stack
    Caller,
    /// Entered from uninstrumented code; parameters arrive through `method_param`
    Uninstrumented,
}

pub struct ShadowInterpreter<'c> {
    env: SymbolicEnvironment,
    catalogue: &'c ShadowCatalogue,
    collector: PathConstraintCollector,
    pending: Vec<PendingCall>,
    origins: Vec<FrameOrigin>,
    phase: CallPhase,
}

impl ShadowInterpreter<'static> {
    /// Interpreter over the shared default catalogue
    pub fn new(config: &ConcolicConfig) -> Self {
        Self::with_catalogue(config, ShadowCatalogue::shared())
    }
}

impl<'c> ShadowInterpreter<'c> {
    pub fn with_catalogue(config: &ConcolicConfig, catalogue: &'c ShadowCatalogue) -> Self {
        Self {
            env: SymbolicEnvironment::new(config.lazy_field_variables),
            catalogue,
            collector: PathConstraintCollector::new(config.max_path_constraints)
                .with_max_constraint_size(config.max_constraint_size),
            pending: Vec::new(),
            origins: Vec::new(),
            phase: CallPhase::Idle,
        }
    }

    pub fn env(&self) -> &SymbolicEnvironment {
        &self.env
    }

    pub fn collector(&self) -> &PathConstraintCollector {
        &self.collector
    }

    /// Last call-state transition
    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    /// Calls between ENTER and RESULT, innermost last
    pub fn pending_calls(&self) -> &[PendingCall] {
        &self.pending
    }

    pub fn finish(self) -> RunResult {
        RunResult {
            ignored_branches: self.collector.ignored(),
            oversized_branches: self.collector.oversized(),
            variables: self.env.variables().to_vec(),
            path_condition: self.collector.finish(),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Operand helpers
    // ═══════════════════════════════════════════════════════════════

    /// Pop an operand whose concrete half has `sort`
    fn pop_sorted(&mut self, sort: Sort) -> Result<Operand> {
        let operand = self.env.pop()?;
        if operand.concrete.sort() != Some(sort) {
            return Err(mismatch(sort, &operand.concrete));
        }
        Ok(operand)
    }

    fn pop_reference(&mut self) -> Result<Operand> {
        let operand = self.env.pop()?;
        if !operand.concrete.is_reference() {
            return Err(mismatch("reference", &operand.concrete));
        }
        Ok(operand)
    }

    /// Push the result of `op`, building an expression only over symbolic inputs
    fn push_result(&mut self, op: Operator, sort: Sort, inputs: &[&Operand], observed: Value) -> Result<()> {
        let concrete = ConcreteValue::from_value(sort, &observed)
            .ok_or_else(|| ConcolicError::sort_mismatch(sort, observed_sort(&observed)))?;
        let expr = if inputs.iter().any(|o| o.is_symbolic()) {
            build(op, sort, inputs, observed)
        } else {
            None
        };
        step!("{} -> {}", op.name(), concrete);
        self.env.push(Operand::shadowed(concrete, expr))
    }

    /// Supporting constraint on a divisor; a zero divisor faults concretely
    fn record_divisor(&mut self, divisor: &Operand, zero: bool) {
        if !divisor.is_symbolic() {
            return;
        }
        let Some(expr) = divisor.expr_or_constant() else {
            return;
        };
        let zero_const = Expr::constant(expr.sort(), Value::Int(0));
        let cmp = if zero { Comparator::Eq } else { Comparator::Ne };
        self.collector.add_supporting(Constraint::new(expr, cmp, zero_const));
    }

    fn record_branch(&mut self, site: BranchSite, taken: bool, constraint: Constraint) {
        let held = if taken { constraint } else { constraint.negate() };
        self.collector.append_branch(site, taken, held);
    }

    /// Local slot width of an argument (`long`/`double` take two)
    fn slot_width(param: Option<&ParamType>) -> usize {
        match param {
            Some(ParamType::Long | ParamType::Double) => 2,
            _ => 1,
        }
    }

    fn pop_pending(&mut self, key: &FunctionKey, phase: &str) -> Result<PendingCall> {
        let call = self.pending.pop().ok_or_else(|| {
            ConcolicError::call_sequence(format!("{} of {} without a prior ENTER", phase, key))
        })?;
        if &call.key != key {
            return Err(ConcolicError::call_sequence(format!(
                "{} of {} while {} is in progress",
                phase, key, call.key
            )));
        }
        if call.caller_depth != self.env.frame_depth() {
            return Err(ConcolicError::call_sequence(format!(
                "{} of {} at frame depth {}, entered at {}",
                phase,
                key,
                self.env.frame_depth(),
                call.caller_depth
            )));
        }
        Ok(call)
    }
}

// ═══════════════════════════════════════════════════════════════
// Hooks
// ═══════════════════════════════════════════════════════════════

impl ShadowHooks for ShadowInterpreter<'_> {
    // ━━━ Inputs ━━━

    fn introduce_input(&mut self, kind: InputKind, concrete: ConcreteValue) -> Result<()> {
        if !kind.accepts(&concrete) {
            return Err(mismatch(kind, &concrete));
        }
        let (min, max) = kind.bounds();
        match &concrete {
            ConcreteValue::Ref(handle) => {
                let initial = handle
                    .snapshot
                    .clone()
                    .ok_or_else(|| mismatch(kind, &concrete))?;
                let var = self.env.new_variable(Sort::String, initial, min, max);
                debug!("Input {} ({}) = {}", var, kind, concrete);
                self.env.rebind_value(handle, Some(var));
                self.env.push(Operand::concrete(concrete))
            }
            _ => {
                let initial = concrete.value().ok_or_else(|| mismatch(kind, &concrete))?;
                let var = self.env.new_variable(kind.sort(), initial, min, max);
                debug!("Input {} ({}) = {}", var, kind, concrete);
                self.env.push(Operand::with_expr(concrete, var))
            }
        }
    }

    // ━━━ Operand stack and locals ━━━

    fn push_constant(&mut self, value: ConcreteValue) -> Result<()> {
        step!("push {}", value);
        self.env.push(Operand::concrete(value))
    }

    fn load_local(&mut self, index: usize) -> Result<()> {
        let operand = self.env.load_local(index)?;
        self.env.push(operand)
    }

    fn store_local(&mut self, index: usize) -> Result<()> {
        let operand = self.env.pop()?;
        self.env.store_local(index, operand)
    }

    fn increment_local(&mut self, index: usize, delta: i32) -> Result<()> {
        let local = self.env.load_local(index)?;
        let ConcreteValue::Int(current) = local.concrete else {
            return Err(mismatch(Sort::Int32, &local.concrete));
        };
        let observed = current.wrapping_add(delta);
        let expr = local.symbolic.filter(Expr::contains_symbolic_variable).map(|e| {
            Expr::binary(
                Operator::Plus,
                Sort::Int32,
                e,
                Expr::int32(delta),
                Value::Int(observed as i64),
            )
        });
        self.env
            .store_local(index, Operand::shadowed(ConcreteValue::Int(observed), expr))
    }

    fn pop(&mut self) -> Result<()> {
        self.env.pop().map(|_| ())
    }

    fn dup(&mut self) -> Result<()> {
        let top = self.env.peek(0)?.clone();
        self.env.push(top)
    }

    // ━━━ Arithmetic ━━━

    fn int_binary(&mut self, op: IntBinOp, wide: bool) -> Result<()> {
        let sort = if wide { Sort::Int64 } else { Sort::Int32 };
        let right = self.pop_sorted(if op.is_shift() { Sort::Int32 } else { sort })?;
        let left = self.pop_sorted(sort)?;
        let (lv, rv) = (concrete_value(&left)?, concrete_value(&right)?);

        if op.is_division() {
            let zero = rv.as_int() == Some(0);
            self.record_divisor(&right, zero);
            if zero {
                // The concrete division raises; exceptional control flow takes over
                step!("{} by zero skipped", op.operator().name());
                return Ok(());
            }
        }

        let observed = evaluate(op.operator(), sort, &[lv, rv])?;
        self.push_result(op.operator(), sort, &[&left, &right], observed)
    }

    fn int_unary(&mut self, op: IntUnOp, wide: bool) -> Result<()> {
        let sort = if wide { Sort::Int64 } else { Sort::Int32 };
        let operand = self.pop_sorted(sort)?;
        let observed = evaluate(op.operator(), sort, &[concrete_value(&operand)?])?;
        self.push_result(op.operator(), sort, &[&operand], observed)
    }

    fn real_binary(&mut self, op: RealBinOp) -> Result<()> {
        let right = self.pop_sorted(Sort::Real)?;
        let left = self.pop_sorted(Sort::Real)?;
        let args = [concrete_value(&left)?, concrete_value(&right)?];
        let observed = evaluate(op.operator(), Sort::Real, &args)?;
        self.push_result(op.operator(), Sort::Real, &[&left, &right], observed)
    }

    fn real_unary(&mut self, op: RealUnOp) -> Result<()> {
        let operand = self.pop_sorted(Sort::Real)?;
        let observed = evaluate(op.operator(), Sort::Real, &[concrete_value(&operand)?])?;
        self.push_result(op.operator(), Sort::Real, &[&operand], observed)
    }

    fn cast(&mut self, op: CastOp) -> Result<()> {
        let operand = self.pop_sorted(op.source())?;
        match op.operator() {
            Some(operator) => {
                let observed = evaluate(operator, op.target(), &[concrete_value(&operand)?])?;
                self.push_result(operator, op.target(), &[&operand], observed)
            }
            None => self.env.push(operand),
        }
    }

    fn int_compare(&mut self) -> Result<()> {
        let right = self.pop_sorted(Sort::Int64)?;
        let left = self.pop_sorted(Sort::Int64)?;
        let args = [concrete_value(&left)?, concrete_value(&right)?];
        let observed = evaluate(Operator::Cmp, Sort::Int32, &args)?;
        self.push_result(Operator::Cmp, Sort::Int32, &[&left, &right], observed)
    }

    fn real_compare(&mut self, nan: NanOrdering) -> Result<()> {
        let right = self.pop_sorted(Sort::Real)?;
        let left = self.pop_sorted(Sort::Real)?;
        let args = [concrete_value(&left)?, concrete_value(&right)?];
        let observed = evaluate(nan.operator(), Sort::Int32, &args)?;
        self.push_result(nan.operator(), Sort::Int32, &[&left, &right], observed)
    }

    // ━━━ Branches ━━━

    fn branch_zero(&mut self, site: BranchSite, cmp: Comparator) -> Result<()> {
        let value = self.pop_sorted(Sort::Int32)?;
        let ConcreteValue::Int(observed) = value.concrete else {
            return Err(mismatch(Sort::Int32, &value.concrete));
        };
        let taken = cmp.holds_int(observed as i64, 0);
        let Some(expr) = value.symbolic.filter(Expr::contains_symbolic_variable) else {
            step!("branch {} concrete (taken={})", site, taken);
            return Ok(());
        };

        // `lcmp; ifXX` compares the operands themselves
        let constraint = match unfold_three_way(&expr) {
            Some((left, right)) => Constraint::new(left, cmp, right),
            None => Constraint::new(expr, cmp, Expr::int32(0)),
        };
        self.record_branch(site, taken, constraint);
        Ok(())
    }

    fn branch_compare(&mut self, site: BranchSite, cmp: Comparator) -> Result<()> {
        let right = self.env.pop()?;
        let left = self.env.pop()?;
        match (&left.concrete, &right.concrete) {
            // `if_acmpXX`: identities are never symbolic
            (l, r) if l.is_reference() && r.is_reference() => Ok(()),
            (ConcreteValue::Int(l), ConcreteValue::Int(r)) => {
                let taken = cmp.holds_int(*l as i64, *r as i64);
                if !left.is_symbolic() && !right.is_symbolic() {
                    step!("branch {} concrete (taken={})", site, taken);
                    return Ok(());
                }
                let (Some(l), Some(r)) = (left.expr_or_constant(), right.expr_or_constant()) else {
                    return Ok(());
                };
                self.record_branch(site, taken, Constraint::new(l, cmp, r));
                Ok(())
            }
            (ConcreteValue::Int(_), other) | (other, _) => Err(mismatch(Sort::Int32, other)),
        }
    }

    fn branch_null(&mut self, site: BranchSite) -> Result<()> {
        let operand = self.pop_reference()?;
        trace!("null check at {}: {}", site, operand.concrete);
        Ok(())
    }

    // ━━━ Heap ━━━

    fn get_field(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()> {
        let bounds = field_type(descriptor, &value)?.bounds();
        let receiver = self.pop_reference()?;
        let handle = receiver
            .concrete
            .as_handle()
            .ok_or_else(|| mismatch("non-null receiver", &receiver.concrete))?;
        let operand = match value.sort() {
            Some(_) => {
                let expr = self.env.get_field(class, field, handle.id, &value, bounds);
                Operand::shadowed(value, expr)
            }
            None => Operand::concrete(value),
        };
        self.env.push(operand)
    }

    fn put_field(&mut self, class: &str, field: &str) -> Result<()> {
        let value = self.env.pop()?;
        let receiver = self.pop_reference()?;
        let handle = receiver
            .concrete
            .as_handle()
            .ok_or_else(|| mismatch("non-null receiver", &receiver.concrete))?;
        // A concrete store overwrites any earlier symbolic contents
        if let Some(expr) = value.expr_or_constant() {
            self.env.put_field(class, field, handle.id, expr);
        }
        Ok(())
    }

    fn get_static(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()> {
        let bounds = field_type(descriptor, &value)?.bounds();
        let operand = match value.sort() {
            Some(_) => {
                let expr = self.env.get_static(class, field, &value, bounds);
                Operand::shadowed(value, expr)
            }
            None => Operand::concrete(value),
        };
        self.env.push(operand)
    }

    fn put_static(&mut self, class: &str, field: &str) -> Result<()> {
        let value = self.env.pop()?;
        if let Some(expr) = value.expr_or_constant() {
            self.env.put_static(class, field, expr);
        }
        Ok(())
    }

    fn new_object(&mut self, handle: ObjectHandle) -> Result<()> {
        // A reused identity must not inherit the contents of a dead object
        self.env.rebind_value(&handle, None);
        self.env.push(Operand::concrete(ConcreteValue::Ref(handle)))
    }

    // ━━━ Calls ━━━

    fn method_begin(&mut self, method: &MethodId, max_locals: usize) -> Result<()> {
        let depth = self.env.frame_depth();
        let direct = self.pending.last().is_some_and(|call| {
            !call.callee_entered
                && call.shadow.is_none()
                && call.caller_depth == depth
                && call.key.owner == method.owner
                && call.key.name == method.name
        });

        self.env.push_frame(method.to_string(), max_locals);
        let origin = match self.pending.last_mut() {
            Some(call) if direct => {
                call.callee_entered = true;
                let mut slot = 0;
                if let Some(receiver) = &call.receiver {
                    self.env.store_local(0, receiver.clone())?;
                    slot = 1;
                }
                for (i, arg) in call.args.iter().enumerate() {
                    self.env.store_local(slot, arg.clone())?;
                    slot += Self::slot_width(call.key.signature.params.get(i));
                }
                FrameOrigin::Caller
            }
            _ => FrameOrigin::Uninstrumented,
        };
        self.origins.push(origin);
        debug!("Enter {} at depth {} ({:?})", method, depth + 1, origin);
        Ok(())
    }

    fn method_param(&mut self, index: usize, value: ConcreteValue) -> Result<()> {
        match self.origins.last() {
            Some(FrameOrigin::Uninstrumented) => self.env.store_local(index, Operand::concrete(value)),
            Some(FrameOrigin::Caller) => Ok(()),
            None => Err(ConcolicError::FrameUnderflow(format!(
                "parameter {} with no active frame",
                index
            ))),
        }
    }

    fn method_return(&mut self, has_value: bool) -> Result<()> {
        let ret = if has_value { Some(self.env.pop()?) } else { None };
        let frame = self.env.pop_frame()?;
        let origin = self.origins.pop();
        debug!("Return from {} to depth {}", frame.method, self.env.frame_depth());
        if let (Some(FrameOrigin::Caller), Some(value)) = (origin, ret) {
            self.env.push(value)?;
        }
        Ok(())
    }

    fn invoke(&mut self, key: &FunctionKey, has_receiver: bool) -> Result<()> {
        let shadow = self.catalogue.lookup(key).cloned();
        if let Some(shadow) = &shadow {
            if shadow.has_receiver != has_receiver {
                return Err(ConcolicError::signature(
                    key,
                    format!("invoked with receiver={}, registered with {}", has_receiver, shadow.has_receiver),
                ));
            }
        }

        let arity = key.signature.params.len() + usize::from(has_receiver);
        let mut operands = self.env.pop_n(arity)?;
        let receiver = if has_receiver {
            Some(operands.remove(0))
        } else {
            None
        };
        step!("ENTER {} (shadow={})", key, shadow.is_some());
        self.pending.push(PendingCall {
            key: key.clone(),
            shadow,
            receiver,
            args: operands,
            caller_depth: self.env.frame_depth(),
            callee_entered: false,
        });
        self.phase = CallPhase::Entered;
        Ok(())
    }

    fn call_result(&mut self, key: &FunctionKey, ret: Option<ConcreteValue>) -> Result<()> {
        let call = self.pop_pending(key, "RESULT")?;
        self.phase = CallPhase::Completed;
        if call.callee_entered {
            // `method_return` already moved the value to the caller
            return Ok(());
        }

        let outcome = match &call.shadow {
            Some(shadow) => shadow.execute(&mut self.env, &call, ret.as_ref())?,
            None => {
                let declared_void = key.signature.ret == ParamType::Void;
                if declared_void != ret.is_none() {
                    return Err(ConcolicError::signature(
                        key,
                        format!("return value {:?} does not match the descriptor", ret),
                    ));
                }
                ShadowOutcome::pass_through()
            }
        };

        for supporting in outcome.supporting {
            self.collector.add_supporting(supporting);
        }
        if let Some(value) = ret {
            if let Some(expr) = &outcome.ret {
                trace!("RESULT {} = {} ~ {}", key, value, expr);
            }
            self.env.push(Operand::shadowed(value, outcome.ret))?;
        }
        Ok(())
    }

    fn call_exception(&mut self, key: &FunctionKey) -> Result<()> {
        let call = self.pop_pending(key, "EXCEPTIONAL")?;
        self.phase = CallPhase::Exceptional;
        debug!("{} raised; discarding {} captured argument(s)", call.key, call.args.len());
        Ok(())
    }

    fn exception_unwind(&mut self, depth: usize, exception: ConcreteValue) -> Result<()> {
        if depth == 0 || depth > self.env.frame_depth() {
            return Err(ConcolicError::FrameUnderflow(format!(
                "handler at depth {} with {} active frame(s)",
                depth,
                self.env.frame_depth()
            )));
        }
        while self.env.frame_depth() > depth {
            self.env.pop_frame()?;
            self.origins.pop();
        }
        let before = self.pending.len();
        self.pending.retain(|call| call.caller_depth < depth);
        if self.pending.len() != before {
            self.phase = CallPhase::Exceptional;
        }

        let frame = self.env.top_frame_mut()?;
        frame.clear_stack();
        frame.push(Operand::concrete(exception));
        debug!(
            "Unwound to depth {}; {} pending call(s) discarded",
            depth,
            before - self.pending.len()
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
// Free helpers
// ═══════════════════════════════════════════════════════════════

/// Declared type of a field read, checked against the value read
fn field_type(descriptor: &str, value: &ConcreteValue) -> Result<ParamType> {
    let declared = ParamType::from_field_descriptor(descriptor)?;
    if declared.accepts(value) {
        Ok(declared)
    } else {
        Err(mismatch(&declared, value))
    }
}

fn mismatch(expected: impl ToString, found: &ConcreteValue) -> ConcolicError {
    let found = match found.sort() {
        Some(sort) => sort.to_string(),
        None => found.to_string(),
    };
    ConcolicError::OperandSortMismatch {
        expected: expected.to_string(),
        found,
    }
}

fn observed_sort(value: &Value) -> Sort {
    match value {
        Value::Int(_) => Sort::Int64,
        Value::Real(_) => Sort::Real,
        Value::Str(_) => Sort::String,
    }
}

fn concrete_value(operand: &Operand) -> Result<Value> {
    operand
        .concrete
        .value()
        .ok_or_else(|| mismatch("primitive", &operand.concrete))
}

/// Concrete semantics of an instruction over its operands' concrete halves
fn evaluate(op: Operator, sort: Sort, args: &[Value]) -> Result<Value> {
    semantics::apply(op, sort, args).map_err(|e| ConcolicError::OperandSortMismatch {
        expected: format!("operands of {}", op.name()),
        found: e.to_string(),
    })
}

fn build(op: Operator, sort: Sort, inputs: &[&Operand], observed: Value) -> Option<Expr> {
    match inputs {
        [operand] => Some(Expr::unary(op, sort, operand.expr_or_constant()?, observed)),
        [left, right] => Some(Expr::binary(
            op,
            sort,
            left.expr_or_constant()?,
            right.expr_or_constant()?,
            observed,
        )),
        _ => None,
    }
}

/// Operands of a three-way compare, unless NaN makes the rewrite unsound
fn unfold_three_way(expr: &Expr) -> Option<(Expr, Expr)> {
    let ExprKind::Binary { op, left, right } = expr.kind() else {
        return None;
    };
    if !matches!(op, Operator::Cmp | Operator::CmpL | Operator::CmpG) {
        return None;
    }
    let is_nan = |e: &Expr| e.concrete_value().as_real().is_some_and(f64::is_nan);
    if is_nan(left) || is_nan(right) {
        return None;
    }
    Some((left.clone(), right.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::environment::domain::heap::STRING_CLASS;
    use crate::features::expression::infrastructure::Assignment;
    use pretty_assertions::assert_eq;

    fn interpreter() -> ShadowInterpreter<'static> {
        let mut i = ShadowInterpreter::new(&ConcolicConfig::default());
        i.method_begin(&MethodId::new("Test", "run"), 8).unwrap();
        i
    }

    fn site(index: u32) -> BranchSite {
        BranchSite::new("Test", "run", index)
    }

    fn key(owner: &str, name: &str, desc: &str) -> FunctionKey {
        FunctionKey::parse(owner, name, desc).unwrap()
    }

    #[test]
    fn test_concrete_arithmetic_builds_nothing() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Int(6)).unwrap();
        i.push_constant(ConcreteValue::Int(7)).unwrap();
        i.int_binary(IntBinOp::Mul, false).unwrap();
        let top = i.env().peek(0).unwrap();
        assert_eq!(top.concrete, ConcreteValue::Int(42));
        assert!(top.symbolic.is_none());
    }

    #[test]
    fn test_symbolic_branch_is_recorded() {
        let mut i = interpreter();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(5)).unwrap();
        i.push_constant(ConcreteValue::Int(3)).unwrap();
        i.int_binary(IntBinOp::Add, false).unwrap();
        i.push_constant(ConcreteValue::Int(10)).unwrap();
        // 8 >= 10 is false: the branch falls through
        i.branch_compare(site(0), Comparator::Ge).unwrap();

        let result = i.finish();
        let pc = &result.path_condition;
        assert_eq!(pc.len(), 1);
        assert!(!pc.conditions()[0].taken);
        assert_eq!(pc.conditions()[0].constraint.to_string(), "(var0 + 3) < 10");
        assert!(pc.is_satisfied_by(&result.initial_assignment()));
    }

    #[test]
    fn test_zero_divisor_skips_shadow() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Int(1)).unwrap();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(0)).unwrap();
        i.int_binary(IntBinOp::Div, false).unwrap();
        assert_eq!(i.env().top_frame().unwrap().depth(), 0);

        // The divisor check rides along with the next recorded branch
        i.introduce_input(InputKind::Int, ConcreteValue::Int(1)).unwrap();
        i.branch_zero(site(0), Comparator::Ne).unwrap();
        let result = i.finish();
        let condition = &result.path_condition.conditions()[0];
        assert_eq!(condition.supporting.len(), 1);
        assert_eq!(condition.supporting[0].to_string(), "var0 == 0");
    }

    #[test]
    fn test_lcmp_branch_unfolds() {
        let mut i = interpreter();
        i.introduce_input(InputKind::Long, ConcreteValue::Long(4)).unwrap();
        i.push_constant(ConcreteValue::Long(9)).unwrap();
        i.int_compare().unwrap();
        // ifge: 4 cmp 9 = -1, not taken
        i.branch_zero(site(1), Comparator::Ge).unwrap();
        let result = i.finish();
        assert_eq!(
            result.path_condition.conditions()[0].constraint.to_string(),
            "var0 < 9"
        );
    }

    #[test]
    fn test_sort_mismatch_is_fatal() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Real(1.0)).unwrap();
        i.push_constant(ConcreteValue::Int(1)).unwrap();
        let err = i.int_binary(IntBinOp::Add, false).unwrap_err();
        assert!(matches!(err, ConcolicError::OperandSortMismatch { .. }));
    }

    #[test]
    fn test_stack_underflow_is_fatal() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Int(1)).unwrap();
        assert!(i.int_binary(IntBinOp::Add, false).is_err());
    }

    #[test]
    fn test_shadowed_call_pushes_expression() {
        let mut i = interpreter();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(-7)).unwrap();
        let abs = key("java/lang/Math", "abs", "(I)I");
        i.invoke(&abs, false).unwrap();
        assert_eq!(i.phase(), CallPhase::Entered);
        i.call_result(&abs, Some(ConcreteValue::Int(7))).unwrap();
        assert_eq!(i.phase(), CallPhase::Completed);

        let top = i.env().peek(0).unwrap();
        assert_eq!(top.symbolic.as_ref().unwrap().to_string(), "abs(var0)");
        assert_eq!(top.concrete, ConcreteValue::Int(7));
    }

    #[test]
    fn test_result_without_enter_is_fatal() {
        let mut i = interpreter();
        let abs = key("java/lang/Math", "abs", "(I)I");
        let err = i.call_result(&abs, Some(ConcreteValue::Int(1))).unwrap_err();
        assert!(matches!(err, ConcolicError::CallSequence(_)));
    }

    #[test]
    fn test_result_for_other_key_is_fatal() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Int(1)).unwrap();
        i.invoke(&key("java/lang/Math", "abs", "(I)I"), false).unwrap();
        let err = i
            .call_result(&key("java/lang/Math", "signum", "(I)I"), Some(ConcreteValue::Int(1)))
            .unwrap_err();
        assert!(matches!(err, ConcolicError::CallSequence(_)));
    }

    #[test]
    fn test_direct_call_passes_operands() {
        let mut i = interpreter();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(2)).unwrap();
        i.introduce_input(InputKind::Long, ConcreteValue::Long(3)).unwrap();
        i.push_constant(ConcreteValue::Int(9)).unwrap();
        let callee = key("Target", "f", "(IJI)I");
        i.invoke(&callee, false).unwrap();

        i.method_begin(&MethodId::new("Target", "f"), 4).unwrap();
        // Slots: 0 int, 1-2 long, 3 int
        i.method_param(0, ConcreteValue::Int(2)).unwrap();
        i.load_local(0).unwrap();
        i.load_local(3).unwrap();
        i.int_binary(IntBinOp::Add, false).unwrap();
        i.method_return(true).unwrap();
        i.call_result(&callee, Some(ConcreteValue::Int(11))).unwrap();

        let top = i.env().peek(0).unwrap();
        assert_eq!(top.concrete, ConcreteValue::Int(11));
        assert_eq!(top.symbolic.as_ref().unwrap().to_string(), "(var0 + 9)");
        assert_eq!(i.env().frame_depth(), 1);
    }

    #[test]
    fn test_uninstrumented_entry_takes_params() {
        let mut i = ShadowInterpreter::new(&ConcolicConfig::default());
        i.method_begin(&MethodId::new("Target", "g"), 2).unwrap();
        i.method_param(1, ConcreteValue::Int(4)).unwrap();
        i.load_local(1).unwrap();
        assert_eq!(i.env().peek(0).unwrap().concrete, ConcreteValue::Int(4));
        i.method_return(true).unwrap();
        assert_eq!(i.env().frame_depth(), 0);
    }

    #[test]
    fn test_string_input_lives_in_heap() {
        let mut i = interpreter();
        let text = ObjectHandle::new(1, STRING_CLASS).with_snapshot("abc");
        i.introduce_input(InputKind::String, ConcreteValue::Ref(text.clone()))
            .unwrap();
        let starts = key("java/lang/String", "startsWith", "(Ljava/lang/String;)Z");
        i.push_constant(ConcreteValue::Ref(
            ObjectHandle::new(2, STRING_CLASS).with_snapshot("a"),
        ))
        .unwrap();
        i.invoke(&starts, true).unwrap();
        i.call_result(&starts, Some(ConcreteValue::Int(1))).unwrap();
        i.branch_zero(site(2), Comparator::Eq).unwrap();

        let result = i.finish();
        let condition = &result.path_condition.conditions()[0];
        assert!(!condition.taken);
        assert_eq!(condition.constraint.to_string(), "startsWith(var0, \"a\") != 0");

        let mut flipped = Assignment::new();
        flipped.insert("var0".to_string(), Value::from("zbc"));
        assert!(!result.path_condition.is_satisfied_by(&flipped));
    }

    #[test]
    fn test_exception_unwind_discards_calls() {
        let mut i = interpreter();
        i.push_constant(ConcreteValue::Int(5)).unwrap();
        let callee = key("Target", "boom", "(I)V");
        i.invoke(&callee, false).unwrap();
        i.method_begin(&MethodId::new("Target", "boom"), 1).unwrap();
        let exception = ConcreteValue::Ref(ObjectHandle::new(3, "java.lang.IllegalStateException"));
        i.exception_unwind(1, exception.clone()).unwrap();

        assert!(i.pending_calls().is_empty());
        assert_eq!(i.phase(), CallPhase::Exceptional);
        assert_eq!(i.env().frame_depth(), 1);
        assert_eq!(i.env().peek(0).unwrap().concrete, exception);
        assert!(i.exception_unwind(4, ConcreteValue::Null).is_err());
    }

    #[test]
    fn test_field_write_then_read() {
        let mut i = interpreter();
        let point = ObjectHandle::new(10, "Point");
        i.new_object(point.clone()).unwrap();
        i.dup().unwrap();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(3)).unwrap();
        i.put_field("Point", "x").unwrap();
        i.get_field("Point", "x", "I", ConcreteValue::Int(3)).unwrap();
        let top = i.env().peek(0).unwrap();
        assert_eq!(top.symbolic.as_ref().unwrap().to_string(), "var0");
        assert_eq!(i.env().variables().len(), 1);
    }

    #[test]
    fn test_boolean_field_variable_is_bounded() {
        let mut i = interpreter();
        let flags = ObjectHandle::new(11, "Flags");
        i.new_object(flags.clone()).unwrap();
        i.get_field("Flags", "on", "Z", ConcreteValue::Int(1)).unwrap();
        i.get_static("Flags", "initial", "C", ConcreteValue::Int('a' as i32))
            .unwrap();
        let vars = i.env().variables();
        assert_eq!((vars[0].min, vars[0].max), (0, 1));
        assert_eq!((vars[1].min, vars[1].max), (0, 65535));
    }

    #[test]
    fn test_field_value_must_match_descriptor() {
        let mut i = interpreter();
        i.get_static("Flags", "count", "J", ConcreteValue::Long(3)).unwrap();
        assert!(i.get_static("Flags", "count", "J", ConcreteValue::Int(3)).is_err());
        assert!(i.get_static("Flags", "count", "V", ConcreteValue::Int(3)).is_err());
    }

    #[test]
    fn test_increment_local() {
        let mut i = interpreter();
        i.introduce_input(InputKind::Int, ConcreteValue::Int(i32::MAX)).unwrap();
        i.store_local(0).unwrap();
        i.increment_local(0, 1).unwrap();
        let local = i.env().load_local(0).unwrap();
        assert_eq!(local.concrete, ConcreteValue::Int(i32::MIN));
        assert_eq!(local.symbolic.unwrap().concrete_value(), &Value::Int(i32::MIN as i64));
    }
}
