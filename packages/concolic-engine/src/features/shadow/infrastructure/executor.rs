//! Shadow execution (the RESULT step)
//!
//! Inputs are the concrete return value plus the expressions of receiver and
//! arguments in the order the real operation consumed them. A composite is
//! built only if some input references a variable; otherwise the call is a
//! pass-through to the concrete value.

use tracing::trace;

use super::{builder, math, string};
use crate::errors::{ConcolicError, Result};
use crate::features::environment::domain::{ConcreteValue, ObjectHandle, Operand};
use crate::features::environment::SymbolicEnvironment;
use crate::features::expression::domain::{Expr, Operator, Sort, Value};
use crate::features::expression::infrastructure::semantics;
use crate::features::shadow::domain::{
    ParamType, PendingCall, ShadowFunction, ShadowKind, ShadowOutcome,
};

/// Expressions of a call's inputs
struct ShadowInputs {
    receiver: Option<Expr>,
    args: Vec<Option<Expr>>,
}

impl ShadowInputs {
    fn any_symbolic(&self) -> bool {
        self.receiver
            .iter()
            .chain(self.args.iter().flatten())
            .any(Expr::contains_symbolic_variable)
    }

    /// Receiver and reference arguments all hold strings
    ///
    /// `String.equals(Object)` and friends accept any object; a boxed number
    /// or other value object leaves the call concrete.
    fn strings_only(&self, params: &[ParamType]) -> bool {
        let receiver_ok = self
            .receiver
            .as_ref()
            .map_or(true, |r| r.sort() == Sort::String);
        receiver_ok
            && params.iter().zip(&self.args).all(|(param, arg)| match (param, arg) {
                (ParamType::Ref(_), Some(expr)) => expr.sort() == Sort::String,
                _ => true,
            })
    }
}

impl ShadowFunction {
    /// Run the shadow for an observed concrete return (`None` for void)
    pub fn execute(
        &self,
        env: &mut SymbolicEnvironment,
        call: &PendingCall,
        ret: Option<&ConcreteValue>,
    ) -> Result<ShadowOutcome> {
        self.check_signature(call, ret)?;

        let inputs = self.collect_inputs(env, call);
        let ret_handle = ret.and_then(ConcreteValue::as_handle);

        if !inputs.any_symbolic() {
            // Fresh value objects must not inherit a stale entry for a reused identity
            if let Some(handle) = ret_handle {
                env.rebind_value(handle, None);
            }
            if self.kind == ShadowKind::BuilderInit {
                if let Some(handle) = receiver_handle(call) {
                    env.rebind_value(handle, None);
                }
            }
            return Ok(ShadowOutcome::pass_through());
        }

        let outcome = self.build(env, call, &inputs, ret, ret_handle);
        trace!(
            "{} -> {}",
            self.key,
            outcome
                .ret
                .as_ref()
                .map_or_else(|| "heap/pass".to_string(), |e| e.to_string())
        );
        Ok(outcome)
    }

    fn build(
        &self,
        env: &mut SymbolicEnvironment,
        call: &PendingCall,
        inputs: &ShadowInputs,
        ret: Option<&ConcreteValue>,
        ret_handle: Option<&ObjectHandle>,
    ) -> ShadowOutcome {
        let ret_sort = self.key.signature.ret.sort();
        let ret_value = ret.and_then(ConcreteValue::value);
        let primitive = ret_sort.zip(ret_value);
        let mut outcome = ShadowOutcome::default();

        let string_op = matches!(
            self.kind,
            ShadowKind::StringToInt(_)
                | ShadowKind::StringComparison(_)
                | ShadowKind::StringProducer(_)
                | ShadowKind::ParseInt
        );
        if string_op && !inputs.strings_only(&self.key.signature.params) {
            rebind(env, ret_handle, None);
            return outcome;
        }

        match self.kind {
            ShadowKind::IntUnary(op)
            | ShadowKind::IntBinary(op)
            | ShadowKind::RealUnary(op)
            | ShadowKind::RealBinary(op)
            | ShadowKind::RealToInt(op)
            | ShadowKind::CharacterPredicate(op) => {
                if let Some((sort, value)) = primitive {
                    outcome.ret = math::build_numeric(op, &inputs.args, sort, value);
                }
            }

            ShadowKind::StringToInt(op) | ShadowKind::StringComparison(op) => {
                if let (Some(receiver), Some((sort, value))) = (&inputs.receiver, primitive) {
                    outcome.ret = string::build_receiver_op(op, receiver, &inputs.args, sort, value);
                    outcome.supporting = string::index_bounds(op, receiver, &inputs.args);
                }
            }

            ShadowKind::ParseInt => {
                if let (Some(Some(arg)), Some((sort, value))) = (inputs.args.first(), primitive) {
                    outcome.ret = Some(Expr::unary(Operator::ParseInt, sort, arg.clone(), value));
                }
            }

            ShadowKind::StringProducer(op) => {
                let produced = inputs.receiver.as_ref().and_then(|receiver| {
                    let observed = observed_string(ret_handle, op, receiver, &inputs.args)?;
                    outcome.supporting = string::index_bounds(op, receiver, &inputs.args);
                    string::build_receiver_op(op, receiver, &inputs.args, Sort::String, observed)
                });
                rebind(env, ret_handle, produced);
            }

            ShadowKind::ValueOfToString(op) => {
                let produced = match inputs.args.first() {
                    Some(Some(arg)) => {
                        let observed = ret_handle
                            .and_then(|h| h.snapshot.clone())
                            .or_else(|| {
                                semantics::apply(op, Sort::String, &[arg.concrete_value().clone()]).ok()
                            });
                        observed.map(|v| Expr::unary(op, Sort::String, arg.clone(), v))
                    }
                    _ => None,
                };
                rebind(env, ret_handle, produced);
            }

            ShadowKind::Box => {
                let boxed = inputs.args.first().cloned().flatten();
                rebind(env, ret_handle, boxed);
            }

            ShadowKind::Unbox => {
                outcome.ret = inputs.receiver.clone();
            }

            ShadowKind::BuilderInit => {
                let initial = inputs.args.first().cloned().flatten();
                rebind(env, receiver_handle(call), initial);
            }

            ShadowKind::BuilderAppend => {
                let param = self.key.signature.params.first();
                let appended = match (param, call.args.first()) {
                    (Some(param), Some(arg)) => {
                        builder::stringify(param, inputs.args[0].as_ref(), &arg.concrete)
                    }
                    _ => None,
                };
                let contents = match (&inputs.receiver, appended) {
                    (Some(old), Some(appended)) => {
                        let observed = ret_handle.and_then(|h| h.snapshot.clone());
                        builder::append(old, appended, observed)
                    }
                    _ => None,
                };
                // `append` returns the receiver itself
                rebind(env, ret_handle.or_else(|| receiver_handle(call)), contents);
            }

            ShadowKind::BuilderToString => {
                rebind(env, ret_handle, inputs.receiver.clone());
            }
        }

        outcome.ret = outcome.ret.filter(Expr::contains_symbolic_variable);
        outcome
    }

    /// Fatal if the captured call does not have the declared shape
    fn check_signature(&self, call: &PendingCall, ret: Option<&ConcreteValue>) -> Result<()> {
        let signature = &self.key.signature;
        let mismatch = |detail: String| ConcolicError::signature(&self.key, detail);

        match (&call.receiver, self.has_receiver) {
            (None, true) => return Err(mismatch("missing receiver".to_string())),
            (Some(_), false) => return Err(mismatch("unexpected receiver".to_string())),
            (Some(r), true) if r.concrete.as_handle().is_none() => {
                return Err(mismatch(format!("receiver is {}", r.concrete)));
            }
            _ => {}
        }

        if call.args.len() != signature.params.len() {
            return Err(mismatch(format!(
                "expected {} argument(s), captured {}",
                signature.params.len(),
                call.args.len()
            )));
        }
        for (i, (param, arg)) in signature.params.iter().zip(&call.args).enumerate() {
            if !param.accepts(&arg.concrete) {
                return Err(mismatch(format!(
                    "argument {} is {}, declared {}",
                    i, arg.concrete, param
                )));
            }
        }

        match (&signature.ret, ret) {
            (ParamType::Void, None) => Ok(()),
            (ParamType::Void, Some(v)) => Err(mismatch(format!("void call returned {}", v))),
            (declared, Some(v)) if declared.accepts(v) => Ok(()),
            (declared, Some(v)) => Err(mismatch(format!("returned {}, declared {}", v, declared))),
            (declared, None) => Err(mismatch(format!("no return value, declared {}", declared))),
        }
    }

    fn collect_inputs(&self, env: &SymbolicEnvironment, call: &PendingCall) -> ShadowInputs {
        // A constructor's receiver has no contents yet
        let receiver = match self.kind {
            ShadowKind::BuilderInit => None,
            _ => receiver_handle(call).and_then(|h| env.value_of(h)),
        };
        let args = self
            .key
            .signature
            .params
            .iter()
            .zip(&call.args)
            .map(|(param, arg)| operand_expr(env, param, arg))
            .collect();
        ShadowInputs { receiver, args }
    }
}

fn receiver_handle(call: &PendingCall) -> Option<&ObjectHandle> {
    call.receiver.as_ref().and_then(|r| r.concrete.as_handle())
}

/// Expression of one argument: primitives carry their own, value objects
/// read their backing slot
fn operand_expr(env: &SymbolicEnvironment, param: &ParamType, arg: &Operand) -> Option<Expr> {
    match param {
        ParamType::Ref(_) => arg.concrete.as_handle().and_then(|h| env.value_of(h)),
        _ => arg.expr_or_constant(),
    }
}

/// Observed result of a string producer: the returned object's snapshot, or
/// the operation applied to the inputs' observed values
fn observed_string(
    ret_handle: Option<&ObjectHandle>,
    op: Operator,
    receiver: &Expr,
    args: &[Option<Expr>],
) -> Option<Value> {
    if let Some(snapshot) = ret_handle.and_then(|h| h.snapshot.clone()) {
        return Some(snapshot);
    }
    let mut values = vec![receiver.concrete_value().clone()];
    for arg in args {
        values.push(arg.as_ref()?.concrete_value().clone());
    }
    semantics::apply(op, Sort::String, &values).ok()
}

fn rebind(env: &mut SymbolicEnvironment, handle: Option<&ObjectHandle>, expr: Option<Expr>) {
    if let Some(handle) = handle {
        env.rebind_value(handle, expr);
    }
}
