/*
 * Concolic Ports
 *
 * Upstream: the concrete interpreter drives `ShadowHooks` after every
 * instruction, in execution order, passing the values it just observed.
 * Downstream: a `TestPatcher` turns a solved alternative into the next
 * candidate test.
 */

use crate::errors::Result;
use crate::features::environment::domain::{ConcreteValue, ObjectHandle};
use crate::features::expression::domain::Comparator;
use crate::features::path_constraint::domain::BranchSite;
use crate::features::shadow::domain::FunctionKey;
use crate::features::solver::domain::Solution;

use super::domain::{CastOp, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering, RealBinOp, RealUnOp};

/// Lock-step interface between the concrete and the shadow interpreter
///
/// Arithmetic hooks read their operands from the shadow operand stack, whose
/// concrete halves mirror the concrete interpreter's stack; hooks that bring
/// a value into the stack (constants, field reads, call results, inputs)
/// carry it explicitly. Any error is an internal-consistency fault.
pub trait ShadowHooks {
    // ━━━ Inputs ━━━

    /// A test input slot; pushes its value paired with a fresh variable
    fn introduce_input(&mut self, kind: InputKind, concrete: ConcreteValue) -> Result<()>;

    // ━━━ Operand stack and locals ━━━

    fn push_constant(&mut self, value: ConcreteValue) -> Result<()>;
    fn load_local(&mut self, index: usize) -> Result<()>;
    fn store_local(&mut self, index: usize) -> Result<()>;
    /// `iinc`
    fn increment_local(&mut self, index: usize, delta: i32) -> Result<()>;
    fn pop(&mut self) -> Result<()>;
    fn dup(&mut self) -> Result<()>;

    // ━━━ Arithmetic ━━━

    /// `wide` selects the `long` variant
    fn int_binary(&mut self, op: IntBinOp, wide: bool) -> Result<()>;
    fn int_unary(&mut self, op: IntUnOp, wide: bool) -> Result<()>;
    fn real_binary(&mut self, op: RealBinOp) -> Result<()>;
    fn real_unary(&mut self, op: RealUnOp) -> Result<()>;
    fn cast(&mut self, op: CastOp) -> Result<()>;
    /// `lcmp`
    fn int_compare(&mut self) -> Result<()>;
    /// `fcmpl`/`fcmpg`/`dcmpl`/`dcmpg`
    fn real_compare(&mut self, nan: NanOrdering) -> Result<()>;

    // ━━━ Branches ━━━

    /// `ifeq`..`ifle`: top of stack against zero
    fn branch_zero(&mut self, site: BranchSite, cmp: Comparator) -> Result<()>;
    /// `if_icmpeq`..`if_icmple`
    fn branch_compare(&mut self, site: BranchSite, cmp: Comparator) -> Result<()>;
    /// `ifnull`/`ifnonnull`
    fn branch_null(&mut self, site: BranchSite) -> Result<()>;

    // ━━━ Heap ━━━

    /// `getfield`; `descriptor` is the field's JVM type (`Z`, `I`,
    /// `Ljava/lang/String;`) and `value` is what the concrete read produced
    fn get_field(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()>;
    fn put_field(&mut self, class: &str, field: &str) -> Result<()>;
    fn get_static(
        &mut self,
        class: &str,
        field: &str,
        descriptor: &str,
        value: ConcreteValue,
    ) -> Result<()>;
    fn put_static(&mut self, class: &str, field: &str) -> Result<()>;
    fn new_object(&mut self, handle: ObjectHandle) -> Result<()>;

    // ━━━ Calls ━━━

    /// Entry of an instrumented method
    fn method_begin(&mut self, method: &MethodId, max_locals: usize) -> Result<()>;
    /// Parameter of a method entered from code that left no operands
    fn method_param(&mut self, index: usize, value: ConcreteValue) -> Result<()>;
    fn method_return(&mut self, has_value: bool) -> Result<()>;
    /// ENTER: capture receiver and arguments of a call
    fn invoke(&mut self, key: &FunctionKey, has_receiver: bool) -> Result<()>;
    /// RESULT: the call returned `ret` (`None` for void)
    fn call_result(&mut self, key: &FunctionKey, ret: Option<ConcreteValue>) -> Result<()>;
    /// EXCEPTIONAL: the call raised instead of returning
    fn call_exception(&mut self, key: &FunctionKey) -> Result<()>;
    /// A handler at frame depth `depth` caught `exception`
    fn exception_unwind(&mut self, depth: usize, exception: ConcreteValue) -> Result<()>;
}

/// Applies a solution to a candidate test
pub trait TestPatcher {
    type Candidate;

    /// New candidate with the solved inputs, or `None` if the solution does
    /// not map onto the candidate's literals
    fn patch(&mut self, original: &Self::Candidate, solution: &Solution) -> Option<Self::Candidate>;
}
