//! Common test utilities for concolic-engine
//!
//! `execute` is a miniature concrete interpreter for integer programs. It
//! runs each instruction concretely and reports it to a `ShadowHooks`
//! implementation the way an instrumented VM would: a driver frame
//! introduces the inputs and calls the program, which runs in its own frame.

#![allow(dead_code)]

use concolic_engine::prelude::*;

/// Identity of the exception object raised by a zero divisor
pub const ARITHMETIC_EXCEPTION_ID: u64 = 9_000;

/// One instruction of a test program; jump targets are instruction indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Insn {
    Push(i32),
    Load(usize),
    Store(usize),
    Arith(IntBinOp),
    /// Top of stack against zero
    IfZero(Comparator, usize),
    /// Second against top of stack
    IfCmp(Comparator, usize),
    Goto(usize),
    /// Static `java.lang.Math` call over `arity` ints
    Math(&'static str, usize),
    Return,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub owner: &'static str,
    pub name: &'static str,
    pub params: usize,
    pub locals: usize,
    pub code: Vec<Insn>,
}

impl Program {
    pub fn new(name: &'static str, params: usize, locals: usize, code: Vec<Insn>) -> Self {
        Self {
            owner: "Target",
            name,
            params,
            locals: locals.max(params),
            code,
        }
    }

    pub fn key(&self) -> FunctionKey {
        let descriptor = format!("({})I", "I".repeat(self.params));
        FunctionKey::parse(self.owner, self.name, &descriptor).unwrap()
    }
}

/// How the program left its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exit {
    Returned(i32),
    Threw,
}

/// Run `program` on `inputs`, reporting every step to `hooks`
pub fn execute<H: ShadowHooks>(program: &Program, inputs: &[i32], hooks: &mut H) -> Result<Exit> {
    assert_eq!(inputs.len(), program.params, "one input per parameter");
    let key = program.key();

    hooks.method_begin(&MethodId::new("Driver", "test"), inputs.len())?;
    for &input in inputs {
        hooks.introduce_input(InputKind::Int, ConcreteValue::Int(input))?;
    }
    hooks.invoke(&key, false)?;
    hooks.method_begin(&MethodId::new(program.owner, program.name), program.locals)?;

    let mut locals = vec![0i32; program.locals];
    locals[..inputs.len()].copy_from_slice(inputs);
    let mut stack: Vec<i32> = Vec::new();
    let mut pc = 0;

    loop {
        let site = BranchSite::new(program.owner, program.name, pc as u32);
        match program.code[pc] {
            Insn::Push(v) => {
                stack.push(v);
                hooks.push_constant(ConcreteValue::Int(v))?;
            }
            Insn::Load(i) => {
                stack.push(locals[i]);
                hooks.load_local(i)?;
            }
            Insn::Store(i) => {
                locals[i] = stack.pop().unwrap();
                hooks.store_local(i)?;
            }
            Insn::Arith(op) => {
                let b = stack.pop().unwrap();
                let a = stack.pop().unwrap();
                hooks.int_binary(op, false)?;
                match int_op(op, a, b) {
                    Some(v) => stack.push(v),
                    None => {
                        // Uncaught in the program; the driver's handler catches it
                        let exception = ObjectHandle::new(
                            ARITHMETIC_EXCEPTION_ID,
                            "java.lang.ArithmeticException",
                        );
                        hooks.exception_unwind(1, ConcreteValue::Ref(exception))?;
                        hooks.pop()?;
                        hooks.method_return(false)?;
                        return Ok(Exit::Threw);
                    }
                }
            }
            Insn::IfZero(cmp, target) => {
                let v = stack.pop().unwrap();
                hooks.branch_zero(site, cmp)?;
                if cmp.holds_int(v as i64, 0) {
                    pc = target;
                    continue;
                }
            }
            Insn::IfCmp(cmp, target) => {
                let b = stack.pop().unwrap();
                let a = stack.pop().unwrap();
                hooks.branch_compare(site, cmp)?;
                if cmp.holds_int(a as i64, b as i64) {
                    pc = target;
                    continue;
                }
            }
            Insn::Goto(target) => {
                pc = target;
                continue;
            }
            Insn::Math(name, arity) => {
                let args = stack.split_off(stack.len() - arity);
                let descriptor = format!("({})I", "I".repeat(arity));
                let math = FunctionKey::parse("java/lang/Math", name, &descriptor).unwrap();
                hooks.invoke(&math, false)?;
                let result = math_op(name, &args);
                hooks.call_result(&math, Some(ConcreteValue::Int(result)))?;
                stack.push(result);
            }
            Insn::Return => {
                let v = stack.pop().unwrap();
                hooks.method_return(true)?;
                hooks.call_result(&key, Some(ConcreteValue::Int(v)))?;
                // The driver discards the result
                hooks.pop()?;
                hooks.method_return(false)?;
                return Ok(Exit::Returned(v));
            }
        }
        pc += 1;
    }
}

/// Java `int` semantics; `None` when the operation raises
pub fn int_op(op: IntBinOp, a: i32, b: i32) -> Option<i32> {
    Some(match op {
        IntBinOp::Add => a.wrapping_add(b),
        IntBinOp::Sub => a.wrapping_sub(b),
        IntBinOp::Mul => a.wrapping_mul(b),
        IntBinOp::Div if b == 0 => return None,
        IntBinOp::Div => a.wrapping_div(b),
        IntBinOp::Rem if b == 0 => return None,
        IntBinOp::Rem => a.wrapping_rem(b),
        IntBinOp::And => a & b,
        IntBinOp::Or => a | b,
        IntBinOp::Xor => a ^ b,
        IntBinOp::Shl => a.wrapping_shl(b as u32),
        IntBinOp::Shr => a.wrapping_shr(b as u32),
        IntBinOp::UShr => (a as u32).wrapping_shr(b as u32) as i32,
    })
}

pub fn math_op(name: &str, args: &[i32]) -> i32 {
    match (name, args) {
        ("abs", [a]) => a.wrapping_abs(),
        ("min", [a, b]) => *a.min(b),
        ("max", [a, b]) => *a.max(b),
        _ => panic!("unsupported Math.{} over {} argument(s)", name, args.len()),
    }
}

/// Inputs of the next run: solved values, original values elsewhere
pub fn next_inputs(run: &RunResult, solution: &Solution) -> Vec<i32> {
    run.variables
        .iter()
        .map(|var| {
            let value = solution
                .int(&var.name)
                .or_else(|| var.initial.as_int())
                .unwrap();
            i32::try_from(value).unwrap()
        })
        .collect()
}

/// Run `program` under a fresh concolic run
pub fn concolic(program: &Program, inputs: &[i32], config: &ConcolicConfig) -> (Exit, RunResult) {
    let mut run = ConcolicRun::new(config);
    let exit = execute(program, inputs, &mut run).unwrap();
    (exit, run.finish().unwrap())
}

/// `f(x, y)`: 0 when `x + y <= 100`, else 1 for odd `x` and 2 for even `x`
pub fn classify_program() -> Program {
    use Insn::*;
    Program::new(
        "classify",
        2,
        2,
        vec![
            Load(0),
            Load(1),
            Arith(IntBinOp::Add),
            Push(100),
            IfCmp(Comparator::Gt, 7),
            Push(0),
            Return,
            Load(0),
            Push(2),
            Arith(IntBinOp::Rem),
            IfZero(Comparator::Eq, 13),
            Push(1),
            Return,
            Push(2),
            Return,
        ],
    )
}

/// `f(x)`: counts `x` down to zero
pub fn countdown_program() -> Program {
    use Insn::*;
    Program::new(
        "countdown",
        1,
        1,
        vec![
            Load(0),
            IfZero(Comparator::Le, 7),
            Load(0),
            Push(1),
            Arith(IntBinOp::Sub),
            Store(0),
            Goto(0),
            Push(0),
            Return,
        ],
    )
}

/// `f(x)`: `100 / x`
pub fn divide_program() -> Program {
    use Insn::*;
    Program::new(
        "divide",
        1,
        1,
        vec![Push(100), Load(0), Arith(IntBinOp::Div), Return],
    )
}
