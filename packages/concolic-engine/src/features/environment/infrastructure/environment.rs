//! Symbolic environment of one concolic run
//!
//! Frame stack, symbolic heap and the run-scoped variable factory. Frame
//! push/pop must happen exactly once per concrete call/return; any
//! desynchronization surfaces as a fatal `ConcolicError`.

use std::sync::Arc;
use tracing::debug;

use crate::errors::{ConcolicError, Result};
use crate::features::environment::domain::heap::is_backing_field;
use crate::features::environment::domain::{
    backing_field, ConcreteValue, Frame, ObjectHandle, Operand, SymbolicHeap,
};
use crate::features::expression::domain::{Expr, ObjectId, Sort, Value, Variable, VariableFactory};

#[derive(Debug)]
pub struct SymbolicEnvironment {
    frames: Vec<Frame>,
    heap: SymbolicHeap,
    factory: VariableFactory,
    variables: Vec<Arc<Variable>>,
    lazy_field_variables: bool,
}

impl Default for SymbolicEnvironment {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SymbolicEnvironment {
    pub fn new(lazy_field_variables: bool) -> Self {
        Self {
            frames: Vec::new(),
            heap: SymbolicHeap::new(),
            factory: VariableFactory::new(),
            variables: Vec::new(),
            lazy_field_variables,
        }
    }

    // ━━━ Frames ━━━

    pub fn push_frame(&mut self, method: impl Into<String>, max_locals: usize) {
        self.frames.push(Frame::new(method, max_locals));
    }

    pub fn pop_frame(&mut self) -> Result<Frame> {
        self.frames
            .pop()
            .ok_or_else(|| ConcolicError::FrameUnderflow("pop on empty call stack".to_string()))
    }

    pub fn top_frame(&self) -> Result<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| ConcolicError::FrameUnderflow("no active frame".to_string()))
    }

    pub fn top_frame_mut(&mut self) -> Result<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| ConcolicError::FrameUnderflow("no active frame".to_string()))
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    // ━━━ Operand stack of the active frame ━━━

    pub fn push(&mut self, operand: Operand) -> Result<()> {
        self.top_frame_mut()?.push(operand);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Operand> {
        self.top_frame_mut()?.pop()
    }

    pub fn peek(&self, depth: usize) -> Result<&Operand> {
        self.top_frame()?.peek(depth)
    }

    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Operand>> {
        self.top_frame_mut()?.pop_n(n)
    }

    pub fn store_local(&mut self, index: usize, operand: Operand) -> Result<()> {
        self.top_frame_mut()?.store_local(index, operand);
        Ok(())
    }

    pub fn load_local(&self, index: usize) -> Result<Operand> {
        self.top_frame()?.load_local(index).cloned()
    }

    // ━━━ Variables ━━━

    /// Introduce a fresh run-scoped input variable
    pub fn new_variable(&mut self, sort: Sort, concrete: Value, min: i64, max: i64) -> Expr {
        let var = self.factory.fresh(sort, concrete, min, max);
        self.variables.push(Arc::clone(&var));
        Expr::variable(var)
    }

    /// Variables introduced so far, in introduction order
    pub fn variables(&self) -> &[Arc<Variable>] {
        &self.variables
    }

    // ━━━ Heap ━━━

    pub fn heap(&self) -> &SymbolicHeap {
        &self.heap
    }

    /// Read an instance field holding a primitive
    ///
    /// A never-written user field introduces a fresh variable bound to its
    /// current concrete value, ranging over `bounds` (the field type's
    /// representable values); backing fields of value objects and (with
    /// lazy variables disabled) user fields default to a constant.
    pub fn get_field(
        &mut self,
        class: &str,
        field: &str,
        id: ObjectId,
        concrete: &ConcreteValue,
        bounds: (i64, i64),
    ) -> Option<Expr> {
        if let Some(expr) = self.heap.get_field(class, field, id) {
            return Some(expr.clone());
        }
        let (sort, value) = (concrete.sort()?, concrete.value()?);
        if is_backing_field(field) || !self.lazy_field_variables {
            return Some(Expr::constant(sort, value));
        }
        let (min, max) = bounds;
        let expr = self.new_variable(sort, value, min, max);
        debug!(
            "Lazy variable {} for field {}.{} of {}",
            expr, class, field, id
        );
        self.heap.put_field(class, field, id, expr.clone());
        Some(expr)
    }

    pub fn put_field(&mut self, class: &str, field: &str, id: ObjectId, expr: Expr) {
        self.heap.put_field(class, field, id, expr);
    }

    pub fn get_static(
        &mut self,
        class: &str,
        field: &str,
        concrete: &ConcreteValue,
        bounds: (i64, i64),
    ) -> Option<Expr> {
        if let Some(expr) = self.heap.get_static(class, field) {
            return Some(expr.clone());
        }
        let (sort, value) = (concrete.sort()?, concrete.value()?);
        if !self.lazy_field_variables {
            return Some(Expr::constant(sort, value));
        }
        let (min, max) = bounds;
        let expr = self.new_variable(sort, value, min, max);
        debug!("Lazy variable {} for static {}.{}", expr, class, field);
        self.heap.put_static(class, field, expr.clone());
        Some(expr)
    }

    pub fn put_static(&mut self, class: &str, field: &str, expr: Expr) {
        self.heap.put_static(class, field, expr);
    }

    /// Contents of a value object: its heap entry, else a constant of the snapshot
    pub fn value_of(&self, handle: &ObjectHandle) -> Option<Expr> {
        let (field, sort) = backing_field(&handle.class)?;
        if let Some(expr) = self.heap.get_field(&handle.class, field, handle.id) {
            return Some(expr.clone());
        }
        let snapshot = handle.snapshot.clone()?;
        Some(Expr::constant(sort, snapshot))
    }

    /// Re-bind the contents of a value object after a value-producing call
    ///
    /// A concrete result clears the entry instead, so fully concrete
    /// operations never leave a heap entry behind.
    pub fn rebind_value(&mut self, handle: &ObjectHandle, expr: Option<Expr>) {
        let Some((field, _)) = backing_field(&handle.class) else {
            return;
        };
        match expr.filter(Expr::contains_symbolic_variable) {
            Some(expr) => self.heap.put_field(&handle.class, field, handle.id, expr),
            None => self.heap.clear_field(&handle.class, field, handle.id),
        }
    }
}
