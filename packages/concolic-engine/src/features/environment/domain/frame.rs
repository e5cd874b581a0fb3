//! Call frames

use super::operand::Operand;
use crate::errors::{ConcolicError, Result};

/// One activation: operand stack plus local shadow slots
#[derive(Debug, Clone)]
pub struct Frame {
    pub method: String,
    stack: Vec<Operand>,
    locals: Vec<Option<Operand>>,
}

impl Frame {
    pub fn new(method: impl Into<String>, max_locals: usize) -> Self {
        Self {
            method: method.into(),
            stack: Vec::new(),
            locals: vec![None; max_locals],
        }
    }

    pub fn push(&mut self, operand: Operand) {
        self.stack.push(operand);
    }

    pub fn pop(&mut self) -> Result<Operand> {
        self.stack.pop().ok_or_else(|| self.underflow(1))
    }

    /// Operand `depth` slots below the top (0 is the top)
    pub fn peek(&self, depth: usize) -> Result<&Operand> {
        let len = self.stack.len();
        if depth >= len {
            return Err(self.underflow(depth + 1));
        }
        Ok(&self.stack[len - 1 - depth])
    }

    /// Pop `n` operands, returned in push order
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Operand>> {
        if n > self.stack.len() {
            return Err(self.underflow(n));
        }
        let at = self.stack.len() - n;
        Ok(self.stack.split_off(at))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    pub fn store_local(&mut self, index: usize, operand: Operand) {
        if index >= self.locals.len() {
            self.locals.resize(index + 1, None);
        }
        self.locals[index] = Some(operand);
    }

    pub fn load_local(&self, index: usize) -> Result<&Operand> {
        self.locals
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| ConcolicError::UninitializedLocal {
                method: self.method.clone(),
                index,
            })
    }

    fn underflow(&self, needed: usize) -> ConcolicError {
        ConcolicError::StackUnderflow {
            method: self.method.clone(),
            needed,
            available: self.stack.len(),
        }
    }
}
