//! VM Stack operations
//!
//! The stack is double-ended with its top at the front: values enter and leave
//! at index 0, and bulk operations (`printBuf`, `clearStackToMem`) read it
//! front-to-back.
//!
//! The module defines a `StackOps` trait that encapsulates the operations
//! the dispatcher needs, implemented by `VMStack`.

use std::collections::VecDeque;
use std::fmt;

use num_bigint::BigInt;

use crate::vm::errors::VMError;

/// Defines operations that can be performed on a stack
pub trait StackOps {
    /// Push a value onto the top of the stack
    fn push_front(&mut self, value: BigInt);

    /// Pop the top value
    fn pop_front(&mut self, op_name: &str, pc: i64) -> Result<BigInt, VMError>;

    /// Pop the two topmost values, returned in pop order (top first)
    fn pop_two(&mut self, op_name: &str, pc: i64) -> Result<(BigInt, BigInt), VMError>;

    /// Exchange the two topmost values
    fn swap_top2(&mut self, op_name: &str, pc: i64) -> Result<(), VMError>;

    /// Return the top value without popping it
    fn top(&self) -> Option<&BigInt>;

    /// Remove every value, returned front-to-back
    fn drain_all(&mut self) -> Vec<BigInt>;

    /// Clear the stack
    fn clear(&mut self);

    /// Get the stack length
    fn len(&self) -> usize;

    /// Check if the stack is empty
    fn is_empty(&self) -> bool;
}

/// Provides stack operations for the virtual machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VMStack {
    /// Values with the top of the stack at index 0
    stack: VecDeque<BigInt>,
}

impl VMStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            stack: VecDeque::new(),
        }
    }

    /// Iterate front-to-back
    pub fn iter(&self) -> impl Iterator<Item = &BigInt> {
        self.stack.iter()
    }

    /// Get the current stack values, front-to-back
    pub fn get_stack(&self) -> Vec<BigInt> {
        self.stack.iter().cloned().collect()
    }

    fn underflow(op_name: &str, pc: i64) -> VMError {
        VMError::StackUnderflow {
            op_name: op_name.to_string(),
            pc,
        }
    }
}

impl StackOps for VMStack {
    fn push_front(&mut self, value: BigInt) {
        self.stack.push_front(value);
    }

    fn pop_front(&mut self, op_name: &str, pc: i64) -> Result<BigInt, VMError> {
        self.stack
            .pop_front()
            .ok_or_else(|| Self::underflow(op_name, pc))
    }

    fn pop_two(&mut self, op_name: &str, pc: i64) -> Result<(BigInt, BigInt), VMError> {
        // Checked up front so a failed pop leaves the stack untouched
        if self.stack.len() < 2 {
            return Err(Self::underflow(op_name, pc));
        }
        let first = self.pop_front(op_name, pc)?;
        let second = self.pop_front(op_name, pc)?;
        Ok((first, second))
    }

    fn swap_top2(&mut self, op_name: &str, pc: i64) -> Result<(), VMError> {
        if self.stack.len() < 2 {
            return Err(Self::underflow(op_name, pc));
        }
        self.stack.swap(0, 1);
        Ok(())
    }

    fn top(&self) -> Option<&BigInt> {
        self.stack.front()
    }

    fn drain_all(&mut self) -> Vec<BigInt> {
        self.stack.drain(..).collect()
    }

    fn clear(&mut self) {
        self.stack.clear();
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl FromIterator<BigInt> for VMStack {
    /// Build a stack from values given front-to-back
    fn from_iter<I: IntoIterator<Item = BigInt>>(iter: I) -> Self {
        Self {
            stack: iter.into_iter().collect(),
        }
    }
}

/// Renders like a list literal: `[104, 3, -1]`
impl fmt::Display for VMStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.stack.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", items.join(", "))
    }
}
