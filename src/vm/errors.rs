//! Error types for VM operations
//!
//! Every variant is fatal: the run stops at the first one and the error carries
//! the instruction pointer of the failing dispatch.

use num_bigint::BigInt;
use thiserror::Error;

/// Error variants that can occur during VM execution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VMError {
    /// Unknown mnemonic, or the pointer does not address an instruction
    #[error("Invalid instruction at {pc}: {reason}")]
    InvalidInstruction { pc: i64, reason: String },

    /// Stack underflow occurs when trying to pop more values than are available
    #[error("Stack underflow during {op_name} at {pc}")]
    StackUnderflow { op_name: String, pc: i64 },

    /// `clearMemToStack` found a gap in the contiguous slot range
    #[error("Memory slot {slot} missing during clearMemToStack at {pc}")]
    MissingMemorySlot { slot: usize, pc: i64 },

    /// A slot index popped off the stack is negative or too large
    #[error("Invalid memory slot {slot} at {pc}")]
    InvalidMemorySlot { slot: BigInt, pc: i64 },

    /// A shift amount is negative or too large
    #[error("Invalid shift amount {amount} at {pc}")]
    InvalidShiftAmount { amount: BigInt, pc: i64 },

    /// `printBuf` met a value that is not a character code
    #[error("Value {code} is not a valid character code at {pc}")]
    InvalidCharacter { code: BigInt, pc: i64 },
}

impl VMError {
    /// Instruction pointer of the dispatch that failed
    pub fn pc(&self) -> i64 {
        match self {
            VMError::InvalidInstruction { pc, .. }
            | VMError::StackUnderflow { pc, .. }
            | VMError::MissingMemorySlot { pc, .. }
            | VMError::InvalidMemorySlot { pc, .. }
            | VMError::InvalidShiftAmount { pc, .. }
            | VMError::InvalidCharacter { pc, .. } => *pc,
        }
    }
}
