//! Stack-and-memory virtual machine
//!
//! The VM is divided into small components, each with one responsibility:
//!
//! - **stack.rs**: the double-ended value stack, behind the `StackOps` trait.
//! - **memory.rs**: sparse memory slots with zero defaults and the bulk
//!   stack/memory transfers.
//! - **flag.rs**: the read-only flag buffer.
//! - **arithmetic.rs**: the six ALU operators.
//! - **types.rs**: the instruction set (`Op`) and trace events (`VMEvent`).
//! - **execution.rs**: the `EventHandler` output seam and its implementations.
//! - **errors.rs**: the fatal error kinds.
//! - **vm.rs**: the dispatcher and run loop.

pub mod arithmetic;
pub mod errors;
pub mod execution;
pub mod flag;
pub mod memory;
pub mod stack;
pub mod types;
mod vm;

pub use arithmetic::AluOp;
pub use errors::VMError;
pub use execution::{ConsoleOutput, EventHandler, VMOutput, DONE_MARKER};
pub use flag::FlagBuffer;
pub use memory::VMMemory;
pub use stack::{StackOps, VMStack};
pub use types::{Op, UnknownMnemonic, VMEvent, HALTED, JUMP_TRAP_ADDRESS};
pub use vm::{RunSummary, VM};
