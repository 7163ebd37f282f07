//! Main Virtual Machine implementation
//!
//! The VM struct brings together the stack, memory bank, flag buffer and an
//! output handler, and owns the dispatch loop:
//!
//! 1. fetch the mnemonic at the instruction pointer from the `Program`
//! 2. resolve it to an `Op` (unknown names are fatal)
//! 3. run the handler, which moves the pointer itself
//!
//! until the pointer reaches the halt sentinel.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use serde::Serialize;

use crate::program::Program;
use crate::vm::arithmetic::AluOp;
use crate::vm::errors::VMError;
use crate::vm::execution::{EventHandler, VMOutput};
use crate::vm::flag::FlagBuffer;
use crate::vm::memory::{VMMemory, ACCUMULATOR};
use crate::vm::stack::{StackOps, VMStack};
use crate::vm::types::{Op, VMEvent, HALTED, JUMP_TRAP_ADDRESS};

/// Final machine state, rendered for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub pc: i64,
    pub stack: Vec<String>,
    pub memory: BTreeMap<usize, String>,
}

/// The stack-and-memory machine
#[derive(Debug)]
pub struct VM<H: EventHandler = VMOutput> {
    /// Stack operations
    pub stack: VMStack,

    /// Memory slots
    pub memory: VMMemory,

    /// Secret bytes read by `pushFlagAtA0`
    flag: FlagBuffer,

    /// Address of the next instruction, `HALTED` once stopped
    pc: i64,

    /// Successful dispatches so far
    steps: u64,

    /// Receives trace events, decoded output and the halt marker
    handler: H,
}

impl VM<VMOutput> {
    /// Create a VM that buffers its output
    pub fn new(flag: FlagBuffer) -> Self {
        Self::with_handler(flag, VMOutput::new())
    }
}

impl<H: EventHandler> VM<H> {
    /// Create a VM reporting to `handler`
    pub fn with_handler(flag: FlagBuffer, handler: H) -> Self {
        Self {
            stack: VMStack::new(),
            memory: VMMemory::new(),
            flag,
            pc: 0,
            steps: 0,
            handler,
        }
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    /// Move the instruction pointer, e.g. to resume at a given address
    pub fn set_pc(&mut self, pc: i64) {
        self.pc = pc;
    }

    pub fn is_halted(&self) -> bool {
        self.pc == HALTED
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn flag(&self) -> &FlagBuffer {
        &self.flag
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Snapshot of the current state
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.steps,
            pc: self.pc,
            stack: self.stack.iter().map(|v| v.to_string()).collect(),
            memory: self
                .memory
                .iter()
                .map(|(slot, value)| (slot, value.to_string()))
                .collect(),
        }
    }

    /// Run until the machine halts, then report completion. Returns the
    /// number of dispatches.
    pub fn run(&mut self, program: &Program) -> Result<u64, VMError> {
        log::info!("Running program of {} instructions", program.len());
        while !self.is_halted() {
            self.step(program)?;
        }
        log::info!("Halted after {} steps", self.steps);
        self.handler.halted(self.steps);
        Ok(self.steps)
    }

    /// Dispatch the instruction at the current pointer. Does nothing once
    /// halted.
    pub fn step(&mut self, program: &Program) -> Result<(), VMError> {
        if self.is_halted() {
            return Ok(());
        }
        let mnemonic = program
            .get(self.pc)
            .ok_or_else(|| VMError::InvalidInstruction {
                pc: self.pc,
                reason: format!(
                    "address is outside the program ({} instructions)",
                    program.len()
                ),
            })?;
        self.dispatch(mnemonic)
    }

    /// Resolve a mnemonic and execute it. An unknown mnemonic fails before
    /// any state changes.
    pub fn dispatch(&mut self, mnemonic: &str) -> Result<(), VMError> {
        let op = mnemonic
            .parse::<Op>()
            .map_err(|err| VMError::InvalidInstruction {
                pc: self.pc,
                reason: err.to_string(),
            })?;
        self.execute_op(op)
    }

    /// Execute one operation
    pub fn execute_op(&mut self, op: Op) -> Result<(), VMError> {
        log::trace!("{:<6} {}", self.pc, op);
        let pc = self.pc;

        match op {
            Op::Push => {
                let value = self.memory.get(ACCUMULATOR);
                self.stack.push_front(value);
                self.pc += 1;
            }

            Op::Pop => {
                let value = self.stack.pop_front(op.mnemonic(), pc)?;
                self.memory.set(ACCUMULATOR, value);
                self.pc += 1;
            }

            Op::Inc => {
                let value = self.memory.get(ACCUMULATOR) + 1;
                self.memory.set(ACCUMULATOR, value);
                self.pc += 1;
            }

            Op::Dec => {
                let value = self.memory.get(ACCUMULATOR) - 1;
                self.memory.set(ACCUMULATOR, value);
                self.pc += 1;
            }

            Op::SwapStack => {
                self.stack.swap_top2(op.mnemonic(), pc)?;
                self.pc += 1;
            }

            Op::ClearStackToMem => {
                self.memory.snapshot_from_stack(&mut self.stack);
                self.pc += 1;
            }

            Op::ClearMemToStack => {
                self.memory
                    .rebuild_stack_from_snapshot(&mut self.stack, pc)?;
                self.pc += 1;
            }

            Op::PushFlagAtA0 => self.push_flag(),

            Op::JumpToA0 => self.jump()?,

            Op::PrintBuf => self.print_buf()?,

            Op::Exit => {
                self.pc = HALTED;
            }

            Op::NonNoop => {
                self.pc += 1;
            }

            Op::Alu(alu) => self.execute_alu(alu)?,
        }

        self.steps += 1;
        Ok(())
    }

    /// Pop slot indices `x` then `y`, store `mem[x] op mem[y]` into `x`
    fn execute_alu(&mut self, op: AluOp) -> Result<(), VMError> {
        let pc = self.pc;
        let (x, y) = self.stack.pop_two(op.mnemonic(), pc)?;

        let (slot, lhs, rhs, result) = match self.evaluate_alu(op, &x, &y) {
            Ok(evaluated) => evaluated,
            Err(err) => {
                // Put the operands back so the failed dispatch changes nothing
                self.stack.push_front(y);
                self.stack.push_front(x);
                return Err(err);
            }
        };

        self.memory.set(slot, result.clone());
        self.pc += 1;
        self.report(|_| VMEvent::Alu {
            pc,
            slot,
            op,
            lhs,
            rhs,
            result,
        });
        Ok(())
    }

    fn evaluate_alu(
        &self,
        op: AluOp,
        x: &BigInt,
        y: &BigInt,
    ) -> Result<(usize, BigInt, BigInt, BigInt), VMError> {
        let x_slot = self.slot_index(x)?;
        let y_slot = self.slot_index(y)?;
        let lhs = self.memory.get(x_slot);
        let rhs = self.memory.get(y_slot);
        let result = op.apply(&lhs, &rhs, self.pc)?;
        Ok((x_slot, lhs, rhs, result))
    }

    fn slot_index(&self, value: &BigInt) -> Result<usize, VMError> {
        value.to_usize().ok_or_else(|| VMError::InvalidMemorySlot {
            slot: value.clone(),
            pc: self.pc,
        })
    }

    fn push_flag(&mut self) {
        let pc = self.pc;
        let index = self.memory.get(ACCUMULATOR);
        let value = match self.flag.get(&index) {
            Some(byte) => BigInt::from(byte),
            None => {
                log::debug!("Flag index {} out of range at {}", index, pc);
                -BigInt::one()
            }
        };
        self.stack.push_front(value);
        self.pc += 1;

        self.report(|vm| VMEvent::PushFlag {
            pc,
            index,
            stack: vm.stack.to_string(),
        });
    }

    fn jump(&mut self) -> Result<(), VMError> {
        let from = self.pc;
        let to = if from == JUMP_TRAP_ADDRESS {
            JUMP_TRAP_ADDRESS + 1
        } else {
            let target = BigInt::from(from) + self.memory.get(ACCUMULATOR);
            target.to_i64().ok_or_else(|| VMError::InvalidInstruction {
                pc: from,
                reason: format!("jump target {} is out of range", target),
            })?
        };
        self.pc = to;

        self.report(|vm| VMEvent::Jump {
            from,
            to,
            stack: vm.stack.to_string(),
            memory: vm.memory.to_string(),
        });
        Ok(())
    }

    fn print_buf(&mut self) -> Result<(), VMError> {
        let pc = self.pc;
        let text = self
            .stack
            .iter()
            .map(|code| {
                code.to_u32()
                    .and_then(char::from_u32)
                    .ok_or_else(|| VMError::InvalidCharacter {
                        code: code.clone(),
                        pc,
                    })
            })
            .collect::<Result<String, VMError>>()?;

        self.stack.clear();
        self.pc += 1;
        log::info!("Output at {}: {}", pc, text);
        self.handler.emit(&text);
        Ok(())
    }

    /// Build a trace event and hand it to the handler. Stack and memory
    /// snapshots are only rendered when someone will see them.
    fn report<F>(&mut self, build: F)
    where
        F: FnOnce(&Self) -> VMEvent,
    {
        let wanted = self.handler.wants_events();
        if !wanted && !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let event = build(self);
        log::debug!("[{}] {}", event.category(), event);
        if wanted {
            self.handler.emit_event(&event);
        }
    }
}
