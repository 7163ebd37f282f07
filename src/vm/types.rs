//! Type definitions for the virtual machine
//!
//! The primary types defined here include:
//! - `Op`: the closed instruction set, parsed from mnemonics
//! - `VMEvent`: trace events emitted while executing

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::vm::arithmetic::AluOp;

/// Address at which `jumpToA0` ignores the accumulator and falls through
pub const JUMP_TRAP_ADDRESS: i64 = 52616;

/// Instruction pointer value meaning the machine has halted
pub const HALTED: i64 = -1;

/// Operation types for the virtual machine
///
/// Every handler advances the instruction pointer itself; the dispatcher never
/// does it implicitly. Serialized as its mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Op {
    /// Push the accumulator (slot 0) onto the stack
    Push,

    /// Pop the top of the stack into the accumulator
    Pop,

    /// Increment the accumulator
    Inc,

    /// Decrement the accumulator
    Dec,

    /// Swap the two topmost stack values
    SwapStack,

    /// Move the whole stack into memory slots `0..n`
    ClearStackToMem,

    /// Move memory slots `0..m` back onto the stack
    ClearMemToStack,

    /// Push the flag byte indexed by the accumulator, or -1 out of range
    PushFlagAtA0,

    /// Relative jump by the accumulator
    JumpToA0,

    /// Decode the stack as character codes and output it
    PrintBuf,

    /// Halt
    Exit,

    /// Do nothing
    NonNoop,

    /// Pop two slot indices and combine their values into the first
    Alu(AluOp),
}

impl Op {
    /// Every instruction in the set
    pub const ALL: [Op; 18] = [
        Op::SwapStack,
        Op::Exit,
        Op::Pop,
        Op::Push,
        Op::Inc,
        Op::Dec,
        Op::ClearStackToMem,
        Op::ClearMemToStack,
        Op::PushFlagAtA0,
        Op::JumpToA0,
        Op::PrintBuf,
        Op::NonNoop,
        Op::Alu(AluOp::BitAnd),
        Op::Alu(AluOp::BitXor),
        Op::Alu(AluOp::Sub),
        Op::Alu(AluOp::Add),
        Op::Alu(AluOp::Mul2Pow),
        Op::Alu(AluOp::Div2Pow),
    ];

    /// Instruction name in program text
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Push => "push",
            Op::Pop => "pop",
            Op::Inc => "inc",
            Op::Dec => "dec",
            Op::SwapStack => "swapStack",
            Op::ClearStackToMem => "clearStackToMem",
            Op::ClearMemToStack => "clearMemToStack",
            Op::PushFlagAtA0 => "pushFlagAtA0",
            Op::JumpToA0 => "jumpToA0",
            Op::PrintBuf => "printBuf",
            Op::Exit => "exit",
            Op::NonNoop => "nonNoop",
            Op::Alu(alu) => alu.mnemonic(),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A mnemonic outside the instruction set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMnemonic(pub String);

impl fmt::Display for UnknownMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction {} not found", self.0)
    }
}

impl std::error::Error for UnknownMnemonic {}

impl FromStr for Op {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "swapStack" => Op::SwapStack,
            "exit" => Op::Exit,
            "pop" => Op::Pop,
            "push" => Op::Push,
            "inc" => Op::Inc,
            "dec" => Op::Dec,
            "clearStackToMem" => Op::ClearStackToMem,
            "clearMemToStack" => Op::ClearMemToStack,
            "pushFlagAtA0" => Op::PushFlagAtA0,
            "jumpToA0" => Op::JumpToA0,
            "printBuf" => Op::PrintBuf,
            "nonNoop" => Op::NonNoop,
            "_bitAnd" => Op::Alu(AluOp::BitAnd),
            "_bitXor" => Op::Alu(AluOp::BitXor),
            "_sub" => Op::Alu(AluOp::Sub),
            "_add" => Op::Alu(AluOp::Add),
            "_mul2Pow" => Op::Alu(AluOp::Mul2Pow),
            "_div2Pow" => Op::Alu(AluOp::Div2Pow),
            other => return Err(UnknownMnemonic(other.to_string())),
        };
        Ok(op)
    }
}

impl TryFrom<String> for Op {
    type Error = UnknownMnemonic;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Op> for String {
    fn from(op: Op) -> Self {
        op.mnemonic().to_string()
    }
}

/// Trace events emitted while executing
///
/// `Display` renders the one-line trace text for each event.
#[derive(Debug, Clone, PartialEq)]
pub enum VMEvent {
    /// An ALU instruction wrote `result` into slot `slot`
    Alu {
        pc: i64,
        slot: usize,
        op: AluOp,
        lhs: BigInt,
        rhs: BigInt,
        result: BigInt,
    },

    /// `pushFlagAtA0` pushed a flag byte (or -1); `stack` is the stack afterwards
    PushFlag {
        pc: i64,
        index: BigInt,
        stack: String,
    },

    /// `jumpToA0` moved the pointer; `stack` and `memory` are rendered snapshots
    Jump {
        from: i64,
        to: i64,
        stack: String,
        memory: String,
    },
}

impl VMEvent {
    /// Short tag naming the kind of event
    pub fn category(&self) -> &'static str {
        match self {
            VMEvent::Alu { .. } => "alu",
            VMEvent::PushFlag { .. } => "flag",
            VMEvent::Jump { .. } => "jump",
        }
    }
}

impl fmt::Display for VMEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VMEvent::Alu {
                pc,
                slot,
                op,
                lhs,
                rhs,
                result,
            } => write!(
                f,
                "{:<6}: mem[{}] = {:>10} {:<2} {:>10} ({})",
                pc,
                slot,
                lhs,
                op.symbol(),
                rhs,
                result
            ),
            VMEvent::PushFlag { pc, index, stack } => write!(
                f,
                "Pushing flag at {} at line {}, stack is now {}",
                index, pc, stack
            ),
            VMEvent::Jump {
                from,
                to,
                stack,
                memory,
            } => write!(f, "Jumping to {} from {} {} {}", to, from, stack, memory),
        }
    }
}
