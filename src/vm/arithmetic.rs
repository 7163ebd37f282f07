//! ALU operations
//!
//! The six binary instructions share one evaluation pattern (see
//! `VM::execute_alu`); this module only defines the operators themselves.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::vm::errors::VMError;

/// Binary operator applied to two memory slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// `_bitAnd`
    BitAnd,
    /// `_bitXor`
    BitXor,
    /// `_sub`
    Sub,
    /// `_add`
    Add,
    /// `_mul2Pow`: `x * 2^y`
    Mul2Pow,
    /// `_div2Pow`: floor division by `2^y`, sign-aware
    Div2Pow,
}

impl AluOp {
    pub const ALL: [AluOp; 6] = [
        AluOp::BitAnd,
        AluOp::BitXor,
        AluOp::Sub,
        AluOp::Add,
        AluOp::Mul2Pow,
        AluOp::Div2Pow,
    ];

    /// Instruction name in program text
    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::BitAnd => "_bitAnd",
            AluOp::BitXor => "_bitXor",
            AluOp::Sub => "_sub",
            AluOp::Add => "_add",
            AluOp::Mul2Pow => "_mul2Pow",
            AluOp::Div2Pow => "_div2Pow",
        }
    }

    /// Operator symbol shown in trace lines
    pub fn symbol(self) -> &'static str {
        match self {
            AluOp::BitAnd => "&",
            AluOp::BitXor => "^",
            AluOp::Sub => "-",
            AluOp::Add => "+",
            AluOp::Mul2Pow => "<<",
            AluOp::Div2Pow => ">>",
        }
    }

    /// Compute `x op y`. Only the shifts can fail, on a negative or
    /// unrepresentable shift amount.
    pub fn apply(self, x: &BigInt, y: &BigInt, pc: i64) -> Result<BigInt, VMError> {
        let result = match self {
            AluOp::BitAnd => x & y,
            AluOp::BitXor => x ^ y,
            AluOp::Sub => x - y,
            AluOp::Add => x + y,
            AluOp::Mul2Pow => x << shift_amount(y, pc)?,
            AluOp::Div2Pow => div_2_pow(x, shift_amount(y, pc)?),
        };
        Ok(result)
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

fn shift_amount(y: &BigInt, pc: i64) -> Result<usize, VMError> {
    y.to_usize().ok_or_else(|| VMError::InvalidShiftAmount {
        amount: y.clone(),
        pc,
    })
}

/// `floor(x / 2^n)` for non-negative `x`, `~floor(~x / 2^n)` for negative `x`.
/// Both branches only ever shift a non-negative value.
pub fn div_2_pow(x: &BigInt, n: usize) -> BigInt {
    if x.is_negative() {
        !((!x) >> n)
    } else {
        x >> n
    }
}
