//! VM Memory bank
//!
//! Sparse integer-keyed slots. An absent slot reads as zero; slot 0 is the
//! accumulator used by `push`, `pop`, `inc`, `dec`, `pushFlagAtA0` and
//! `jumpToA0`.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::vm::errors::VMError;
use crate::vm::stack::{StackOps, VMStack};

/// Slot used as the accumulator
pub const ACCUMULATOR: usize = 0;

/// Provides memory operations for the virtual machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VMMemory {
    /// Occupied slots, ordered by index
    slots: BTreeMap<usize, BigInt>,
}

impl VMMemory {
    /// Create a new empty memory bank
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Read a slot, zero if it was never written
    pub fn get(&self, slot: usize) -> BigInt {
        self.slots.get(&slot).cloned().unwrap_or_else(BigInt::zero)
    }

    /// Write a slot
    pub fn set(&mut self, slot: usize, value: BigInt) {
        self.slots.insert(slot, value);
    }

    /// Whether a slot has been written
    pub fn contains(&self, slot: usize) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Replace the whole bank with the stack contents (slot i = i-th value
    /// front-to-back) and empty the stack
    pub fn snapshot_from_stack(&mut self, stack: &mut VMStack) {
        self.slots = stack.drain_all().into_iter().enumerate().collect();
    }

    /// Rebuild the stack from slots `0..len()` (front = slot 0) and empty the
    /// bank. Fails without touching either side if a slot in that range is
    /// absent.
    pub fn rebuild_stack_from_snapshot(
        &mut self,
        stack: &mut VMStack,
        pc: i64,
    ) -> Result<(), VMError> {
        let count = self.slots.len();
        let values = (0..count)
            .map(|slot| {
                self.slots
                    .get(&slot)
                    .cloned()
                    .ok_or(VMError::MissingMemorySlot { slot, pc })
            })
            .collect::<Result<VMStack, VMError>>()?;

        *stack = values;
        self.slots.clear();
        Ok(())
    }

    /// Iterate occupied slots in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BigInt)> {
        self.slots.iter().map(|(slot, value)| (*slot, value))
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Clear all slots
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Renders like a map literal: `{0: 5, 3: 4}`
impl fmt::Display for VMMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .slots
            .iter()
            .map(|(slot, value)| format!("{}: {}", slot, value))
            .collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}
