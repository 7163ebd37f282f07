//! Read-only flag buffer inspected by `pushFlagAtA0`

use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Fixed byte sequence set once when the VM is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagBuffer {
    bytes: Vec<u8>,
}

impl FlagBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Byte at `index`. Negative indices count back from the end, so the
    /// readable range is `-len <= index < len`.
    pub fn get(&self, index: &BigInt) -> Option<u8> {
        let index = index.to_i64()?;
        let len = i64::try_from(self.bytes.len()).ok()?;
        let i = if index < 0 { len + index } else { index };
        usize::try_from(i)
            .ok()
            .and_then(|i| self.bytes.get(i).copied())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for FlagBuffer {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for FlagBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
