//! Program loading
//!
//! A program is an ordered list of mnemonics, one per address. Text programs
//! hold one mnemonic per line; JSON programs are an array of strings.
//! Mnemonics are kept as text: an unknown one only fails when the VM actually
//! dispatches it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a program
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("Program file not found: {0}")]
    NotFound(String),

    #[error("IO error reading program: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in program: {0}")]
    Json(#[from] serde_json::Error),
}

/// Instruction sequence addressed by a zero-based index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<String>,
}

impl Program {
    pub fn new(instructions: Vec<String>) -> Self {
        Self { instructions }
    }

    /// Parse line-oriented program text. Each line is trimmed; blank lines
    /// stay in place so addresses match line numbers.
    pub fn parse(source: &str) -> Self {
        Self::new(source.lines().map(|line| line.trim().to_string()).collect())
    }

    /// Parse a JSON array of mnemonics
    pub fn from_json(source: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a program file, as JSON for `.json` files and line text otherwise
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProgramError::NotFound(path.display().to_string()));
        }

        let source = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let program = if is_json {
            Self::from_json(&source)?
        } else {
            Self::parse(&source)
        };
        log::debug!(
            "Loaded {} instructions from {}",
            program.len(),
            path.display()
        );
        Ok(program)
    }

    /// Mnemonic at `address`, if it is inside the program
    pub fn get(&self, address: i64) -> Option<&str> {
        usize::try_from(address)
            .ok()
            .and_then(|i| self.instructions.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }
}

impl<S: Into<String>> FromIterator<S> for Program {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
