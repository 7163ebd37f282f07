pub mod config;
pub mod program;
pub mod vm;

pub use crate::config::Config;
pub use crate::program::{Program, ProgramError};
pub use crate::vm::{FlagBuffer, Op, VMError, VM};
