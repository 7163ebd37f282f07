use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Program file read when none is given
pub const DEFAULT_PROGRAM: &str = "instrs.txt";

/// Flag text used when none is given
pub const DEFAULT_FLAG: &str = "halloooo";

pub const PROGRAM_VAR: &str = "FLAG_VM_PROGRAM";
pub const FLAG_VAR: &str = "FLAG_VM_FLAG";
pub const QUIET_VAR: &str = "FLAG_VM_QUIET";

/// Run settings. Defaults, then environment, then command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub program_path: PathBuf,
    pub flag: String,
    /// Hide trace lines
    pub quiet: bool,
    /// Print the final machine state after halting
    pub summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program_path: PathBuf::from(DEFAULT_PROGRAM),
            flag: DEFAULT_FLAG.to_string(),
            quiet: false,
            summary: false,
        }
    }
}

impl Config {
    /// Defaults overridden by `FLAG_VM_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(PROGRAM_VAR) {
            config.program_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(FLAG_VAR) {
            config.flag = flag;
        }
        if let Some(quiet) = lookup(QUIET_VAR) {
            config.quiet = parse_bool(&quiet);
        }
        config
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
