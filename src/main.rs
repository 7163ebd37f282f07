use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgMatches, Command};
use thiserror::Error;

use flag_vm::vm::ConsoleOutput;
use flag_vm::{Config, FlagBuffer, Program, ProgramError, VMError, VM};

#[derive(Debug, Error)]
enum AppError {
    #[error("VM error: {0}")]
    VM(#[from] VMError),

    #[error("{0}")]
    Program(#[from] ProgramError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn cli() -> Command {
    Command::new("flag-vm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs a mnemonic program against a flag buffer and prints what it decodes")
        .arg(
            Arg::new("program")
                .short('p')
                .long("program")
                .value_name("FILE")
                .help("Instruction file, one mnemonic per line (.json: array of mnemonics) [default: instrs.txt]"),
        )
        .arg(
            Arg::new("flag")
                .short('f')
                .long("flag")
                .value_name("TEXT")
                .help("Flag text loaded into the flag buffer [default: halloooo]"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Hide trace lines")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("summary")
                .short('s')
                .long("summary")
                .help("Print the final stack and memory as JSON after halting")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Environment-derived config with command-line arguments applied on top
fn config_from(matches: &ArgMatches) -> Config {
    let mut config = Config::from_env();
    if let Some(path) = matches.get_one::<String>("program") {
        config.program_path = PathBuf::from(path);
    }
    if let Some(flag) = matches.get_one::<String>("flag") {
        config.flag = flag.clone();
    }
    config.quiet |= matches.get_flag("quiet");
    config.summary |= matches.get_flag("summary");
    config
}

fn run(config: &Config) -> Result<(), AppError> {
    let program = Program::load(&config.program_path)?;

    let flag = FlagBuffer::from(config.flag.as_str());
    let mut vm = VM::with_handler(flag, ConsoleOutput::stdout(!config.quiet));
    vm.run(&program)?;

    if config.summary {
        println!("{}", serde_json::to_string_pretty(&vm.summary())?);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let matches = cli().get_matches();
    let config = config_from(&matches);

    if let Err(err) = run(&config) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
