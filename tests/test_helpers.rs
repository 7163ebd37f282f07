use flag_vm::vm::{VMOutput, VM};
use flag_vm::{FlagBuffer, Program};

/// Builds a program from mnemonics
pub fn program(mnemonics: &[&str]) -> Program {
    mnemonics.iter().copied().collect()
}

/// Runs `program` against `flag` with buffered output
pub fn run_with_flag(program: &Program, flag: &str) -> (VM, u64) {
    let mut vm = VM::new(FlagBuffer::from(flag));
    let steps = vm.run(program).expect("program should halt cleanly");
    (vm, steps)
}

/// Decoded lines produced by `printBuf`
pub fn output_of(vm: &VM<VMOutput>) -> Vec<String> {
    vm.handler().get_output().to_vec()
}
