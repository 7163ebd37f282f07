mod test_helpers;

use flag_vm::vm::{StackOps, VMEvent, VMOutput, HALTED, JUMP_TRAP_ADDRESS};
use flag_vm::{FlagBuffer, Program, VMError, VM};
use num_bigint::BigInt;
use test_helpers::{output_of, program, run_with_flag};

#[test]
fn test_hi_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let program = Program::parse("push\npushFlagAtA0\nprintBuf\nexit\n");
    let mut vm = VM::new(FlagBuffer::from("hi"));

    let steps = vm.run(&program)?;

    assert_eq!(steps, 4);
    assert_eq!(vm.pc(), HALTED);
    assert_eq!(vm.memory.get(0), BigInt::from(0));
    // `push` left the accumulator (0) under the flag byte
    assert_eq!(output_of(&vm), vec!["h\u{0}".to_string()]);
    assert_eq!(vm.handler().halted_after(), Some(4));
    Ok(())
}

#[test]
fn test_prints_whole_flag() {
    let program = program(&["inc", "pushFlagAtA0", "dec", "pushFlagAtA0", "printBuf", "exit"]);
    let (vm, steps) = run_with_flag(&program, "hi");

    assert_eq!(steps, 6);
    assert_eq!(output_of(&vm), vec!["hi".to_string()]);
    assert!(vm.stack.is_empty());

    let flag_events: Vec<String> = vm
        .handler()
        .get_events()
        .iter()
        .map(|event| event.to_string())
        .collect();
    assert_eq!(
        flag_events,
        vec![
            "Pushing flag at 1 at line 1, stack is now [105]",
            "Pushing flag at 0 at line 3, stack is now [104, 105]",
        ]
    );
}

#[test]
fn test_xor_of_two_flag_bytes() {
    // Lay out slots {0: 0, 1: 0, 2: 'h', 3: 'i'}, then mem[2] ^= mem[3]
    let program = program(&[
        "inc",
        "pushFlagAtA0",
        "dec",
        "pushFlagAtA0",
        "push",
        "push",
        "clearStackToMem",
        "inc",
        "inc",
        "inc",
        "push",
        "dec",
        "push",
        "_bitXor",
        "exit",
    ]);
    let (vm, steps) = run_with_flag(&program, "hi");

    assert_eq!(steps, 15);
    assert_eq!(vm.memory.get(2), BigInt::from(104 ^ 105));
    assert_eq!(vm.memory.get(3), BigInt::from(105));
    assert!(vm.stack.is_empty());

    let alu: Vec<&VMEvent> = vm
        .handler()
        .get_events()
        .iter()
        .filter(|event| event.category() == "alu")
        .collect();
    assert_eq!(alu.len(), 1);
    assert_eq!(
        alu[0].to_string(),
        "13    : mem[2] =        104 ^         105 (1)"
    );
}

#[test]
fn test_jump_skips_unreachable_unknown_instruction() {
    let program = program(&["inc", "inc", "jumpToA0", "frobnicate", "exit"]);
    let (vm, steps) = run_with_flag(&program, "");

    assert_eq!(steps, 4);
    assert!(vm.is_halted());
}

#[test]
fn test_backward_jump_loop_reaches_halt_sentinel() {
    // dec, jump back by one, dec again, then 1 + (-2) == -1 halts
    let program = program(&["dec", "jumpToA0"]);
    let (vm, steps) = run_with_flag(&program, "");

    assert_eq!(steps, 4);
    assert_eq!(vm.memory.get(0), BigInt::from(-2));
    let jumps: Vec<String> = vm
        .handler()
        .get_events()
        .iter()
        .map(|event| event.to_string())
        .collect();
    assert_eq!(
        jumps,
        vec!["Jumping to 0 from 1 [] {0: -1}", "Jumping to -1 from 1 [] {0: -2}"]
    );
}

#[test]
fn test_jump_trap_at_fixed_address() {
    // A zero offset would spin forever at the trap address; the trap falls through
    let mut mnemonics = vec!["nonNoop".to_string(); JUMP_TRAP_ADDRESS as usize];
    mnemonics.push("jumpToA0".to_string());
    mnemonics.push("exit".to_string());
    let program = Program::new(mnemonics);

    let mut vm = VM::with_handler(FlagBuffer::from("x"), VMOutput::without_events());
    let steps = vm.run(&program).unwrap();

    assert_eq!(steps, JUMP_TRAP_ADDRESS as u64 + 2);
    assert!(vm.is_halted());
}

#[test]
fn test_unknown_instruction_aborts_run() {
    let program = program(&["inc", "frobnicate", "exit"]);
    let mut vm = VM::new(FlagBuffer::from("hi"));

    let err = vm.run(&program).unwrap_err();

    assert!(matches!(err, VMError::InvalidInstruction { pc: 1, .. }));
    assert_eq!(err.pc(), 1);
    assert_eq!(vm.memory.get(0), BigInt::from(1));
    assert_eq!(vm.handler().halted_after(), None);
}

#[test]
fn test_running_off_the_end_is_fatal() {
    let program = program(&["inc", "jumpToA0"]);
    let mut vm = VM::new(FlagBuffer::default());

    let err = vm.run(&program).unwrap_err();

    assert!(matches!(err, VMError::InvalidInstruction { pc: 2, .. }));
}

#[test]
fn test_stack_underflow_aborts_run() {
    let program = program(&["swapStack"]);
    let mut vm = VM::new(FlagBuffer::default());
    assert!(matches!(
        vm.run(&program),
        Err(VMError::StackUnderflow { pc: 0, .. })
    ));
}

#[test]
fn test_json_program() -> Result<(), Box<dyn std::error::Error>> {
    let program = Program::from_json(r#"["pushFlagAtA0", "printBuf", "exit"]"#)?;
    let (vm, _) = run_with_flag(&program, "Z");
    assert_eq!(output_of(&vm), vec!["Z".to_string()]);
    Ok(())
}
