use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use tempfile::TempDir;

const PRINT_HI: &str = "inc\npushFlagAtA0\ndec\npushFlagAtA0\nprintBuf\nexit\n";

fn write_program(dir: &TempDir, name: &str, body: &str) -> Result<String, Box<dyn Error>> {
    let path = dir.path().join(name);
    fs::write(&path, body)?;
    Ok(path.to_string_lossy().into_owned())
}

fn flag_vm() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("flag-vm")?;
    cmd.env_remove("FLAG_VM_PROGRAM")
        .env_remove("FLAG_VM_FLAG")
        .env_remove("FLAG_VM_QUIET");
    Ok(cmd)
}

#[test]
fn test_runs_program_and_prints_done() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "instrs.txt", PRINT_HI)?;

    flag_vm()?
        .arg("--program")
        .arg(&program)
        .arg("--flag")
        .arg("hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pushing flag at 1 at line 1"))
        .stdout(predicate::str::contains("hi\ndone\n"));

    Ok(())
}

#[test]
fn test_quiet_hides_trace() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "instrs.txt", PRINT_HI)?;

    flag_vm()?
        .arg("-p")
        .arg(&program)
        .arg("-f")
        .arg("hi")
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::eq("hi\ndone\n"));

    Ok(())
}

#[test]
fn test_default_program_and_flag() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    write_program(&temp_dir, "instrs.txt", "pushFlagAtA0\nprintBuf\nexit\n")?;

    flag_vm()?
        .current_dir(temp_dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::eq("h\ndone\n"));

    Ok(())
}

#[test]
fn test_flag_from_environment() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "prog.json", r#"["pushFlagAtA0", "printBuf", "exit"]"#)?;

    flag_vm()?
        .env("FLAG_VM_PROGRAM", &program)
        .env("FLAG_VM_FLAG", "Q")
        .env("FLAG_VM_QUIET", "1")
        .assert()
        .success()
        .stdout(predicate::eq("Q\ndone\n"));

    Ok(())
}

#[test]
fn test_summary_is_json() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "instrs.txt", "inc\ninc\npush\nexit\n")?;

    flag_vm()?
        .arg("-p")
        .arg(&program)
        .arg("--quiet")
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"steps\": 4"))
        .stdout(predicate::str::contains("\"stack\": [\n    \"2\"\n  ]"));

    Ok(())
}

#[test]
fn test_unknown_instruction_fails() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "instrs.txt", "inc\nfrobnicate\nexit\n")?;

    flag_vm()?
        .arg("-p")
        .arg(&program)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("done").not())
        .stderr(predicate::str::contains("Invalid instruction at 1"))
        .stderr(predicate::str::contains("frobnicate"));

    Ok(())
}

#[test]
fn test_missing_program_file() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("nope.txt");

    flag_vm()?
        .arg("-p")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Program file not found"));

    Ok(())
}

#[test]
fn test_demo_program_prints_default_flag() -> Result<(), Box<dyn Error>> {
    flag_vm()?
        .arg("-p")
        .arg("demos/print_flag.txt")
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::eq("halloooo\ndone\n"));

    Ok(())
}
