use assert_cmd::Command;
use assert_fs::{prelude::PathChild, TempDir};
use predicates::prelude::{predicate, PredicateBooleanExt};
use std::fs;

fn demo() -> Command {
    Command::cargo_bin("appstrap-demo").unwrap()
}

#[test]
fn test_default_run() {
    demo()
        .assert()
        .success()
        .stdout(predicate::eq("done\n"))
        .stderr(predicate::str::contains("this is a warning"))
        .stderr(predicate::str::contains("the demo logs a message").not());
}

#[test]
fn test_exit_code() {
    demo().arg("--exit-code").arg("3").assert().code(3);
}

#[test]
fn test_main_failure() {
    demo()
        .arg("--fail")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("while running the demo"))
        .stderr(predicate::str::contains(
            "caused by: failure requested on the command line",
        ));
}

#[test]
fn test_verbose_to_stdout() {
    demo()
        .args(["-l", "verbose", "-L", "stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[VERBOSE]"))
        .stdout(predicate::str::contains(
            "<appstrap.demo>: logger appstrap.demo is at level VERBOSE",
        ))
        .stdout(predicate::str::contains("[INFO]"))
        .stdout(predicate::str::contains("[DEBUG]").not());
}

#[test]
fn test_named_logger_level() {
    demo()
        .args([
            "--log-level=appstrap.demo:DEBUG",
            "--log-file=appstrap.demo:stdout",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DEBUG]"))
        .stdout(predicate::str::contains("starting the demo"));
}

#[test]
fn test_log_crate_records() {
    demo()
        .args(["-l", "appstrap_demo:info", "-L", "appstrap_demo:stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("this one comes from the log crate"));
}

#[test]
fn test_log_file_created() {
    let dir = TempDir::new().unwrap();
    let log_file = dir.child("logs").child("nested").child("demo.log");
    demo()
        .arg("-lverbose")
        .arg(format!("-L{}", log_file.path().display()))
        .assert()
        .success();
    let content = fs::read_to_string(log_file.path()).unwrap();
    assert!(content.contains("[VERBOSE]"));
    assert!(content.contains("this is a warning"));
    dir.close().unwrap();
}

#[test]
fn test_log_file_created_on_cli_error() {
    let dir = TempDir::new().unwrap();
    let log_file = dir.child("demo.log");
    demo()
        .arg("-L")
        .arg(log_file.path())
        .arg("--exit-code")
        .arg("3")
        .arg("--fail")
        .assert()
        .code(1);
    assert!(!log_file.path().exists());
    demo()
        .arg("-L")
        .arg(log_file.path())
        .arg("--exit-code")
        .arg("3")
        .assert()
        .code(3);
    assert!(log_file.path().exists());
}

#[test]
fn test_unknown_level() {
    demo()
        .args(["-l", "Vision-InTheBlinkOfAnEye"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unknown log level"));
}

#[test]
fn test_missing_values() {
    for arg in ["-l", "--log-level", "-L", "--log-file"] {
        demo().arg(arg).assert().code(1).stdout(predicate::str::is_empty());
    }
}

#[test]
fn test_unwritable_log_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.child("file");
    fs::write(file.path(), "").unwrap();
    demo()
        .arg("-L")
        .arg(file.path().join("demo.log"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot open log file"));
}

#[test]
fn test_version() {
    let expected = format!("appstrap {}", env!("CARGO_PKG_VERSION"));
    demo()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(expected));
}
