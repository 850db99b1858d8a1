use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "transports": {
        "transport1": "program1",
        "transport2": "program2",
        "transport3": "program1"
    },
    "supervisor": { "host": "127.0.0.1", "port": 1, "timeout": 2 },
    "mailer": { "from": "from@localhost", "to": "to@localhost" }
}"#;

fn workervisor(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("workervisor").unwrap();
    cmd.current_dir(dir.path()).env_remove("WORKERVISOR_CONFIG");
    cmd
}

fn with_config() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("workervisor.json"), CONFIG).unwrap();
    temp_dir
}

#[test]
fn test_cli_version() {
    let temp_dir = TempDir::new().unwrap();
    workervisor(&temp_dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("workervisor"));
}

#[test]
fn test_cli_help() {
    let temp_dir = TempDir::new().unwrap();
    workervisor(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--nagios"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_missing_programs() {
    let temp_dir = with_config();
    workervisor(&temp_dir).arg("status").assert().failure();
}

#[test]
fn test_bad_action() {
    let temp_dir = with_config();
    workervisor(&temp_dir)
        .args(["bad", "all"])
        .assert()
        .code(1)
        .stdout("Bad action \"bad\" (Available: start, stop, status)\n");
}

#[test]
fn test_nagios_with_start() {
    let temp_dir = with_config();
    workervisor(&temp_dir)
        .args(["start", "all", "--nagios"])
        .assert()
        .code(1)
        .stdout("Nagios option can only be used with the \"status\" action\n");
}

#[test]
fn test_bad_program() {
    let temp_dir = with_config();
    workervisor(&temp_dir)
        .args(["status", "bad"])
        .assert()
        .code(1)
        .stdout("Bad program \"bad\" (Available: program1, program2, all)\n");
}

#[test]
fn test_config_from_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("config")).unwrap();
    fs::write(temp_dir.path().join("config/workervisor.json"), CONFIG).unwrap();

    workervisor(&temp_dir)
        .args(["stop", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Bad program \"nope\""));
}

#[test]
fn test_config_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.json");
    fs::write(&config_path, CONFIG).unwrap();

    workervisor(&temp_dir)
        .env("WORKERVISOR_CONFIG", &config_path)
        .args(["start", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(Available: program1, program2, all)"));
}

#[test]
fn test_missing_config() {
    let temp_dir = TempDir::new().unwrap();
    workervisor(&temp_dir)
        .args(["status", "all"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Failed to load configuration"))
        .stderr(predicate::str::contains("No workervisor.json found"));
}

#[test]
fn test_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("workervisor.json"),
        r#"{ "transports": { "async": "program1" }, "supervisor": { "host": "localhost" } }"#,
    )
    .unwrap();

    workervisor(&temp_dir)
        .args(["status", "all"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mailer option must be configured"));
}

#[test]
fn test_supervisor_unreachable() {
    let temp_dir = with_config();
    workervisor(&temp_dir)
        .args(["status", "all", "--nagios"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Error:"));
}
