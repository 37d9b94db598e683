use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gravel() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("gravel"))
}

fn write(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn help_mentions_commands() {
    gravel().arg("--help").assert().success().stdout(
        predicate::str::contains("parse").and(predicate::str::contains("config-schema")),
    );
}

#[test]
fn parse_prints_outline() {
    let temp = TempDir::new().unwrap();
    let file = write(&temp, "hello.groovy", "def x = 1\nprintln x\n");

    gravel()
        .current_dir(temp.path())
        .arg("parse")
        .arg(&file)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Declaration =")
                .and(predicate::str::contains("MethodCall println (implicit this) @2:1")),
        );
}

#[test]
fn parse_reports_errors_with_exit_code_one() {
    let temp = TempDir::new().unwrap();
    let file = write(&temp, "bad.groovy", "break\n");

    gravel()
        .current_dir(temp.path())
        .arg("parse")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "error:1:1: break statement is only allowed inside loops or switches",
        ));
}

#[test]
fn parse_json_has_module_or_errors() {
    let temp = TempDir::new().unwrap();
    let good = write(&temp, "good.groovy", "class A {}\n");
    let bad = write(&temp, "bad.groovy", "class A extends B, C {}\n");

    let output = gravel()
        .current_dir(temp.path())
        .args(["parse", "--json"])
        .arg(&good)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["module"]["classes"][0]["name"], "A");
    assert!(v.get("errors").is_none());

    let output = gravel()
        .current_dir(temp.path())
        .args(["parse", "--json"])
        .arg(&bad)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(v.get("module").is_none());
    assert_eq!(v["errors"][0]["message"], "Cannot extend multiple classes");
}

#[test]
fn parse_can_print_tokens() {
    let temp = TempDir::new().unwrap();
    let file = write(&temp, "t.groovy", "def x\n");

    gravel()
        .current_dir(temp.path())
        .args(["parse", "--tokens"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("0..3 \"def\""));
}

#[test]
fn missing_file_exits_with_two() {
    let temp = TempDir::new().unwrap();
    gravel()
        .current_dir(temp.path())
        .args(["parse", "absent.groovy"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read absent.groovy"));
}

#[test]
fn invalid_config_exits_with_two() {
    let temp = TempDir::new().unwrap();
    let file = write(&temp, "ok.groovy", "x = 1\n");
    let config = write(&temp, "broken.toml", "[parser]\nwindow = 1\n");

    gravel()
        .current_dir(temp.path())
        .arg("parse")
        .arg(&file)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse toml config"));
}

#[test]
fn config_schema_is_json() {
    let output = gravel().arg("config-schema").output().unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(v["properties"]["parser"].is_object());
}

#[test]
fn closed_stdout_is_not_a_crash() {
    let temp = TempDir::new().unwrap();
    // Enough token output to fill the pipe before the reader goes away.
    let file = write(&temp, "big.groovy", &"println 1 + 2\n".repeat(20_000));

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("gravel"))
        .current_dir(temp.path())
        .args(["parse", "--tokens"])
        .arg(&file)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());
    let output = child.wait_with_output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
