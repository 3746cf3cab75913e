//! Integration tests for the argconf demo binary.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let bin = env!("CARGO_BIN_EXE_argconf");
    let mut command = Command::new(bin);
    command
        .env_remove("ARGCONF_LOG")
        .env("ARGCONF_LOG_COLOR", "false")
        .args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().unwrap()
}

#[test]
fn test_prints_parsed_configuration() {
    let output = run(&["--optional1_GROUP1", "2.5", "first", "second"], &[]);
    assert!(
        output.status.success(),
        "argconf should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GROUP1:"));
    assert!(stdout.contains("GROUP2:"));
    assert!(stdout.contains("optional1_GROUP1: 2.5"));
    assert!(stdout.contains("positional_DEFAULT: first"));
    assert!(stdout.contains("positional_GROUP2: second"));

    // Changed settings are listed on stderr.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("optional1_GROUP1"));
}

#[test]
fn test_multichar_short_alias() {
    let output = run(&["-o2g1", "4", "first", "second"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("optional_value: 4"));
}

#[test]
fn test_config_file_replaces_command_line() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("demo.yaml");
    fs::write(
        &path,
        "DEFAULT:\n  positional_DEFAULT: from_file\nGROUP1:\n  optional_value: 9\n",
    )
    .unwrap();

    let path_arg = path.to_string_lossy().to_string();
    let output = run(&["--optional1_GROUP1", "7.0", "--config", path_arg.as_str()], &[]);
    assert!(
        output.status.success(),
        "argconf --config should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("positional_DEFAULT: from_file"));
    assert!(stdout.contains("optional_value: 9"));
    assert!(stdout.contains("optional1_GROUP1: 0.0"));
}

#[test]
fn test_unknown_key_in_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.json");
    fs::write(&path, r#"{"DEFAULT": {"mystery": 1}}"#).unwrap();

    let path_arg = path.to_string_lossy().to_string();
    let output = run(&["--config", path_arg.as_str()], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mystery"));
}

#[test]
fn test_bad_value_exits_with_error() {
    let output = run(&["--optional2_GROUP1", "abc", "first", "second"], &[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_debug_level_from_environment() {
    let output = run(&["first", "second"], &[("ARGCONF_LOG_LEVEL", "debug")]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Declared setting"),
        "debug logs should reach stderr; got: {}",
        stderr
    );
}
