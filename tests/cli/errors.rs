//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("materialize").and(predicate::str::contains("verify")));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unlock").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "keysafe");
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keysafe"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::new();

    let output = t.cmd().args(["--verbose", "status"]).output().unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "loading config");
}

#[test]
fn test_log_env_overrides_verbose() {
    let t = Test::new();

    t.cmd()
        .env("KEYSAFE_LOG", "off")
        .args(["--verbose", "status"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unknown_config_field_fails() {
    let t = Test::new();
    t.write_config("[files]\nciphertext = \"k.dat\"\n");

    let output = t.materialize();
    assert_failure(&output);
    assert!(!t.exists("key.dat"));
}

#[test]
fn test_undersized_wordlist_fails() {
    let t = Test::words();
    t.write("words.txt", "one\ntwo\nthree\n");

    let output = t.materialize();
    assert_failure(&output);
    assert_stderr_contains(&output, "at least 24 words");
    assert!(!t.exists("key.txt"));
}

#[test]
fn test_duplicate_wordlist_fails() {
    let t = Test::words();
    let mut words: Vec<&str> = NATO.to_vec();
    words.push("alpha");
    t.write("words.txt", &words.join("\n"));

    let output = t.materialize();
    assert_failure(&output);
    assert!(!t.exists("key.txt"));
}

#[cfg(unix)]
#[test]
fn test_missing_machine_id() {
    let t = Test::words();
    t.remove("machine-id");

    let output = t.materialize();
    assert_failure(&output);
    assert_stderr_contains(&output, "machine_id_file");
    assert!(!t.exists("key.txt"));
}
