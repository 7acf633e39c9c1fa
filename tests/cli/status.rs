//! Tests for `keysafe status`.

use crate::support::*;

#[test]
fn test_status_tracks_custody_state() {
    let t = Test::words();
    assert_eq!(t.status_json()["state"], "empty");

    assert_success(&t.materialize());
    assert_eq!(t.status_json()["state"], "both");

    t.remove("key.txt");
    assert_eq!(t.status_json()["state"], "ciphertext-only");

    t.remove("key.dat");
    t.write("key.txt", &NATO.join(" "));
    assert_eq!(t.status_json()["state"], "plaintext-only");
}

#[test]
fn test_status_json_fields() {
    let t = Test::words();
    let status = t.status_json();

    assert_eq!(status["scope"], "machine");
    assert_eq!(status["encoding"], "24 words from a 24-word dictionary");
    assert!(status["cipher_file"].as_str().unwrap().ends_with("key.dat"));
    assert!(status["plain_file"].as_str().unwrap().ends_with("key.txt"));
    assert!(status["config"].as_str().unwrap().ends_with("keysafe.toml"));
    #[cfg(unix)]
    assert_eq!(status["backend"], "machine-id");
}

#[test]
fn test_status_does_not_read_key_files() {
    let t = Test::words();
    t.write("key.dat", "garbage");

    assert_eq!(t.status_json()["state"], "ciphertext-only");
}

#[test]
fn test_status_text_hints() {
    let t = Test::words();

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "keysafe status");
    assert_stdout_contains(&output, "no key yet");
    assert_stdout_contains(&output, "keysafe materialize");

    assert_success(&t.materialize());
    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "both key files exist");
}

#[test]
fn test_status_user_scope() {
    let t = Test::words();
    t.write_config(
        r#"scope = "user"

[encoding]
kind = "words"
wordlist = "words.txt"
"#,
    );

    assert_eq!(t.status_json()["scope"], "user");
}

#[test]
fn test_explicit_config_path() {
    let t = Test::bare();
    std::fs::create_dir(t.path("conf")).unwrap();
    t.write(
        "conf/keysafe.toml",
        "[files]\ncipher = \"../sealed.dat\"\nplain = \"../sealed.txt\"\n\n[cipher]\nmachine_id_file = \"../machine-id\"\n",
    );

    let output = t
        .cmd()
        .args(["--config", "conf/keysafe.toml", "materialize"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(t.exists("sealed.dat"));
    assert!(t.exists("sealed.txt"));

    let output = t
        .cmd()
        .env("KEYSAFE_CONFIG", "conf/keysafe.toml")
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert_success(&output);
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["state"], "both");
}

#[test]
fn test_missing_explicit_config_fails() {
    let t = Test::words();

    let output = t
        .cmd()
        .args(["--config", "nope.toml", "status"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "nope.toml");
}
