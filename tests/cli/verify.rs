//! Tests for `keysafe verify`.

use crate::support::*;

fn fingerprint(output: &std::process::Output) -> String {
    stdout(output)
        .lines()
        .find_map(|l| l.trim().strip_prefix("fingerprint"))
        .map(|fp| fp.trim().to_string())
        .expect("no fingerprint in output")
}

#[test]
fn test_verify_before_materialize() {
    let t = Test::words();

    let output = t.verify();
    assert_failure(&output);
    assert_stderr_contains(&output, "key not loaded");
    assert_stderr_contains(&output, "keysafe materialize");
    assert!(!t.exists("key.dat"));
    assert!(!t.exists("key.txt"));
}

#[test]
fn test_verify_does_not_seal_plaintext() {
    let t = Test::words();
    t.write("key.txt", &NATO.join(" "));

    assert_failure(&t.verify());
    assert!(!t.exists("key.dat"));
}

#[test]
fn test_verify_loaded_key() {
    let t = Test::words();
    assert_success(&t.materialize());
    t.remove("key.txt");

    let first = t.verify();
    assert_success(&first);
    assert_stdout_contains(&first, "matches the configured encoding");
    assert_stdout_contains(&first, "tokens");

    let second = t.verify();
    assert_success(&second);
    assert_eq!(fingerprint(&first), fingerprint(&second));
    assert_eq!(fingerprint(&first).split(':').count(), 8);
}

#[test]
fn test_verify_same_key_from_plaintext() {
    let a = Test::words();
    let b = Test::words();
    let plain = NATO.join(" ");
    for t in [&a, &b] {
        t.write("key.txt", &plain);
        assert_success(&t.materialize());
        t.remove("key.txt");
    }

    let fa = fingerprint(&a.verify());
    let fb = fingerprint(&b.verify());
    assert_eq!(fa, fb);
}

#[test]
fn test_verify_refuses_conflict() {
    let t = Test::words();
    assert_success(&t.materialize());

    let output = t.verify();
    assert_failure(&output);
    assert_stderr_contains(&output, "both");
}
