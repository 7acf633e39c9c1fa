//! Tests for `keysafe materialize`.

use crate::support::*;

#[test]
fn test_first_run_prints_words_once() {
    let t = Test::words();

    let output = t.materialize();
    assert_success(&output);
    assert_stdout_contains(&output, "generated a new key");
    assert_stdout_contains(&output, "only time");

    let key = printed_key(&output);
    let words: Vec<&str> = key.split_whitespace().collect();
    assert_eq!(words.len(), 24);
    assert!(words.iter().all(|w| NATO.contains(w)));
    assert_eq!(key.lines().count(), 4);

    assert!(t.exists("key.dat"));
    assert_eq!(t.read("key.txt"), format!("{}\n", key));
}

#[test]
fn test_second_run_refuses_while_plaintext_remains() {
    let t = Test::words();
    assert_success(&t.materialize());
    let sealed = std::fs::read(t.path("key.dat")).unwrap();
    let plain = t.read("key.txt");

    let output = t.materialize();
    assert_failure(&output);
    assert_stderr_contains(&output, "key.txt");
    assert_stderr_contains(&output, "somewhere safe");

    assert_eq!(std::fs::read(t.path("key.dat")).unwrap(), sealed);
    assert_eq!(t.read("key.txt"), plain);
}

#[test]
fn test_load_after_plaintext_removed() {
    let t = Test::words();
    let first = t.materialize();
    assert_success(&first);
    let key = printed_key(&first);
    t.remove("key.txt");

    let output = t.materialize();
    assert_success(&output);
    assert_stdout_contains(&output, "key loaded into guarded memory");
    for line in key.lines() {
        assert_output_excludes(&output, line);
    }
    assert!(!t.exists("key.txt"));
}

#[test]
fn test_plaintext_is_sealed_and_kept() {
    let t = Test::words();
    let plain = NATO
        .chunks(6)
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    t.write("key.txt", &plain);

    let output = t.materialize();
    assert_success(&output);
    assert_stdout_contains(&output, "sealed");
    assert_stdout_contains(&output, "still on disk");
    assert!(t.exists("key.dat"));
    assert_eq!(t.read("key.txt"), plain);

    t.remove("key.txt");
    let output = t.verify();
    assert_success(&output);
    assert_stdout_contains(&output, "24");
}

#[test]
fn test_invalid_plaintext_rejected() {
    let t = Test::words();
    t.write("key.txt", "alpha bravo zulu\n");

    let output = t.materialize();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid plaintext key file");
    assert_output_excludes(&output, "zulu");
    assert!(!t.exists("key.dat"));
}

#[test]
fn test_sealed_key_does_not_open_elsewhere() {
    let t = Test::words();
    assert_success(&t.materialize());
    t.remove("key.txt");
    let sealed = std::fs::read(t.path("key.dat")).unwrap();

    t.move_to_other_machine();
    let output = t.materialize();
    assert_failure(&output);
    assert_stderr_contains(&output, "another machine");
    assert_eq!(std::fs::read(t.path("key.dat")).unwrap(), sealed);
    assert!(!t.exists("key.txt"));
}

#[test]
fn test_corrupt_ciphertext_left_alone() {
    let t = Test::words();
    t.write("key.dat", "definitely not sealed");

    let output = t.materialize();
    assert_failure(&output);
    assert_eq!(t.read("key.dat"), "definitely not sealed");
    assert!(!t.exists("key.txt"));
}

#[test]
fn test_default_charset_key() {
    let t = Test::new();

    let output = t.materialize();
    assert_success(&output);

    let key = printed_key(&output);
    let groups: Vec<&str> = key.split(' ').collect();
    assert_eq!(groups.len(), 4);
    assert!(groups.iter().all(|g| g.len() == 13));
    assert!(key
        .chars()
        .filter(|c| *c != ' ')
        .all(|c| "0123456789ABCDEFGHJKMNPQRSTVWXYZ".contains(c)));
}

#[test]
fn test_custom_file_locations() {
    let t = Test::words();
    std::fs::create_dir(t.path("keys")).unwrap();
    t.write_config(
        r#"
[files]
cipher = "keys/master.sealed"
plain = "keys/master.words"

[encoding]
kind = "words"
wordlist = "words.txt"
"#,
    );

    assert_success(&t.materialize());
    assert!(t.exists("keys/master.sealed"));
    assert!(t.exists("keys/master.words"));
    assert!(!t.exists("key.dat"));
}

#[cfg(unix)]
#[test]
fn test_key_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::words();
    assert_success(&t.materialize());

    for name in ["key.dat", "key.txt"] {
        let mode = std::fs::metadata(t.path(name)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "{} has mode {:o}", name, mode);
    }
}
