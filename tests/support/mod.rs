//! Test support utilities for keysafe integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// The directory holds a fake machine id and a `keysafe.toml` pointing at
/// it, so the binary never depends on the host's `/etc/machine-id`. Child
/// processes use `.current_dir()`; no process-global state is mutated.
pub struct Test {
    /// Working directory for the binary
    pub dir: TempDir,
}

impl Test {
    /// Environment using the default character encoding.
    pub fn new() -> Self {
        let t = Self::bare();
        t.write_config("");
        t
    }

    /// Environment using the 24-word test dictionary.
    pub fn words() -> Self {
        let t = Self::bare();
        t.write("words.txt", &NATO.join("\n"));
        t.write_config(
            r#"
[encoding]
kind = "words"
wordlist = "words.txt"
count = 24
"#,
        );
        t
    }

    /// Environment with a machine id but no config file.
    pub fn bare() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::write(dir.path().join("machine-id"), format!("{}\n", MACHINE_ID))
            .expect("failed to write machine id");
        Self { dir }
    }

    /// Write `keysafe.toml` with the test machine id plus `extra`.
    pub fn write_config(&self, extra: &str) {
        let config = format!("[cipher]\nmachine_id_file = \"machine-id\"\n{}", extra);
        self.write("keysafe.toml", &config);
    }

    /// Swap the machine id, as if the files were copied to another host.
    pub fn move_to_other_machine(&self) {
        self.write("machine-id", OTHER_MACHINE_ID);
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path(name), contents).expect("failed to write test file");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("failed to read test file")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.path(name)).expect("failed to remove test file");
    }
}
