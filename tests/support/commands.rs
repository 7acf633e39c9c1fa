//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a keysafe command isolated to the test directory.
    ///
    /// Clears `KEYSAFE_CONFIG` and `KEYSAFE_LOG` from the parent environment
    /// and disables colors so output is stable.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("keysafe").expect("failed to find keysafe binary");
        cmd.env_remove("KEYSAFE_CONFIG");
        cmd.env_remove("KEYSAFE_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `keysafe materialize`.
    pub fn materialize(&self) -> Output {
        self.cmd()
            .arg("materialize")
            .output()
            .expect("failed to run keysafe materialize")
    }

    /// Shortcut for `keysafe status`.
    pub fn status(&self) -> Output {
        self.cmd()
            .arg("status")
            .output()
            .expect("failed to run keysafe status")
    }

    /// Shortcut for `keysafe status --json`, parsed.
    pub fn status_json(&self) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["status", "--json"])
            .output()
            .expect("failed to run keysafe status --json");
        super::assert_success(&output);
        serde_json::from_slice(&output.stdout).expect("status --json is not valid JSON")
    }

    /// Shortcut for `keysafe verify`.
    pub fn verify(&self) -> Output {
        self.cmd()
            .arg("verify")
            .output()
            .expect("failed to run keysafe verify")
    }
}
