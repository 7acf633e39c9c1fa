//! Status command.
//!
//! Reports custody state from file presence only; key files are never read.

use std::path::Path;

use serde_json::json;

use crate::cli::output;
use crate::core::cipher;
use crate::core::config::Config;
use crate::core::custody::CustodyState;
use crate::error::Result;

/// Show which key files exist and how they are protected.
pub fn execute(config: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::discover(config)?;
    let files = config.key_files();
    let state = CustodyState::probe(&files)?;
    let encoder = config.encoder()?;

    let scope = config.cipher.scope;
    let backend = cipher::default_cipher(&config.cipher_config())
        .map(|c| c.name().to_string())
        .map_err(|e| e.to_string());

    if json {
        let (backend, backend_error) = match &backend {
            Ok(name) => (Some(name.as_str()), None),
            Err(e) => (None, Some(e.as_str())),
        };
        let status = json!({
            "state": state.name(),
            "cipher_file": files.cipher(),
            "plain_file": files.plain(),
            "config": config.source(),
            "backend": backend,
            "backend_error": backend_error,
            "scope": scope.name(),
            "encoding": encoder.describe(),
            "entropy_bits": encoder.entropy_bits().floor(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    output::section("keysafe status");
    output::kv("state", state);
    output::kv("cipher", output::path(files.cipher()));
    output::kv("plain", output::path(files.plain()));
    match &backend {
        Ok(name) => output::kv("backend", format!("{} ({} scope)", name, scope)),
        Err(e) => output::kv("backend", format!("unavailable: {}", e)),
    }
    output::kv(
        "encoding",
        format!(
            "{}, ~{} bits",
            encoder.describe(),
            encoder.entropy_bits().floor()
        ),
    );
    match config.source() {
        Some(source) => output::kv("config", output::path(source)),
        None => output::kv("config", "defaults"),
    }
    println!();

    match state {
        CustodyState::Empty => {
            output::dimmed("no key yet");
            output::hint(&format!(
                "run {} to generate one",
                output::cmd("keysafe materialize")
            ));
        }
        CustodyState::PlaintextOnly => {
            output::warn("plaintext key is not sealed yet");
            output::hint(&format!(
                "run {} to seal it",
                output::cmd("keysafe materialize")
            ));
        }
        CustodyState::CiphertextOnly => output::success("key is sealed to this machine"),
        CustodyState::Both => {
            output::warn("both key files exist; keysafe will refuse to load the key");
            output::hint(&format!(
                "move {} somewhere safe, then delete it from this machine",
                output::path(files.plain())
            ));
        }
    }

    Ok(())
}
