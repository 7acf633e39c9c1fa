//! Verify command.
//!
//! Loads the sealed key, checks it against the configured encoding, prints a
//! short fingerprint, and wipes it. Never generates or seals anything.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::cli::output;
use crate::core::config::Config;
use crate::core::custody::{CustodyState, KeyCustody, Materialized};
use crate::error::{CustodyError, Result};

const FINGERPRINT_BYTES: usize = 8;

/// Load, fingerprint and destroy the key.
pub fn execute(config: Option<&Path>) -> Result<()> {
    let config = Config::discover(config)?;
    let files = config.key_files();
    let mut custody = KeyCustody::from_config(&config)?;

    if matches!(
        custody.state(&files)?,
        CustodyState::Empty | CustodyState::PlaintextOnly
    ) {
        return Err(CustodyError::KeyNotLoaded.into());
    }
    if !matches!(custody.materialize(&files)?, Materialized::Loaded) {
        return Err(CustodyError::KeyNotLoaded.into());
    }

    let fingerprint = custody.with_key(fingerprint)?;
    let tokens = custody.with_key(|key| {
        custody
            .encoder()
            .encode(key)
            .map(|representation| representation.token_count())
    })?;
    custody.destroy();

    match tokens {
        Ok(count) => {
            output::success("key opened and matches the configured encoding");
            output::kv("tokens", count);
        }
        Err(e) => {
            output::warn(&format!("key opened but does not match the configured encoding: {}", e));
            output::hint("check the [encoding] section of keysafe.toml");
        }
    }
    output::kv("fingerprint", fingerprint);
    output::kv("backend", custody.cipher().name());
    Ok(())
}

/// First bytes of the SHA-256 of the key, colon-separated hex.
fn fingerprint(key: &[u8]) -> String {
    Sha256::digest(key)
        .iter()
        .take(FINGERPRINT_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}
