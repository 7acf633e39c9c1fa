//! Materialize command.
//!
//! Runs one custody step against the configured key files and reports the
//! outcome. A freshly generated key is printed here and nowhere else.

use std::path::Path;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::custody::{KeyCustody, Materialized};
use crate::error::Result;

/// Generate, seal or load the master key.
pub fn execute(config: Option<&Path>) -> Result<()> {
    let config = Config::discover(config)?;
    let files = config.key_files();
    let mut custody = KeyCustody::from_config(&config)?;

    match custody.materialize(&files)? {
        Materialized::Generated(representation) => {
            output::success(&format!(
                "generated a new key ({})",
                custody.encoder().describe()
            ));
            output::kv("sealed", output::path(files.cipher()));
            output::kv("plaintext", output::path(files.plain()));

            output::section("Master key");
            println!("{}", representation.wrapped().as_str());
            output::rule();

            output::warn("this is the only time keysafe will show this key");
            output::hint(&format!(
                "transcribe it, then move {} off this machine",
                output::path(files.plain())
            ));
        }
        Materialized::PlaintextStillPresent { plain } => {
            output::success(&format!(
                "sealed {} into {}",
                output::path(&plain),
                output::path(files.cipher())
            ));
            output::warn(&format!(
                "{} is still on disk; keysafe will refuse to run until it is gone",
                output::path(&plain)
            ));
            output::hint("copy it somewhere safe, then delete it from this machine");
        }
        Materialized::Loaded => {
            output::success(&format!(
                "key loaded into guarded memory ({}, {} scope)",
                custody.cipher().name(),
                custody.cipher().scope()
            ));
        }
    }

    custody.destroy();
    Ok(())
}
