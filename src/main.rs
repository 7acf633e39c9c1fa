//! keysafe - Machine-bound custody of a single master key.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keysafe::cli::output;
use keysafe::cli::{execute, Cli};
use keysafe::core::constants;
use keysafe::error::{CipherError, ConfigError, CustodyError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("keysafe=debug")
        } else {
            EnvFilter::new("keysafe=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.config.as_deref()) {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::error_hint(hint);
        }
        std::process::exit(1);
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Custody(CustodyError::ConflictingKeyFiles { .. }) => {
            Some("move the plaintext key file somewhere safe, then delete it from this machine")
        }
        Error::Custody(CustodyError::KeyNotLoaded) => Some("run: keysafe materialize"),
        Error::Custody(CustodyError::InvalidPlaintext { .. }) => {
            Some("check the plaintext key against the configured word list or alphabet")
        }
        Error::Cipher(CipherError::Unprotect { .. }) => {
            Some("the sealed key was made on another machine or is damaged; restore it from your transcribed copy")
        }
        Error::Cipher(CipherError::MachineId(_)) => {
            Some("set [cipher] machine_id_file in keysafe.toml")
        }
        Error::Config(ConfigError::InvalidDictionary(_)) => {
            Some("the word list needs at least as many unique words as the key has")
        }
        _ => None,
    }
}
