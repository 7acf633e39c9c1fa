//! Command-line interface.

pub mod completions;
pub mod materialize;
pub mod output;
pub mod status;
pub mod verify;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::core::constants;

/// keysafe - Machine-bound custody of a single master key.
#[derive(Parser)]
#[command(
    name = "keysafe",
    about = "Machine-bound custody of a single master key",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to keysafe.toml
    #[arg(long, global = true, env = constants::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate, seal or load the master key
    Materialize,

    /// Show which key files exist and how they are protected
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the key, print its fingerprint, then wipe it
    Verify,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a command.
pub fn execute(command: Command, config: Option<&Path>) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Materialize => materialize::execute(config),
        Status { json } => status::execute(config, json),
        Verify => verify::execute(config),
        Completions { shell } => completions::execute(shell),
    }
}
