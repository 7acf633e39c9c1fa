//! keysafe - Machine-bound custody of a single master key.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── materialize   # Generate, seal or load the key
//! │   ├── status        # Show custody state
//! │   ├── verify        # Load, fingerprint and wipe the key
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── custody       # The key custody state machine
//!     ├── encoding/     # Word and character representations
//!     ├── cipher/       # Platform protection backends
//!     │   ├── mod       # PlatformCipher trait
//!     │   ├── dpapi     # Windows DPAPI
//!     │   └── machine   # Machine-id bound AEAD (Unix)
//!     ├── guard/        # Locked, protected memory for the loaded key
//!     ├── files         # All-or-nothing key file I/O
//!     └── config        # keysafe.toml management
//! ```
//!
//! # Example
//!
//! ```no_run
//! use keysafe::{Config, KeyCustody, Materialized};
//!
//! # fn main() -> keysafe::error::Result<()> {
//! let config = Config::discover(None)?;
//! let files = config.key_files();
//! let mut custody = KeyCustody::from_config(&config)?;
//!
//! match custody.materialize(&files)? {
//!     Materialized::Generated(words) => println!("write this down: {}", words.expose()),
//!     Materialized::PlaintextStillPresent { plain } => {
//!         eprintln!("remove {} from this machine", plain.display())
//!     }
//!     Materialized::Loaded => {
//!         let key = custody.retrieve()?;
//!         assert!(!key.is_empty());
//!     }
//! }
//! custody.destroy();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::cipher::{default_cipher, MachineBound, PlatformCipher, Scope};
pub use crate::core::config::Config;
pub use crate::core::custody::{CustodyState, KeyCustody, Materialized};
pub use crate::core::encoding::{Alphabet, Dictionary, Representation, SecretEncoder};
pub use crate::core::files::KeyFiles;
pub use crate::core::guard::Guarded;
pub use crate::error::{Error, Result};
