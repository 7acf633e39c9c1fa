//! Configuration file management.
//!
//! Handles locating, reading and validating `keysafe.toml`. Every section is
//! optional; a missing file means built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::cipher::Scope;
use crate::core::constants;
use crate::core::encoding::{Alphabet, Dictionary, SecretEncoder};
use crate::core::files::KeyFiles;
use crate::error::{ConfigError, Result};

/// Contents of `keysafe.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the key files live
    pub files: FilesConfig,
    /// Platform cipher settings
    pub cipher: CipherConfig,
    /// How secrets are generated and written down
    pub encoding: EncodingConfig,
    /// File this config was read from; relative paths resolve against its directory
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// `[files]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub cipher: PathBuf,
    pub plain: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            cipher: PathBuf::from(constants::CIPHER_FILE),
            plain: PathBuf::from(constants::PLAIN_FILE),
        }
    }
}

/// `[cipher]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CipherConfig {
    pub scope: Scope,
    /// Override for the machine id location (Unix backend only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id_file: Option<PathBuf>,
}

/// `[encoding]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EncodingConfig {
    /// Mnemonic words from a dictionary file
    Words {
        wordlist: PathBuf,
        #[serde(default = "default_word_count")]
        count: usize,
        #[serde(default = "default_word_wrap")]
        wrap: usize,
    },
    /// Random characters from an alphabet
    Charset {
        #[serde(default = "default_alphabet")]
        alphabet: String,
        #[serde(default = "default_charset_length")]
        length: usize,
        #[serde(default = "default_charset_group")]
        group: usize,
    },
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self::Charset {
            alphabet: default_alphabet(),
            length: default_charset_length(),
            group: default_charset_group(),
        }
    }
}

fn default_word_count() -> usize {
    constants::WORD_COUNT
}

fn default_word_wrap() -> usize {
    constants::WORD_WRAP
}

fn default_alphabet() -> String {
    constants::CROCKFORD.to_string()
}

fn default_charset_length() -> usize {
    constants::CHARSET_LENGTH
}

fn default_charset_group() -> usize {
    constants::CHARSET_GROUP
}

impl Config {
    /// Locate and load the configuration.
    ///
    /// Lookup order: `explicit` (from `--config` or `KEYSAFE_CONFIG`),
    /// `./keysafe.toml`, then `<config dir>/keysafe/keysafe.toml`. Falls
    /// back to defaults when none exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit path is unreadable, or any found
    /// file fails to parse or validate.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(constants::CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(dir) = dirs::config_dir() {
            let global = dir.join("keysafe").join(constants::CONFIG_FILE);
            if global.exists() {
                return Self::load(&global);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&contents)?;
        config.source = Some(path.to_path_buf());

        debug!(scope = %config.cipher.scope, "config loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// File this configuration came from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Validate field values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for empty paths, identical key
    /// files, or zero-length secrets.
    pub fn validate(&self) -> Result<()> {
        if self.files.cipher.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "files.cipher",
                reason: "path is empty".to_string(),
            }
            .into());
        }
        if self.files.plain.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "files.plain",
                reason: "path is empty".to_string(),
            }
            .into());
        }
        if self.files.cipher == self.files.plain {
            return Err(ConfigError::InvalidValue {
                field: "files",
                reason: "cipher and plain must be different files".to_string(),
            }
            .into());
        }

        match &self.encoding {
            EncodingConfig::Words { count, .. } if *count == 0 => Err(ConfigError::InvalidValue {
                field: "encoding.count",
                reason: "must be greater than zero".to_string(),
            }
            .into()),
            EncodingConfig::Charset { length, .. } if *length == 0 => {
                Err(ConfigError::InvalidValue {
                    field: "encoding.length",
                    reason: "must be greater than zero".to_string(),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.source.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Key file pair named by this configuration.
    pub fn key_files(&self) -> KeyFiles {
        KeyFiles::new(self.resolve(&self.files.cipher), self.resolve(&self.files.plain))
    }

    /// Cipher settings with paths resolved.
    pub fn cipher_config(&self) -> CipherConfig {
        CipherConfig {
            scope: self.cipher.scope,
            machine_id_file: self.cipher.machine_id_file.as_deref().map(|p| self.resolve(p)),
        }
    }

    /// Build the encoder this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the dictionary or alphabet is invalid, or a
    /// `FileError` if the word list cannot be read.
    pub fn encoder(&self) -> Result<SecretEncoder> {
        match &self.encoding {
            EncodingConfig::Words {
                wordlist,
                count,
                wrap,
            } => {
                let dictionary = Dictionary::from_file(&self.resolve(wordlist))?;
                Ok(SecretEncoder::words(dictionary, *count)?.with_wrap(*wrap))
            }
            EncodingConfig::Charset {
                alphabet,
                length,
                group,
            } => {
                let alphabet = Alphabet::new(alphabet)?;
                Ok(SecretEncoder::charset(alphabet, *length)?.with_wrap(*group))
            }
        }
    }
}
