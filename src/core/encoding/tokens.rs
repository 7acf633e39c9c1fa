//! Token sets a secret is drawn from.
//!
//! Both sets are validated once, at construction, so the encoder never has
//! to re-check them per call.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, FileError, Result};

/// Word list used for mnemonic secrets.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Dictionary {
    /// Build a dictionary from a list of words.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDictionary` if the list is empty, or any
    /// entry is empty, contains whitespace, or appears twice.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(ConfigError::InvalidDictionary("no words".to_string()).into());
        }

        let mut index = HashSet::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if word.is_empty() {
                return Err(
                    ConfigError::InvalidDictionary(format!("entry {} is empty", i + 1)).into(),
                );
            }
            if word.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidDictionary(format!(
                    "entry {} ('{}') contains whitespace",
                    i + 1,
                    word
                ))
                .into());
            }
            if !index.insert(word.clone()) {
                return Err(ConfigError::InvalidDictionary(format!(
                    "duplicate word '{}' at entry {}",
                    word,
                    i + 1
                ))
                .into());
            }
        }

        Ok(Self { words, index })
    }

    /// Load a dictionary from a file with one word per line.
    ///
    /// Any whitespace separates words, so space-separated lists work too.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading dictionary");
        let contents = fs::read_to_string(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Self::new(contents.split_whitespace())?;
        debug!(words = dictionary.len(), "dictionary loaded");
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub(crate) fn word(&self, i: usize) -> &str {
        &self.words[i]
    }

    /// Byte length of the longest word.
    pub(crate) fn max_len(&self) -> usize {
        self.words.iter().map(String::len).max().unwrap_or(0)
    }
}

/// Character set used for character-string secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from the characters of a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAlphabet` unless the string holds at
    /// least 16 distinct printable, non-space ASCII characters.
    pub fn new(chars: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(chars.len());
        for ch in chars.chars() {
            if !ch.is_ascii_graphic() {
                return Err(ConfigError::InvalidAlphabet(format!(
                    "character {:?} is not printable ASCII",
                    ch
                ))
                .into());
            }
            if !seen.insert(ch) {
                return Err(
                    ConfigError::InvalidAlphabet(format!("duplicate character '{}'", ch)).into(),
                );
            }
            out.push(ch);
        }

        if out.len() < constants::MIN_ALPHABET {
            return Err(ConfigError::InvalidAlphabet(format!(
                "need at least {} characters, got {}",
                constants::MIN_ALPHABET,
                out.len()
            ))
            .into());
        }

        Ok(Self { chars: out })
    }

    /// Crockford base32 alphabet.
    pub fn crockford() -> Self {
        Self {
            chars: constants::CROCKFORD.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    pub(crate) fn char_at(&self, i: usize) -> char {
        self.chars[i]
    }

    /// The alphabet as a string, for config round-trips and status output.
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}
