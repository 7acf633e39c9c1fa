//! Secret generation and human-transcribable representations.
//!
//! A secret is a fixed number of tokens drawn from a token set: words from a
//! [`Dictionary`] or characters from an [`Alphabet`]. Its byte form is the
//! canonical text (words joined by single spaces, or the bare character
//! string). Line wrapping and grouping are cosmetic and ignored on decode.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{ConfigError, EncodingError, Result};

mod tokens;

pub use tokens::{Alphabet, Dictionary};

/// The token set an encoder draws from.
#[derive(Debug, Clone)]
enum TokenSet {
    Words(Dictionary),
    Chars(Alphabet),
}

/// Converts between secrets and their transcribable form.
#[derive(Debug, Clone)]
pub struct SecretEncoder {
    tokens: TokenSet,
    count: usize,
    wrap: usize,
}

impl SecretEncoder {
    /// Encoder for `count`-word mnemonic secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDictionary` if `count` is zero or the
    /// dictionary has fewer than `count` words.
    pub fn words(dictionary: Dictionary, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "encoding.count",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        if dictionary.len() < count {
            return Err(ConfigError::InvalidDictionary(format!(
                "must contain at least {} words, but only {} provided",
                count,
                dictionary.len()
            ))
            .into());
        }

        Ok(Self {
            tokens: TokenSet::Words(dictionary),
            count,
            wrap: constants::WORD_WRAP,
        })
    }

    /// Encoder for `length`-character secrets.
    pub fn charset(alphabet: Alphabet, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "encoding.length",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Self {
            tokens: TokenSet::Chars(alphabet),
            count: length,
            wrap: constants::CHARSET_GROUP,
        })
    }

    /// Set how many tokens go on one line (words) or in one group (characters).
    ///
    /// Zero disables wrapping.
    pub fn with_wrap(mut self, wrap: usize) -> Self {
        self.wrap = wrap;
        self
    }

    /// Number of tokens in every secret.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Short description of the token set, for status output.
    pub fn describe(&self) -> String {
        match &self.tokens {
            TokenSet::Words(d) => {
                format!("{} words from a {}-word dictionary", self.count, d.len())
            }
            TokenSet::Chars(a) => format!(
                "{} characters from a {}-character alphabet",
                self.count,
                a.len()
            ),
        }
    }

    /// Approximate entropy of a generated secret, in bits.
    pub fn entropy_bits(&self) -> f64 {
        let size = match &self.tokens {
            TokenSet::Words(d) => d.len(),
            TokenSet::Chars(a) => a.len(),
        };
        self.count as f64 * (size as f64).log2()
    }

    /// Generate a fresh secret from the operating system's CSPRNG.
    pub fn generate(&self) -> Representation {
        self.generate_with(&mut OsRng)
    }

    /// Generate a fresh secret from the given RNG.
    ///
    /// Tokens are drawn independently, with replacement.
    pub fn generate_with<R: Rng + CryptoRng>(&self, rng: &mut R) -> Representation {
        let canonical = match &self.tokens {
            TokenSet::Words(dict) => {
                // Sized so it never reallocates and strands a copy.
                let capacity = self.count * (dict.max_len() + 1);
                let mut out = Zeroizing::new(String::with_capacity(capacity));
                for n in 0..self.count {
                    if n > 0 {
                        out.push(' ');
                    }
                    out.push_str(dict.word(rng.gen_range(0..dict.len())));
                }
                out
            }
            TokenSet::Chars(alphabet) => {
                let mut out = Zeroizing::new(String::with_capacity(self.count));
                for _ in 0..self.count {
                    out.push(alphabet.char_at(rng.gen_range(0..alphabet.len())));
                }
                out
            }
        };

        Representation {
            canonical,
            count: self.count,
            layout: self.layout(),
        }
    }

    /// Encode secret bytes into their representation.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError::InvalidRepresentation` if the bytes are not the
    /// canonical form of a valid secret for this encoder. Unlike [`decode`],
    /// extra or non-space separators are rejected rather than normalized.
    ///
    /// [`decode`]: Self::decode
    pub fn encode(&self, secret: &[u8]) -> std::result::Result<Representation, EncodingError> {
        let representation = self.decode_bytes(secret)?;
        if representation.secret_bytes() != secret {
            return Err(invalid("secret is not in canonical form".to_string()));
        }
        Ok(representation)
    }

    /// [`decode`](Self::decode) for raw file contents.
    pub fn decode_bytes(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Representation, EncodingError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| invalid("secret is not valid UTF-8".to_string()))?;
        self.decode(text)
    }

    /// Parse and validate a representation.
    ///
    /// Whitespace between tokens (including line breaks and grouping) is
    /// ignored. Error messages name token positions, never token values.
    pub fn decode(&self, text: &str) -> std::result::Result<Representation, EncodingError> {
        let canonical = match &self.tokens {
            TokenSet::Words(dict) => {
                let words: Vec<&str> = text.split_whitespace().collect();
                if words.len() != self.count {
                    return Err(invalid(format!(
                        "expected exactly {} words, found {}",
                        self.count,
                        words.len()
                    )));
                }
                if let Some(pos) = words.iter().position(|w| !dict.contains(w)) {
                    return Err(invalid(format!(
                        "word {} is not in the dictionary",
                        pos + 1
                    )));
                }
                let len = words.iter().map(|w| w.len()).sum::<usize>() + words.len() - 1;
                let mut out = Zeroizing::new(String::with_capacity(len));
                for (n, word) in words.iter().enumerate() {
                    if n > 0 {
                        out.push(' ');
                    }
                    out.push_str(word);
                }
                out
            }
            TokenSet::Chars(alphabet) => {
                let mut out = Zeroizing::new(String::with_capacity(self.count));
                for ch in text.chars().filter(|c| !c.is_whitespace()) {
                    if !alphabet.contains(ch) {
                        return Err(invalid(format!(
                            "character {} is not in the alphabet",
                            out.chars().count() + 1
                        )));
                    }
                    if out.len() == self.count {
                        return Err(invalid(format!(
                            "expected exactly {} characters, found more",
                            self.count
                        )));
                    }
                    out.push(ch);
                }
                if out.len() != self.count {
                    return Err(invalid(format!(
                        "expected exactly {} characters, found {}",
                        self.count,
                        out.len()
                    )));
                }
                out
            }
        };

        Ok(Representation {
            canonical,
            count: self.count,
            layout: self.layout(),
        })
    }

    fn layout(&self) -> Layout {
        match self.tokens {
            TokenSet::Words(_) => Layout::Lines(self.wrap),
            TokenSet::Chars(_) => Layout::Groups(self.wrap),
        }
    }
}

fn invalid(reason: String) -> EncodingError {
    EncodingError::InvalidRepresentation(reason)
}

/// How the wrapped form is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Words, this many per line.
    Lines(usize),
    /// Characters, this many per space-separated group.
    Groups(usize),
}

/// A validated secret in transcribable form.
///
/// Contents are wiped on drop and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Representation {
    canonical: Zeroizing<String>,
    count: usize,
    layout: Layout,
}

impl Representation {
    /// Canonical text: single spaces between words, no separators between characters.
    pub fn expose(&self) -> &str {
        &self.canonical
    }

    /// Canonical bytes, i.e. the secret itself.
    pub fn secret_bytes(&self) -> &[u8] {
        self.canonical.as_bytes()
    }

    /// Number of tokens.
    pub fn token_count(&self) -> usize {
        self.count
    }

    /// Wrapped form for display and for the plaintext file.
    pub fn wrapped(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::with_capacity(self.canonical.len() * 2));
        match self.layout {
            Layout::Lines(per_line) => {
                for (i, word) in self.canonical.split(' ').enumerate() {
                    if i > 0 {
                        out.push(if per_line > 0 && i % per_line == 0 { '\n' } else { ' ' });
                    }
                    out.push_str(word);
                }
            }
            Layout::Groups(per_group) => {
                for (i, ch) in self.canonical.chars().enumerate() {
                    if i > 0 && per_group > 0 && i % per_group == 0 {
                        out.push(' ');
                    }
                    out.push(ch);
                }
            }
        }
        out
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("tokens", &self.count)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
