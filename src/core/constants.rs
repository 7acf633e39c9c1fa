//! Constants used throughout keysafe.
//!
//! Centralizes file names, sizes and format markers.

/// Configuration file name (keysafe.toml).
pub const CONFIG_FILE: &str = "keysafe.toml";

/// Default ciphertext file name.
pub const CIPHER_FILE: &str = "key.dat";

/// Default plaintext file name.
pub const PLAIN_FILE: &str = "key.txt";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "KEYSAFE_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "KEYSAFE_LOG";

/// Owner read/write only.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Default number of words in a word-list secret.
pub const WORD_COUNT: usize = 24;

/// Words per line in the plaintext file.
pub const WORD_WRAP: usize = 6;

/// Default number of characters in a character-string secret.
pub const CHARSET_LENGTH: usize = 52;

/// Characters per group when displaying a character-string secret.
pub const CHARSET_GROUP: usize = 13;

/// Smallest alphabet accepted for character-string secrets.
pub const MIN_ALPHABET: usize = 16;

/// Crockford base32 alphabet (no I, L, O, U).
pub const CROCKFORD: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Places where a Unix host keeps its machine id.
pub const MACHINE_ID_PATHS: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];
