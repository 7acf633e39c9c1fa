//! Core library components.
//!
//! Key custody and the pieces it drives: encoding, platform ciphers, guarded
//! memory, key file I/O and configuration.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod custody;
pub mod encoding;
pub mod files;
pub mod guard;
