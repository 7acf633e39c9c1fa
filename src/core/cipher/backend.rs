//! Cipher backend selection.

use tracing::debug;

use super::PlatformCipher;
use crate::core::config::CipherConfig;
use crate::error::Result;

/// Create the platform cipher for this host.
///
/// - Windows: DPAPI
/// - Unix: machine-id bound AEAD, reading `machine_id_file` if configured
///
/// # Errors
///
/// Returns `CipherError::Unsupported` on targets with neither, or
/// `CipherError::MachineId` when the machine id cannot be read.
#[cfg(windows)]
pub fn default_cipher(config: &CipherConfig) -> Result<Box<dyn PlatformCipher>> {
    debug!(scope = %config.scope, "creating dpapi cipher backend");
    Ok(Box::new(super::Dpapi::new(config.scope)))
}

#[cfg(unix)]
pub fn default_cipher(config: &CipherConfig) -> Result<Box<dyn PlatformCipher>> {
    use super::MachineBound;

    let cipher = match &config.machine_id_file {
        Some(path) => MachineBound::from_file(path, config.scope)?,
        None => MachineBound::new(config.scope)?,
    };
    debug!(scope = %config.scope, "creating machine-id cipher backend");
    Ok(Box::new(cipher))
}

#[cfg(not(any(unix, windows)))]
pub fn default_cipher(config: &CipherConfig) -> Result<Box<dyn PlatformCipher>> {
    debug!(scope = %config.scope, "no platform cipher for this target");
    Err(crate::error::CipherError::Unsupported.into())
}
