//! Key file I/O.
//!
//! Writes are all-or-nothing: data goes to a temporary file in the target
//! directory, is synced, and is then linked into place only if nothing
//! exists there yet. A crash or error never leaves a half-written key file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{FileError, Result};

/// The ciphertext/plaintext file pair a key is kept in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    cipher: PathBuf,
    plain: PathBuf,
}

impl KeyFiles {
    pub fn new(cipher: impl Into<PathBuf>, plain: impl Into<PathBuf>) -> Self {
        Self {
            cipher: cipher.into(),
            plain: plain.into(),
        }
    }

    /// Sealed key file.
    pub fn cipher(&self) -> &Path {
        &self.cipher
    }

    /// Transcribable key file.
    pub fn plain(&self) -> &Path {
        &self.plain
    }
}

/// Check whether a key file is present.
///
/// Unlike `Path::exists`, errors other than "not found" (permission denied
/// on a parent directory, for instance) are reported instead of being read
/// as absence, so an unreadable file is never mistaken for a missing one.
pub fn is_present(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(FileError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

/// Read a key file into a buffer that is wiped on drop.
pub fn read(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    debug!(path = %path.display(), "reading key file");
    fs::read(path).map(Zeroizing::new).map_err(|source| {
        FileError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Create `path` with `contents`, owner read/write only.
///
/// Fails with `AlreadyExists` rather than replacing an existing file.
pub fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    debug!(path = %path.display(), len = contents.len(), "writing key file");
    write_atomic(path, contents).map_err(|source| {
        FileError::Write {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;

    // Restrict permissions before any secret bytes land in the file.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(constants::KEY_FILE_MODE))?;
    }

    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

/// Log a warning if a key file is readable by anyone but its owner.
#[cfg(unix)]
pub fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = fs::metadata(path) else {
        return;
    };
    let mode = metadata.permissions().mode() & 0o777;
    if mode != constants::KEY_FILE_MODE {
        warn!(
            path = %path.display(),
            mode = %format!("{:o}", mode),
            "insecure key file permissions, run: chmod 600 {}",
            path.display()
        );
    }
}

#[cfg(not(unix))]
pub fn warn_if_exposed(_path: &Path) {}
