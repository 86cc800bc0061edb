//! Singleton lock token.
//!
//! The token is a plain file whose existence means "an instance is running".
//! It is created with `O_CREAT | O_EXCL`, so two racing instances can never
//! both succeed. A token left behind by a crash blocks later startups until
//! it is removed by hand.

use crate::error::{Error, Result};
use crate::name::ServiceName;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// An acquired lock token.
///
/// Released explicitly with [`LockToken::release`]. If dropped without
/// release (early return or unwind), the file is still removed.
#[derive(Debug)]
pub struct LockToken {
    path: PathBuf,
    file: Option<File>,
    released: bool,
}

impl LockToken {
    /// Atomically create the token at `path`.
    ///
    /// Fails with [`Error::AlreadyRunning`] if the file already exists.
    pub fn acquire(path: impl Into<PathBuf>, name: &ServiceName) -> Result<Self> {
        let path = path.into();

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o644)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyRunning {
                    name: name.to_string(),
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(Error::LockFailed(format!(
                    "cannot create {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        // From here on the file is ours; wrap it before anything can fail.
        let mut token = Self {
            path,
            file: None,
            released: false,
        };

        // The pid is informational only and never read back.
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            log::warn!("Failed to record pid in {}: {}", token.path.display(), e);
        }
        token.file = Some(file);

        log::debug!("Acquired lock {}", token.path.display());
        Ok(token)
    }

    /// Path of the token.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the descriptor and delete the token.
    pub fn release(mut self) -> Result<()> {
        self.remove()
    }

    fn remove(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        drop(self.file.take());

        fs::remove_file(&self.path).map_err(|e| {
            Error::LockFailed(format!("cannot remove {}: {}", self.path.display(), e))
        })?;

        log::debug!("Released lock {}", self.path.display());
        Ok(())
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            log::error!("{}", e);
        }
    }
}
