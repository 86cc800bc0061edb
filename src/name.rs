//! Service name derived from the program's invocation name.
//!
//! The name is used both as the lock file stem and as the kernel-visible
//! device name, so it is validated once up front against the tighter of the
//! two limits.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// Maximum service name length in bytes.
///
/// The kernel device name field is 80 bytes including the NUL terminator.
pub const MAX_SERVICE_NAME_LEN: usize = 79;

/// A validated service name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    /// Validate a bare name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::InvalidServiceName("name is empty".into()));
        }
        if name == "." || name == ".." {
            return Err(Error::InvalidServiceName(format!(
                "'{}' is not a file name",
                name
            )));
        }
        if name.contains('/') || name.contains('\0') {
            return Err(Error::InvalidServiceName(format!(
                "'{}' contains '/' or NUL",
                name.escape_debug()
            )));
        }
        if name.len() > MAX_SERVICE_NAME_LEN {
            return Err(Error::InvalidServiceName(format!(
                "'{}' is {} bytes, the limit is {}",
                name,
                name.len(),
                MAX_SERVICE_NAME_LEN
            )));
        }

        Ok(Self(name))
    }

    /// Derive the service name from `argv[0]`, keeping only its final path
    /// component.
    pub fn from_invocation(argv0: Option<&OsStr>) -> Result<Self> {
        let argv0 =
            argv0.ok_or_else(|| Error::InvalidServiceName("missing program name".into()))?;

        let base = Path::new(argv0).file_name().ok_or_else(|| {
            Error::InvalidServiceName(format!(
                "cannot take the base name of {}",
                Path::new(argv0).display()
            ))
        })?;

        let base = base.to_str().ok_or_else(|| {
            Error::InvalidServiceName(format!(
                "{} is not valid UTF-8",
                base.to_string_lossy()
            ))
        })?;

        Self::new(base)
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_invocation_takes_basename() {
        let name = ServiceName::from_invocation(Some(OsStr::new("/usr/local/bin/doued"))).unwrap();
        assert_eq!(name.as_str(), "doued");

        let name = ServiceName::from_invocation(Some(OsStr::new("./doued"))).unwrap();
        assert_eq!(name.as_str(), "doued");

        let name = ServiceName::from_invocation(Some(OsStr::new("doued"))).unwrap();
        assert_eq!(name.to_string(), "doued");
    }

    #[test]
    fn test_missing_invocation_name() {
        assert!(matches!(
            ServiceName::from_invocation(None),
            Err(Error::InvalidServiceName(_))
        ));
        assert!(matches!(
            ServiceName::from_invocation(Some(OsStr::new("/"))),
            Err(Error::InvalidServiceName(_))
        ));
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(ServiceName::new("").is_err());
        assert!(ServiceName::new(".").is_err());
        assert!(ServiceName::new("..").is_err());
        assert!(ServiceName::new("a/b").is_err());
        assert!(ServiceName::new("a\0b").is_err());
    }

    #[test]
    fn test_length_limit() {
        let longest = "x".repeat(MAX_SERVICE_NAME_LEN);
        assert!(ServiceName::new(longest).is_ok());

        let too_long = "x".repeat(MAX_SERVICE_NAME_LEN + 1);
        let err = ServiceName::new(too_long).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INVALID_NAME);
    }

    #[test]
    fn test_non_utf8_invocation_rejected() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/usr/bin/dou\xffed");
        assert!(ServiceName::from_invocation(Some(raw)).is_err());
    }
}
