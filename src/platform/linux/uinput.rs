//! `/dev/uinput` control handle.
//!
//! Every ioctl result is checked and surfaced as an `io::Error`; the
//! lifecycle manager decides which failures are fatal.

use super::sys;
use crate::backend::{UinputBackend, UinputHandle};
use crate::descriptor::DeviceName;
use crate::error::{Error, Result};
use evdev::{EventType, InputId, Key, RelativeAxisType};
use nix::errno::Errno;
use nix::fcntl::AtFlags;
use nix::unistd::{AccessFlags, faccessat, geteuid};
use std::ffi::CStr;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Directory under which the kernel publishes virtual input devices.
const SYSFS_VIRTUAL_INPUT: &str = "/sys/devices/virtual/input";

/// Sysfs directory of a created device, given its kernel sysname.
pub fn sysfs_path(sysname: &str) -> PathBuf {
    Path::new(SYSFS_VIRTUAL_INPUT).join(sysname)
}

/// The kernel's uinput control interface.
#[derive(Debug, Clone)]
pub struct UinputInterface {
    path: PathBuf,
}

impl UinputInterface {
    /// Interface at the given path, normally `/dev/uinput`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the control interface.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn permission_hint(&self) -> String {
        format!(
            "{} is not writable by uid {}. Run as root or grant access with a udev rule \
             (KERNEL==\"uinput\", GROUP=\"input\", MODE=\"0660\").",
            self.path.display(),
            geteuid()
        )
    }
}

impl UinputBackend for UinputInterface {
    type Handle = UinputControl;

    fn preflight(&self) -> Result<()> {
        // AT_EACCESS: check with the effective ids, which is what open() uses.
        match faccessat(None, &self.path, AccessFlags::W_OK, AtFlags::AT_EACCESS) {
            Ok(()) => Ok(()),
            Err(Errno::EACCES | Errno::EPERM | Errno::EROFS) => {
                Err(Error::PermissionDenied(self.permission_hint()))
            }
            Err(Errno::ENOENT) => Err(Error::DeviceUnavailable(format!(
                "{} does not exist (is the uinput module loaded?)",
                self.path.display()
            ))),
            Err(e) => Err(Error::DeviceUnavailable(format!(
                "cannot access {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn open(&self) -> Result<UinputControl> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::PermissionDenied => Error::PermissionDenied(self.permission_hint()),
                _ => Error::DeviceUnavailable(format!(
                    "cannot open {}: {}",
                    self.path.display(),
                    e
                )),
            })?;

        log::debug!("Opened {}", self.path.display());
        Ok(UinputControl {
            file,
            created: false,
        })
    }
}

/// Open handle to `/dev/uinput`. Closed on drop.
#[derive(Debug)]
pub struct UinputControl {
    file: File,
    created: bool,
}

impl UinputControl {
    fn fd(&self) -> libc::c_int {
        self.file.as_raw_fd()
    }
}

impl UinputHandle for UinputControl {
    fn set_event_bit(&mut self, event: EventType) -> io::Result<()> {
        unsafe { sys::ui_set_evbit(self.fd(), event.0 as _) }?;
        Ok(())
    }

    fn set_key_bit(&mut self, key: Key) -> io::Result<()> {
        unsafe { sys::ui_set_keybit(self.fd(), key.code() as _) }?;
        Ok(())
    }

    fn set_relative_bit(&mut self, axis: RelativeAxisType) -> io::Result<()> {
        unsafe { sys::ui_set_relbit(self.fd(), axis.0 as _) }?;
        Ok(())
    }

    fn setup(&mut self, id: &InputId, name: &DeviceName) -> io::Result<()> {
        // SAFETY: uinput_setup is plain old data; all-zero is a valid value.
        let mut setup: libc::uinput_setup = unsafe { std::mem::zeroed() };
        setup.id.bustype = id.bus_type().0;
        setup.id.vendor = id.vendor();
        setup.id.product = id.product();
        setup.id.version = id.version();
        setup.name = name.to_raw();
        setup.ff_effects_max = 0;

        unsafe { sys::ui_dev_setup(self.fd(), &setup) }?;
        Ok(())
    }

    fn create(&mut self) -> io::Result<()> {
        unsafe { sys::ui_dev_create(self.fd()) }?;
        self.created = true;
        Ok(())
    }

    fn sysname(&mut self) -> io::Result<String> {
        let mut buf = [0u8; 64];
        unsafe { sys::ui_get_sysname(self.fd(), &mut buf) }?;

        let name = CStr::from_bytes_until_nul(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(name.to_string_lossy().into_owned())
    }

    fn destroy(&mut self) -> io::Result<()> {
        // One attempt only; a failed destroy is not retried on drop.
        self.created = false;
        unsafe { sys::ui_dev_destroy(self.fd()) }?;
        Ok(())
    }
}

impl Drop for UinputControl {
    fn drop(&mut self) {
        // The kernel also removes the device when the last descriptor closes.
        if self.created
            && let Err(e) = self.destroy()
        {
            log::warn!("Failed to destroy virtual device on close: {}", e);
        }
        log::debug!("Closed uinput handle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_path() {
        assert_eq!(
            sysfs_path("input42"),
            PathBuf::from("/sys/devices/virtual/input/input42")
        );
    }

    fn temp_file(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("doued-{}-{}", tag, std::process::id()));
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_missing_interface() {
        let iface = UinputInterface::new("/nonexistent/doued/uinput");
        assert_eq!(iface.path(), Path::new("/nonexistent/doued/uinput"));

        assert!(matches!(
            iface.preflight(),
            Err(Error::DeviceUnavailable(_))
        ));
        assert!(matches!(iface.open(), Err(Error::DeviceUnavailable(_))));
    }

    #[test]
    fn test_ioctl_on_regular_file_is_checked() {
        // A regular file accepts the open but rejects every uinput ioctl,
        // which must come back as an error rather than be ignored.
        let path = temp_file("fake-uinput");

        let iface = UinputInterface::new(&path);
        iface.preflight().unwrap();
        let mut control = iface.open().unwrap();

        assert!(control.set_event_bit(EventType::KEY).is_err());
        assert!(control.set_key_bit(Key::KEY_A).is_err());
        assert!(control.create().is_err());
        drop(control);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_destroy_is_not_retried_on_drop() {
        let path = temp_file("destroy-once");
        let mut control = UinputInterface::new(&path).open().unwrap();
        control.created = true;

        assert!(control.destroy().is_err());
        assert!(!control.created);
        drop(control);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_preflight_checks_effective_write_access() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_file("read-only");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();
        let iface = UinputInterface::new(&path);

        if geteuid().is_root() {
            // Root bypasses mode bits.
            iface.preflight().unwrap();
        } else {
            match iface.preflight() {
                Err(Error::PermissionDenied(msg)) => {
                    assert!(msg.contains(&format!("uid {}", geteuid())));
                }
                _ => panic!("expected PermissionDenied for a read-only interface"),
            }
        }

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        iface.preflight().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
