//! Fixed service settings.
//!
//! The service accepts no flags or environment variables. These values are
//! the built-in defaults; the `with_*` methods exist for embedding and tests.

use crate::descriptor::DeviceIdentity;
use crate::name::ServiceName;
use evdev::BusType;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding lock tokens.
pub const DEFAULT_LOCK_DIR: &str = "/tmp";
/// Suffix appended to the service name to form the lock file name.
pub const LOCK_SUFFIX: &str = ".lock";
/// Kernel virtual-device control interface.
pub const DEFAULT_UINPUT_PATH: &str = "/dev/uinput";
/// How long the run loop sleeps between flag checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Vendor id distinguishing the virtual device from real hardware.
pub const DEVICE_VENDOR: u16 = 0xd0ed;
/// Product id of the virtual device.
pub const DEVICE_PRODUCT: u16 = 0xd0ed;
/// Version of the virtual device.
pub const DEVICE_VERSION: u16 = 0x0001;

/// Settings for one service run.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory in which the lock token is created.
    pub lock_dir: PathBuf,
    /// Path of the uinput control interface.
    pub uinput_path: PathBuf,
    /// Sleep between run loop checks of the running flag.
    pub poll_interval: Duration,
    /// Identity reported by the virtual device.
    pub identity: DeviceIdentity,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            lock_dir: PathBuf::from(DEFAULT_LOCK_DIR),
            uinput_path: PathBuf::from(DEFAULT_UINPUT_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            identity: DeviceIdentity {
                bus: BusType::BUS_USB,
                vendor: DEVICE_VENDOR,
                product: DEVICE_PRODUCT,
                version: DEVICE_VERSION,
            },
        }
    }
}

impl ServiceConfig {
    /// Use a different lock directory.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    /// Use a different control interface path.
    pub fn with_uinput_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.uinput_path = path.into();
        self
    }

    /// Use a different run loop interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Lock token path for a service name: `<lock_dir>/<name>.lock`.
    pub fn lock_path(&self, name: &ServiceName) -> PathBuf {
        lock_path_in(&self.lock_dir, name)
    }
}

fn lock_path_in(dir: &Path, name: &ServiceName) -> PathBuf {
    dir.join(format!("{}{}", name, LOCK_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lock_path() {
        let config = ServiceConfig::default();
        let name = ServiceName::new("doued").unwrap();
        assert_eq!(config.lock_path(&name), PathBuf::from("/tmp/doued.lock"));
    }

    #[test]
    fn test_with_lock_dir() {
        let config = ServiceConfig::default().with_lock_dir("/run/user/1000");
        let name = ServiceName::new("vkbd").unwrap();
        assert_eq!(
            config.lock_path(&name),
            PathBuf::from("/run/user/1000/vkbd.lock")
        );
    }

    #[test]
    fn test_with_uinput_path_and_interval() {
        let config = ServiceConfig::default()
            .with_uinput_path("/dev/input/uinput")
            .with_poll_interval(Duration::from_secs(1));
        assert_eq!(config.uinput_path, PathBuf::from("/dev/input/uinput"));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_default_identity() {
        let config = ServiceConfig::default();
        assert_eq!(config.identity.bus, BusType::BUS_USB);
        assert_eq!(config.identity.vendor, 0xd0ed);
        assert_eq!(config.identity.product, 0xd0ed);
        assert_eq!(config.identity.version, 1);

        let id = config.identity.input_id();
        assert_eq!(id.bus_type(), BusType::BUS_USB);
        assert_eq!(id.vendor(), 0xd0ed);
        assert_eq!(config.uinput_path, PathBuf::from("/dev/uinput"));
    }
}
