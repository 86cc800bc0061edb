//! Device descriptor: identity and capability declaration for the virtual
//! device.
//!
//! The capability set is a deliberately broad superset so that injection
//! clients can emit any key or relative axis the kernel knows about. Key
//! codes and relative axes live in separate namespaces, so each class is
//! enabled over its own valid range (`0..=KEY_MAX` and `0..=REL_MAX`).

use crate::error::{Error, Result};
use crate::name::ServiceName;
use evdev::{AttributeSet, AttributeSetRef, BusType, EventType, InputId, Key, RelativeAxisType};
use std::ffi::c_char;

/// Highest key code understood by the kernel (`KEY_MAX`).
pub const KEY_MAX: u16 = 0x2ff;
/// Highest relative axis code understood by the kernel (`REL_MAX`).
pub const REL_MAX: u16 = 0x0f;
/// Size of the kernel's device name field, including the NUL terminator.
pub const DEVICE_NAME_SIZE: usize = libc::UINPUT_MAX_NAME_SIZE as usize;

/// Bus, vendor, product and version reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Bus type, USB for this service.
    pub bus: BusType,
    /// Vendor id.
    pub vendor: u16,
    /// Product id.
    pub product: u16,
    /// Device version.
    pub version: u16,
}

impl DeviceIdentity {
    /// The identity in evdev's representation.
    pub fn input_id(&self) -> InputId {
        InputId::new(self.bus, self.vendor, self.product, self.version)
    }
}

/// Kernel-visible device name, guaranteed to fit the fixed name field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceName(String);

impl DeviceName {
    /// Validate a device name. Names that would not leave room for the
    /// terminator are rejected, never truncated.
    pub fn new(name: &str) -> Result<Self> {
        if name.len() >= DEVICE_NAME_SIZE {
            return Err(Error::InvalidServiceName(format!(
                "device name '{}' exceeds {} bytes",
                name,
                DEVICE_NAME_SIZE - 1
            )));
        }
        if name.contains('\0') {
            return Err(Error::InvalidServiceName(format!(
                "device name '{}' contains NUL",
                name.escape_debug()
            )));
        }
        Ok(Self(name.to_owned()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL-padded copy suitable for the kernel's name field.
    pub fn to_raw(&self) -> [c_char; DEVICE_NAME_SIZE] {
        let mut raw = [0 as c_char; DEVICE_NAME_SIZE];
        for (dst, src) in raw.iter_mut().zip(self.0.bytes()) {
            *dst = src as c_char;
        }
        raw
    }
}

/// Identity and capability set of the virtual device.
///
/// Built once at startup and never modified afterwards.
pub struct DeviceDescriptor {
    identity: DeviceIdentity,
    name: DeviceName,
    events: AttributeSet<EventType>,
    keys: AttributeSet<Key>,
    relative_axes: AttributeSet<RelativeAxisType>,
}

impl DeviceDescriptor {
    /// Descriptor for a keyboard + mouse device named after the service.
    pub fn keyboard_and_mouse(service: &ServiceName, identity: DeviceIdentity) -> Result<Self> {
        let name = DeviceName::new(service.as_str())?;

        let events = AttributeSet::from_iter([
            EventType::KEY,
            EventType::RELATIVE,
            EventType::SYNCHRONIZATION,
        ]);
        let keys = (0..=KEY_MAX).map(Key::new).collect();
        let relative_axes = (0..=REL_MAX).map(RelativeAxisType).collect();

        Ok(Self {
            identity,
            name,
            events,
            keys,
            relative_axes,
        })
    }

    /// Bus, vendor, product and version.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Kernel-visible device name.
    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Event classes the device registers.
    pub fn events(&self) -> &AttributeSetRef<EventType> {
        &self.events
    }

    /// Key codes the device can emit.
    pub fn keys(&self) -> &AttributeSetRef<Key> {
        &self.keys
    }

    /// Relative axes the device can emit.
    pub fn relative_axes(&self) -> &AttributeSetRef<RelativeAxisType> {
        &self.relative_axes
    }
}

/// Outcome of enabling individual capability codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityReport {
    /// Key codes the kernel accepted.
    pub keys_enabled: usize,
    /// Key codes the kernel rejected.
    pub keys_failed: Vec<u16>,
    /// Relative axes the kernel accepted.
    pub axes_enabled: usize,
    /// Relative axes the kernel rejected.
    pub axes_failed: Vec<u16>,
}

impl CapabilityReport {
    /// True when every requested code was enabled.
    pub fn is_complete(&self) -> bool {
        self.keys_failed.is_empty() && self.axes_failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    fn descriptor() -> DeviceDescriptor {
        let name = ServiceName::new("doued").unwrap();
        DeviceDescriptor::keyboard_and_mouse(&name, ServiceConfig::default().identity).unwrap()
    }

    #[test]
    fn test_event_classes() {
        let desc = descriptor();
        assert!(desc.events().contains(EventType::KEY));
        assert!(desc.events().contains(EventType::RELATIVE));
        assert!(desc.events().contains(EventType::SYNCHRONIZATION));
        assert!(!desc.events().contains(EventType::ABSOLUTE));
        assert_eq!(desc.events().iter().count(), 3);
    }

    #[test]
    fn test_capability_ranges() {
        let desc = descriptor();
        assert_eq!(desc.keys().iter().count(), 768);
        assert!(desc.keys().contains(Key::KEY_A));
        assert!(desc.keys().contains(Key::BTN_LEFT));
        assert!(desc.keys().contains(Key::new(KEY_MAX)));

        assert_eq!(desc.relative_axes().iter().count(), 16);
        assert!(desc.relative_axes().contains(RelativeAxisType::REL_X));
        assert!(desc.relative_axes().contains(RelativeAxisType::REL_WHEEL));
    }

    #[test]
    fn test_name_and_identity() {
        let desc = descriptor();
        assert_eq!(desc.name().as_str(), "doued");
        assert_eq!(desc.identity().bus, BusType::BUS_USB);
        assert_eq!(desc.identity().vendor, 0xd0ed);
        assert_eq!(desc.identity().product, 0xd0ed);
    }

    #[test]
    fn test_device_name_raw_is_nul_padded() {
        let raw = DeviceName::new("doued").unwrap().to_raw();
        let bytes: Vec<u8> = raw.iter().map(|&c| c as u8).collect();
        assert_eq!(&bytes[..5], b"doued");
        assert!(bytes[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_device_name_bounds() {
        assert!(DeviceName::new(&"n".repeat(DEVICE_NAME_SIZE - 1)).is_ok());
        assert!(DeviceName::new(&"n".repeat(DEVICE_NAME_SIZE)).is_err());
    }

    #[test]
    fn test_capability_report() {
        let mut report = CapabilityReport::default();
        assert!(report.is_complete());
        report.axes_failed.push(3);
        assert!(!report.is_complete());
    }
}
