//! Traits abstracting the kernel virtual-device control interface.
//!
//! The lifecycle manager is written against these traits. The real
//! implementation lives in the platform module and talks to `/dev/uinput`;
//! tests substitute an in-memory backend.

use crate::descriptor::DeviceName;
use crate::error::Result;
use evdev::{EventType, InputId, Key, RelativeAxisType};
use std::io;

/// Opens control handles.
pub trait UinputBackend {
    /// Handle type produced by [`UinputBackend::open`].
    type Handle: UinputHandle;

    /// Check that the process may use the control interface at all.
    ///
    /// Runs before any resource is acquired.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Open the control interface for writing.
    fn open(&self) -> Result<Self::Handle>;
}

/// An open control handle.
///
/// Dropping the handle closes it.
pub trait UinputHandle {
    /// Register an event class (`UI_SET_EVBIT`).
    fn set_event_bit(&mut self, event: EventType) -> io::Result<()>;

    /// Enable one key code (`UI_SET_KEYBIT`).
    fn set_key_bit(&mut self, key: Key) -> io::Result<()>;

    /// Enable one relative axis (`UI_SET_RELBIT`).
    fn set_relative_bit(&mut self, axis: RelativeAxisType) -> io::Result<()>;

    /// Submit identity and name (`UI_DEV_SETUP`).
    fn setup(&mut self, id: &InputId, name: &DeviceName) -> io::Result<()>;

    /// Make the device live (`UI_DEV_CREATE`).
    fn create(&mut self) -> io::Result<()>;

    /// Kernel-assigned sysfs name of the created device, e.g. `input42`.
    fn sysname(&mut self) -> io::Result<String>;

    /// Remove the live device (`UI_DEV_DESTROY`).
    fn destroy(&mut self) -> io::Result<()>;
}
