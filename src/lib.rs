//! # doued
//!
//! A tiny Linux service that provisions a virtual keyboard + mouse through
//! `uinput` and keeps it alive until interrupted, so other processes can
//! inject events into it that look like real hardware.
//!
//! ## Lifecycle
//!
//! 1. Check write access to `/dev/uinput`
//! 2. Create the lock token `/tmp/<name>.lock` with `O_EXCL` (single instance)
//! 3. Open `/dev/uinput` and register the KEY, REL and SYN event classes
//! 4. Enable key codes `0..=KEY_MAX` and relative axes `0..=REL_MAX`
//! 5. `UI_DEV_SETUP` + `UI_DEV_CREATE`
//! 6. Sleep until SIGINT clears the running flag
//! 7. `UI_DEV_DESTROY`, close the handle, remove the lock token
//!
//! A failure before step 6 releases whatever was already acquired.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doued::{RunningFlag, Service, ServiceConfig, ServiceName, UinputInterface};
//!
//! let name = ServiceName::new("doued")?;
//! let config = ServiceConfig::default();
//! let backend = UinputInterface::new(&config.uinput_path);
//!
//! let flag = RunningFlag::new();
//! doued::install_interrupt_handler(&flag)?;
//!
//! Service::new(name, config, backend).run(&flag)?;
//! # Ok::<(), doued::Error>(())
//! ```
//!
//! A lock token left behind by a crash (`kill -9`) blocks later startups
//! until it is removed by hand.

pub mod backend;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod lock;
pub mod name;
pub mod service;
pub mod signal;
pub mod state;

mod platform;

// Re-exports
pub use backend::{UinputBackend, UinputHandle};
pub use config::ServiceConfig;
pub use descriptor::{CapabilityReport, DeviceDescriptor, DeviceIdentity, DeviceName};
pub use error::{Error, Result};
pub use lock::LockToken;
pub use name::ServiceName;
pub use platform::{UinputControl, UinputInterface, sysfs_path};
pub use service::{ActiveDevice, Service};
pub use signal::install_interrupt_handler;
pub use state::{LifecycleState, RunningFlag};
