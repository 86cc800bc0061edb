//! Linux uinput implementation.
//!
//! ## Permissions
//!
//! Creating a virtual device requires write access to `/dev/uinput`. Either
//! run as root or grant access through a udev rule, for example:
//! ```text
//! KERNEL=="uinput", GROUP="input", MODE="0660"
//! ```

mod sys;
mod uinput;

pub use uinput::{UinputControl, UinputInterface, sysfs_path};
