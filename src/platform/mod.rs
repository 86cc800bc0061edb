//! Platform-specific implementations.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;

// uinput is a Linux kernel interface
#[cfg(not(target_os = "linux"))]
compile_error!("doued only supports Linux (it requires the uinput kernel interface)");
