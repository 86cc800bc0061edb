//! Device lifecycle manager.
//!
//! Owns the whole sequence: lock → open → configure → create → wait →
//! destroy → close → unlock. Any failure before the device is live releases
//! whatever was already acquired, in reverse order, before returning.

use crate::backend::{UinputBackend, UinputHandle};
use crate::config::ServiceConfig;
use crate::descriptor::{CapabilityReport, DeviceDescriptor};
use crate::error::{Error, Result};
use crate::lock::LockToken;
use crate::name::ServiceName;
use crate::state::{LifecycleState, RunningFlag};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// A service that has not started yet.
pub struct Service<B: UinputBackend> {
    name: ServiceName,
    config: ServiceConfig,
    backend: B,
    state: LifecycleState,
}

impl<B: UinputBackend> Service<B> {
    /// Create a service with the given backend.
    pub fn new(name: ServiceName, config: ServiceConfig, backend: B) -> Self {
        Self {
            name,
            config,
            backend,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Service name.
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Where the lock token will be created.
    pub fn lock_path(&self) -> PathBuf {
        self.config.lock_path(&self.name)
    }

    /// Start, block until `flag` is cleared, then tear down.
    pub fn run(self, flag: &RunningFlag) -> Result<()> {
        let mut active = self.start()?;
        active.wait(flag);
        active.shutdown()
    }

    /// Acquire the lock and bring the virtual device up.
    pub fn start(mut self) -> Result<ActiveDevice<B::Handle>> {
        let descriptor = DeviceDescriptor::keyboard_and_mouse(&self.name, self.config.identity)?;

        self.backend.preflight()?;

        let lock = LockToken::acquire(self.lock_path(), &self.name)?;
        self.transition(LifecycleState::LockAcquired);

        // On error the handle has already been closed; the lock goes last.
        let (handle, report) = match self.bring_up(&descriptor) {
            Ok(up) => up,
            Err(e) => {
                log::debug!("Startup failed, rolling back: {}", e);
                if let Err(release) = lock.release() {
                    log::error!("Rollback: {}", release);
                }
                return Err(e);
            }
        };
        self.transition(LifecycleState::Running);

        let mut active = ActiveDevice {
            name: self.name,
            poll_interval: self.config.poll_interval,
            report,
            sysname: None,
            state: LifecycleState::Running,
            handle: Some(handle),
            lock: Some(lock),
        };
        active.query_sysname();

        println!("[Service {} running]", active.name);
        Ok(active)
    }

    fn bring_up(&mut self, descriptor: &DeviceDescriptor) -> Result<(B::Handle, CapabilityReport)> {
        let mut handle = self.backend.open()?;
        self.transition(LifecycleState::HandleOpen);

        let report = configure(&mut handle, descriptor)?;
        self.transition(LifecycleState::Configured);

        handle
            .setup(&descriptor.identity().input_id(), descriptor.name())
            .map_err(|e| Error::DeviceSetupFailed(format!("UI_DEV_SETUP rejected: {}", e)))?;
        handle
            .create()
            .map_err(|e| Error::DeviceSetupFailed(format!("UI_DEV_CREATE rejected: {}", e)))?;

        Ok((handle, report))
    }

    fn transition(&mut self, next: LifecycleState) {
        log::debug!("{}: {} -> {}", self.name, self.state, next);
        self.state = next;
    }
}

/// Register event classes and enable every capability code.
///
/// Event classes are mandatory. Individual key and axis codes are not: a
/// rejected code is logged and skipped.
fn configure<H: UinputHandle>(
    handle: &mut H,
    descriptor: &DeviceDescriptor,
) -> Result<CapabilityReport> {
    for event in descriptor.events().iter() {
        handle.set_event_bit(event).map_err(|e| {
            Error::DeviceSetupFailed(format!("cannot register event class {:?}: {}", event, e))
        })?;
    }

    let mut report = CapabilityReport::default();

    for key in descriptor.keys().iter() {
        match handle.set_key_bit(key) {
            Ok(()) => report.keys_enabled += 1,
            Err(e) => {
                log::warn!("Cannot enable key code {}: {}", key.code(), e);
                report.keys_failed.push(key.code());
            }
        }
    }

    for axis in descriptor.relative_axes().iter() {
        match handle.set_relative_bit(axis) {
            Ok(()) => report.axes_enabled += 1,
            Err(e) => {
                log::warn!("Cannot enable relative axis {}: {}", axis.0, e);
                report.axes_failed.push(axis.0);
            }
        }
    }

    if report.is_complete() {
        log::debug!(
            "Enabled {} key codes and {} relative axes",
            report.keys_enabled,
            report.axes_enabled
        );
    } else {
        log::warn!(
            "Device capability reduced: {} key codes and {} relative axes rejected",
            report.keys_failed.len(),
            report.axes_failed.len()
        );
    }

    Ok(report)
}

/// A live virtual device together with the resources keeping it alive.
///
/// If dropped without [`ActiveDevice::shutdown`], the handle closes before
/// the lock is removed (field order).
pub struct ActiveDevice<H: UinputHandle> {
    name: ServiceName,
    poll_interval: Duration,
    report: CapabilityReport,
    sysname: Option<String>,
    state: LifecycleState,
    handle: Option<H>,
    lock: Option<LockToken>,
}

impl<H: UinputHandle> ActiveDevice<H> {
    /// Service name.
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Which capability codes the kernel accepted.
    pub fn report(&self) -> &CapabilityReport {
        &self.report
    }

    /// Kernel sysfs name of the device, if the kernel reported one.
    pub fn sysname(&self) -> Option<&str> {
        self.sysname.as_deref()
    }

    /// Path of the held lock token.
    pub fn lock_path(&self) -> Option<&Path> {
        self.lock.as_ref().map(LockToken::path)
    }

    fn query_sysname(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        match handle.sysname() {
            Ok(sysname) => {
                log::info!(
                    "Virtual device available at {}",
                    crate::platform::sysfs_path(&sysname).display()
                );
                self.sysname = Some(sysname);
            }
            Err(e) => log::debug!("UI_GET_SYSNAME failed: {}", e),
        }
    }

    /// Block until the running flag is cleared.
    ///
    /// Sleeps in steps of the poll interval, so a stop request is noticed
    /// within one interval.
    pub fn wait(&mut self, flag: &RunningFlag) {
        while flag.is_running() {
            thread::sleep(self.poll_interval);
        }
        log::debug!("{}: {} -> {}", self.name, self.state, LifecycleState::StopRequested);
        self.state = LifecycleState::StopRequested;
    }

    /// Destroy the device, close the handle, then remove the lock.
    ///
    /// Every step runs even if an earlier one fails.
    pub fn shutdown(mut self) -> Result<()> {
        println!("\r[Service {} stopped]", self.name);

        let mut failures = Vec::new();

        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.destroy() {
                log::error!("UI_DEV_DESTROY failed: {}", e);
                failures.push(format!("destroy device: {}", e));
            }
            drop(handle);
        }

        if let Some(lock) = self.lock.take()
            && let Err(e) = lock.release()
        {
            log::error!("{}", e);
            failures.push(e.to_string());
        }

        log::debug!("{}: {} -> {}", self.name, self.state, LifecycleState::TornDown);
        self.state = LifecycleState::TornDown;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::TeardownFailed(failures.join("; ")))
        }
    }
}
