//! Running flag and lifecycle state.
//!
//! The running flag is the only state shared between the interrupt handler
//! and the run loop. The handler writes it once; the loop only reads it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide "keep running" flag.
///
/// Starts in the running state and moves to stopped exactly once.
#[derive(Debug, Clone)]
pub struct RunningFlag {
    running: Arc<AtomicBool>,
}

impl Default for RunningFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningFlag {
    /// Create a flag in the running state.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request a stop. Returns `true` only for the call that performed the
    /// transition.
    ///
    /// Only touches the atomic, so it is safe to call from a signal context.
    #[inline]
    pub fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    /// Check whether the service should keep running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Stages of the device lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing acquired yet.
    Uninitialized,
    /// Lock token created.
    LockAcquired,
    /// Control handle open.
    HandleOpen,
    /// Event classes and capability bits submitted.
    Configured,
    /// Device created and live.
    Running,
    /// Stop requested, teardown pending.
    StopRequested,
    /// Device destroyed, handle closed, lock removed.
    TornDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::LockAcquired => "lock acquired",
            LifecycleState::HandleOpen => "handle open",
            LifecycleState::Configured => "configured",
            LifecycleState::Running => "running",
            LifecycleState::StopRequested => "stop requested",
            LifecycleState::TornDown => "torn down",
        };
        f.write_str(s)
    }
}
