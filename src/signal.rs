//! Interrupt handling.

use crate::error::{Error, Result};
use crate::state::RunningFlag;

/// Route SIGINT into the running flag.
///
/// The handler only flips the flag; all output and teardown happen on the
/// main thread once the run loop notices. Other signals keep their default
/// disposition. Can only be installed once per process.
pub fn install_interrupt_handler(flag: &RunningFlag) -> Result<()> {
    let flag = flag.clone();
    ctrlc::set_handler(move || {
        flag.request_stop();
    })
    .map_err(|e| Error::SignalHandler(e.to_string()))
}
