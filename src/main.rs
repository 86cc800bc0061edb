//! doued - uinput keyboard and mouse service.
//!
//! Usage: doued (as root, or with write access to /dev/uinput)
//!
//! Press Ctrl+C to stop. Exit codes are listed in `doued::error`.

use doued::{Error, RunningFlag, Service, ServiceConfig, ServiceName, UinputInterface};
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::from(doued::error::EXIT_OK as u8),
        Err(e) => {
            report(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run() -> doued::Result<()> {
    let mut args = std::env::args_os();
    let name = ServiceName::from_invocation(args.next().as_deref())?;
    if args.next().is_some() {
        log::debug!("Ignoring command line arguments");
    }

    // Installed before anything is acquired, so an early Ctrl+C still
    // goes through teardown.
    let flag = RunningFlag::new();
    doued::install_interrupt_handler(&flag)?;

    let config = ServiceConfig::default();
    let backend = UinputInterface::new(&config.uinput_path);

    Service::new(name, config, backend).run(&flag)
}

fn report(error: &Error) {
    let message = match error {
        Error::AlreadyRunning { name, .. } => format!("Another {} may be already running", name),
        other => other.to_string(),
    };

    if std::io::stderr().is_terminal() {
        eprintln!("\x1b[1;31m{}\x1b[0m", message);
    } else {
        eprintln!("{}", message);
    }
}
