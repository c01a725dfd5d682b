//! # nestbox
//!
//! Minimal container launcher. Starts one program inside fresh PID, UTS,
//! mount, IPC, network and cgroup namespaces, optionally jailed to a root
//! directory, and exits with the program's own status.

mod args;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use nestbox_common::constants::{BIN_NAME, EXIT_INVALID_ARGUMENTS};
use nestbox_common::error::NestboxError;
use nestbox_common::types::ChildOutcome;
use nestbox_core::launcher;
use nestbox_core::supervisor::Supervisor;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return exit_code(EXIT_INVALID_ARGUMENTS);
        }
    };
    init_tracing(cli.log_json);

    match run(&cli) {
        Ok(outcome) => exit_code(outcome.exit_code()),
        Err(err) => {
            eprintln!("{BIN_NAME}: {err:#}");
            exit_code(
                err.downcast_ref::<NestboxError>()
                    .map_or(1, NestboxError::exit_code),
            )
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> anyhow::Result<ChildOutcome> {
    let spec = cli.launch_spec().context("cannot resolve the program to run")?;
    let config = cli.launcher_config().context("cannot load launcher configuration")?;

    let child = launcher::launch(&spec, &config).context("cannot start the container")?;
    let supervisor = Supervisor::new(child);

    // Installed only now so the parent is single-threaded when it clones.
    let handle = supervisor.kill_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        if handle.kill() {
            tracing::warn!("interrupted, isolated child killed");
        }
    }) {
        tracing::warn!(error = %e, "interrupts will not be forwarded to the container");
    }
    if let Some(secs) = config.timeout_secs {
        supervisor.kill_after(std::time::Duration::from_secs(secs));
    }

    let outcome = supervisor.wait().context("cannot reap the container")?;
    tracing::info!(%outcome, "container finished");
    Ok(outcome)
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
