//! Command-line surface and argument resolution.
//!
//! Two forms are accepted:
//!
//! - flagged: `nestbox [-h HOST] [-r DIR] -c PATH [ARGS...]`. Everything
//!   from `PATH` on is the program and its arguments, verbatim, including
//!   tokens that look like flags.
//! - positional: `nestbox [-h HOST] [-r DIR] "PATH [ARG]"`. The single token
//!   is split on its first space into the path and at most one argument.
//!   Quotes are not interpreted; use `-c` for anything richer.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use nestbox_common::config::LauncherConfig;
use nestbox_common::constants::CONFIG_ENV;
use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::LaunchSpec;

/// nestbox — run a program inside fresh Linux namespaces.
#[derive(Parser, Debug)]
#[command(name = "nestbox", version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Hostname of the container's UTS namespace.
    #[arg(short = 'h', long = "hostname", value_name = "HOST")]
    pub hostname: Option<String>,

    /// Directory to chroot into before running the program.
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// JSON file overriding launcher defaults.
    #[arg(long, env = CONFIG_ENV, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kill the container after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Take the remaining arguments as the program path and its arguments.
    #[arg(short = 'c')]
    pub command: bool,

    /// Program to run: `PATH [ARGS...]` with `-c`, else one "PATH [ARG]" token.
    #[arg(value_name = "PROGRAM", trailing_var_arg = true)]
    pub program: Vec<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Resolves the parsed command line into a [`LaunchSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::InvalidArguments`] if no program is given,
    /// the positional form receives more than one token, or the resolved
    /// path is empty.
    pub fn launch_spec(&self) -> Result<LaunchSpec> {
        let (path, args) = if self.command {
            flagged_target(&self.program)?
        } else {
            positional_target(&self.program)?
        };
        LaunchSpec::new(path, args, self.hostname.clone(), self.root.clone())
    }

    /// Builds the launcher configuration from `--config` and flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn launcher_config(&self) -> Result<LauncherConfig> {
        let mut config = match &self.config {
            Some(path) => LauncherConfig::load(path)?,
            None => LauncherConfig::default(),
        };
        if let Some(secs) = self.timeout {
            config.timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

fn flagged_target(program: &[String]) -> Result<(String, Vec<String>)> {
    let (path, args) = program
        .split_first()
        .ok_or_else(|| NestboxError::invalid("-c requires a program path"))?;
    Ok((path.clone(), args.to_vec()))
}

fn positional_target(program: &[String]) -> Result<(String, Vec<String>)> {
    match program {
        [] => Err(NestboxError::invalid(
            "missing program; usage: nestbox [-h HOST] -c PATH [ARGS...]",
        )),
        [token] => Ok(split_first_space(token)),
        _ => Err(NestboxError::invalid(format!(
            "expected one \"PATH [ARG]\" token, got {}; use -c to pass several arguments",
            program.len()
        ))),
    }
}

/// Splits `token` on its first space into a path and one argument.
///
/// Everything after the first space, further spaces included, becomes a
/// single argument.
pub fn split_first_space(token: &str) -> (String, Vec<String>) {
    match token.split_once(' ') {
        Some((path, rest)) => (path.to_string(), vec![rest.to_string()]),
        None => (token.to_string(), Vec::new()),
    }
}
