//! Isolation launcher: from a [`LaunchSpec`] to a running, isolated child.

use nestbox_common::config::LauncherConfig;
use nestbox_common::error::Result;
use nestbox_common::types::{ChildOutcome, IsolationRequest, LaunchSpec};
use nix::unistd::{Pid, getpid};

use crate::bootstrap::BootstrapContext;
use crate::namespace;
use crate::supervisor::Supervisor;

/// Handle to a child running inside its own namespaces.
///
/// Owns the stack the child was cloned onto until the child is reaped.
#[derive(Debug)]
pub struct IsolatedChild {
    pid: Pid,
    _stack: Vec<u8>,
}

impl IsolatedChild {
    /// Host PID of the child.
    pub const fn pid(&self) -> Pid {
        self.pid
    }
}

/// Clones a child into fresh namespaces and starts its bootstrap.
///
/// Returns as soon as the child exists. No assumption is made about how
/// far the child's bootstrap has progressed.
///
/// # Errors
///
/// Returns [`nestbox_common::error::NestboxError::InvalidArguments`] for an
/// unusable configuration or spec, and
/// [`nestbox_common::error::NestboxError::LaunchFailed`] if `clone(2)` fails.
pub fn launch(spec: &LaunchSpec, config: &LauncherConfig) -> Result<IsolatedChild> {
    config.validate()?;
    let request = IsolationRequest::full();
    let mut context = BootstrapContext::prepare(spec, config)?;
    let mut stack = vec![0u8; config.stack_size];

    tracing::info!(
        pid = %getpid(),
        path = spec.target_path(),
        hostname = ?spec.hostname(),
        jail_root = ?spec.jail_root(),
        "launching isolated child"
    );
    let pid = namespace::spawn_isolated(
        &request,
        &mut stack,
        Box::new(move || context.run_in_child()),
    )?;
    tracing::info!(child_pid = %pid, "isolated child started");

    Ok(IsolatedChild { pid, _stack: stack })
}

/// Launches `spec` and blocks until the child terminates.
///
/// Applies `config.timeout_secs` if set.
///
/// # Errors
///
/// Returns an error if the launch fails or the child cannot be reaped.
pub fn run(spec: &LaunchSpec, config: &LauncherConfig) -> Result<ChildOutcome> {
    let supervisor = Supervisor::new(launch(spec, config)?);
    if let Some(secs) = config.timeout_secs {
        supervisor.kill_after(std::time::Duration::from_secs(secs));
    }
    supervisor.wait()
}
