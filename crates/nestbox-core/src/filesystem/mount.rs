//! Mount utilities for container filesystem setup.

use std::path::Path;

use nestbox_common::error::{NestboxError, Result};
use nix::mount::{MsFlags, mount};

/// Mounts a fresh `proc` filesystem at `target`.
///
/// Mounted from inside the new PID namespace, it lists only the
/// container's own processes.
///
/// # Errors
///
/// Returns [`NestboxError::BootstrapFailed`] if the `mount(2)` syscall fails,
/// for example when `target` does not exist inside the jail.
pub fn mount_proc(target: &Path) -> Result<()> {
    mount(
        Some("proc"),
        target,
        Some("proc"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| NestboxError::BootstrapFailed {
        step: "mounting proc",
        message: format!("{}: {e}", target.display()),
    })?;
    tracing::debug!(target = %target.display(), "proc mounted");
    Ok(())
}
