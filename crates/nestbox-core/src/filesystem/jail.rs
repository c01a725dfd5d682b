//! Root filesystem jailing via `chroot(2)`.
//!
//! A `chroot` only changes the process's view of `/`. Combined with a
//! private mount namespace it keeps the container away from host paths,
//! but it is not a full security sandbox.

use std::path::Path;

use nestbox_common::error::{NestboxError, Result};
use nix::mount::{MsFlags, mount};
use nix::unistd::{chdir, chroot};

/// Marks every mount under `/` as private to the current mount namespace.
///
/// A fresh mount namespace inherits shared propagation from the host, so
/// without this a `/proc` mount made inside the container would appear on
/// the host as well.
///
/// # Errors
///
/// Returns [`NestboxError::BootstrapFailed`] if the remount fails.
pub fn make_mounts_private() -> Result<()> {
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(|e| NestboxError::BootstrapFailed {
        step: "making mounts private",
        message: e.to_string(),
    })?;
    tracing::debug!("mount propagation set to private");
    Ok(())
}

/// Changes the root directory to `root` and moves into the new `/`.
///
/// # Errors
///
/// Returns [`NestboxError::BootstrapFailed`] if either `chroot(2)` or
/// `chdir(2)` fails. The caller must not continue with the host root.
pub fn enter_jail(root: &Path) -> Result<()> {
    chroot(root).map_err(|e| NestboxError::BootstrapFailed {
        step: "changing root",
        message: format!("{}: {e}", root.display()),
    })?;
    chdir("/").map_err(|e| NestboxError::BootstrapFailed {
        step: "entering new root",
        message: e.to_string(),
    })?;
    tracing::debug!(jail_root = %root.display(), "root filesystem jailed");
    Ok(())
}
