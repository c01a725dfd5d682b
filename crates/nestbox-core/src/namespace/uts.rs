//! UTS namespace isolation.
//!
//! Allows the container to have its own hostname.

use nestbox_common::error::{NestboxError, Result};

/// Sets the hostname inside the calling process's UTS namespace.
///
/// # Errors
///
/// Returns [`NestboxError::BootstrapFailed`] if `sethostname(2)` fails.
pub fn set_hostname(hostname: &str) -> Result<()> {
    nix::unistd::sethostname(hostname).map_err(|e| NestboxError::BootstrapFailed {
        step: "setting hostname",
        message: e.to_string(),
    })?;
    tracing::debug!(hostname, "container hostname set");
    Ok(())
}
