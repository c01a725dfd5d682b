//! Linux namespace management for container isolation.
//!
//! Every namespace is requested in a single `clone(2)` call, so the child
//! starts its life already isolated.

pub mod uts;

use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::{IsolationRequest, Namespace};
use nix::sched::{CloneCb, CloneFlags, clone};
use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// Translates an isolation request into `clone(2)` flags.
pub fn clone_flags(request: &IsolationRequest) -> CloneFlags {
    request
        .kinds()
        .fold(CloneFlags::empty(), |flags, kind| flags | flag_for(kind))
}

const fn flag_for(kind: Namespace) -> CloneFlags {
    match kind {
        Namespace::Pid => CloneFlags::CLONE_NEWPID,
        Namespace::Uts => CloneFlags::CLONE_NEWUTS,
        Namespace::Mount => CloneFlags::CLONE_NEWNS,
        Namespace::Ipc => CloneFlags::CLONE_NEWIPC,
        Namespace::Network => CloneFlags::CLONE_NEWNET,
        Namespace::Cgroup => CloneFlags::CLONE_NEWCGROUP,
    }
}

/// Starts `child` as a new process inside fresh namespaces.
///
/// The child runs on `stack` and delivers `SIGCHLD` to the caller when it
/// terminates, so it can be reaped with `waitpid(2)`.
///
/// # Errors
///
/// Returns [`NestboxError::LaunchFailed`] if `clone(2)` fails, typically
/// because of missing privileges or kernel support.
pub fn spawn_isolated(
    request: &IsolationRequest,
    stack: &mut [u8],
    child: CloneCb<'_>,
) -> Result<Pid> {
    let flags = clone_flags(request);
    let kinds = request.kinds().map(|k| k.to_string()).collect::<Vec<_>>();
    tracing::debug!(namespaces = ?kinds, stack_size = stack.len(), "cloning isolated child");

    // SAFETY: the child gets its own copy of the address space (no
    // CLONE_VM), runs only on `stack`, and ends in execve(2) or returns an
    // exit status from the callback.
    let pid = unsafe { clone(child, stack, flags, Some(Signal::SIGCHLD as i32)) }.map_err(|e| {
        NestboxError::LaunchFailed {
            message: format!("clone with namespaces [{}] failed: {e}", kinds.join(", ")),
        }
    })?;
    Ok(pid)
}
