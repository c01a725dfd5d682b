//! Parent-side supervision of the isolated child.
//!
//! The supervisor blocks on `waitpid(2)` for exactly one child and turns
//! its termination into a [`ChildOutcome`]. Optional helpers can kill the
//! child from other threads (timeout watchdog, interrupt forwarding); they
//! stop acting once the child has been reaped so a recycled PID is never
//! signalled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::ChildOutcome;
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

use crate::launcher::IsolatedChild;

/// Maps a wait status to a terminal outcome.
///
/// Returns `None` for stop/continue notifications, which do not end the
/// child.
pub fn outcome_from_status(status: WaitStatus) -> Option<ChildOutcome> {
    match status {
        WaitStatus::Exited(_, code) => Some(ChildOutcome::Exited(code)),
        WaitStatus::Signaled(_, signal, core_dumped) => Some(ChildOutcome::Signaled {
            signal: signal as i32,
            core_dumped,
        }),
        _ => None,
    }
}

/// Blocks until `pid` terminates.
///
/// Interrupted waits are retried.
///
/// # Errors
///
/// Returns [`NestboxError::WaitFailed`] if `waitpid(2)` fails, for example
/// because `pid` is not a child of the caller.
pub fn wait_for_child(pid: Pid) -> Result<ChildOutcome> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(outcome) = outcome_from_status(status) {
                    tracing::info!(child_pid = %pid, %outcome, "isolated child terminated");
                    return Ok(outcome);
                }
                tracing::debug!(child_pid = %pid, ?status, "ignoring non-terminal wait status");
            }
            Err(Errno::EINTR) => {}
            Err(e) => {
                return Err(NestboxError::WaitFailed {
                    message: format!("waitpid({pid}) failed: {e}"),
                });
            }
        }
    }
}

/// Cloneable handle that force-kills the child while it is unreaped.
#[derive(Debug, Clone)]
pub struct KillHandle {
    pid: Pid,
    reaped: Arc<AtomicBool>,
}

impl KillHandle {
    /// Sends `SIGKILL` to the child.
    ///
    /// `SIGKILL` is used because the child is PID 1 of its namespace and
    /// ignores signals it has no handler for. Returns `false` if the child
    /// was already reaped or the signal could not be delivered.
    pub fn kill(&self) -> bool {
        if self.reaped.load(Ordering::Acquire) {
            return false;
        }
        match kill(self.pid, Signal::SIGKILL) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(child_pid = %self.pid, error = %e, "failed to kill isolated child");
                false
            }
        }
    }
}

/// Owns an [`IsolatedChild`] until it is reaped.
#[derive(Debug)]
pub struct Supervisor {
    child: IsolatedChild,
    reaped: Arc<AtomicBool>,
}

impl Supervisor {
    /// Takes ownership of a freshly launched child.
    pub fn new(child: IsolatedChild) -> Self {
        Self {
            child,
            reaped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Host PID of the supervised child.
    pub const fn pid(&self) -> Pid {
        self.child.pid()
    }

    /// Returns a handle other threads can use to kill the child.
    pub fn kill_handle(&self) -> KillHandle {
        KillHandle {
            pid: self.child.pid(),
            reaped: Arc::clone(&self.reaped),
        }
    }

    /// Kills the child if it is still running after `timeout`.
    pub fn kill_after(&self, timeout: Duration) {
        let handle = self.kill_handle();
        let spawned = std::thread::Builder::new()
            .name("nestbox-watchdog".into())
            .spawn(move || {
                std::thread::sleep(timeout);
                if handle.kill() {
                    tracing::warn!(
                        child_pid = %handle.pid,
                        timeout_secs = timeout.as_secs(),
                        "timeout exceeded, isolated child killed"
                    );
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to start timeout watchdog");
        }
    }

    /// Blocks until the child terminates and releases its stack.
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::WaitFailed`] if the child cannot be reaped.
    pub fn wait(self) -> Result<ChildOutcome> {
        let outcome = wait_for_child(self.child.pid());
        self.reaped.store(true, Ordering::Release);
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::process::Command;

    use super::*;

    fn pid_of(child: &std::process::Child) -> Pid {
        Pid::from_raw(i32::try_from(child.id()).unwrap())
    }

    #[test]
    fn exit_status_maps_to_exited() {
        let status = WaitStatus::Exited(Pid::from_raw(10), 3);
        assert_eq!(outcome_from_status(status), Some(ChildOutcome::Exited(3)));
    }

    #[test]
    fn signal_status_maps_to_signaled() {
        let status = WaitStatus::Signaled(Pid::from_raw(10), Signal::SIGKILL, false);
        let outcome = outcome_from_status(status).unwrap();
        assert_eq!(
            outcome,
            ChildOutcome::Signaled {
                signal: 9,
                core_dumped: false
            }
        );
        assert_eq!(outcome.exit_code(), 137);
    }

    #[test]
    fn stop_and_continue_are_not_terminal() {
        let pid = Pid::from_raw(10);
        assert_eq!(outcome_from_status(WaitStatus::Stopped(pid, Signal::SIGSTOP)), None);
        assert_eq!(outcome_from_status(WaitStatus::Continued(pid)), None);
        assert_eq!(outcome_from_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn waiting_for_a_non_child_fails() {
        let err = wait_for_child(nix::unistd::getpid()).unwrap_err();
        assert!(matches!(err, NestboxError::WaitFailed { .. }));
    }

    #[test]
    fn reaps_exit_code_of_a_plain_child() {
        let child = Command::new("/bin/sh").args(["-c", "exit 7"]).spawn().unwrap();
        let outcome = wait_for_child(pid_of(&child)).unwrap();
        assert_eq!(outcome, ChildOutcome::Exited(7));
    }

    #[test]
    fn reaps_signal_of_a_plain_child() {
        let child = Command::new("/bin/sh")
            .args(["-c", "kill -9 $$"])
            .spawn()
            .unwrap();
        let outcome = wait_for_child(pid_of(&child)).unwrap();
        assert_eq!(outcome.exit_code(), 128 + 9);
    }

    #[test]
    fn kill_handle_is_inert_after_reap() {
        let handle = KillHandle {
            pid: nix::unistd::getpid(),
            reaped: Arc::new(AtomicBool::new(true)),
        };
        assert!(!handle.kill());
    }
}
