//! Domain primitive types used across the nestbox workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_HOSTNAME_LEN, SIGNAL_EXIT_BASE};
use crate::error::{NestboxError, Result};

/// What to run inside the container and how to jail it.
///
/// Built once from command-line input and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    target_path: String,
    target_args: Vec<String>,
    hostname: Option<String>,
    jail_root: Option<PathBuf>,
}

impl LaunchSpec {
    /// Creates a validated launch specification.
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::InvalidArguments`] if the target path is empty,
    /// if any string contains a NUL byte, or if the hostname is empty or
    /// longer than `HOST_NAME_MAX`.
    pub fn new(
        target_path: impl Into<String>,
        target_args: Vec<String>,
        hostname: Option<String>,
        jail_root: Option<PathBuf>,
    ) -> Result<Self> {
        let target_path = target_path.into();
        if target_path.is_empty() {
            return Err(NestboxError::invalid("target path is empty"));
        }
        reject_nul("target path", &target_path)?;
        for arg in &target_args {
            reject_nul("target argument", arg)?;
        }
        if let Some(name) = &hostname {
            if name.is_empty() {
                return Err(NestboxError::invalid("hostname is empty"));
            }
            if name.len() > MAX_HOSTNAME_LEN {
                return Err(NestboxError::invalid(format!(
                    "hostname is {} bytes, limit is {MAX_HOSTNAME_LEN}",
                    name.len()
                )));
            }
            reject_nul("hostname", name)?;
        }
        if let Some(root) = &jail_root {
            if root.as_os_str().is_empty() {
                return Err(NestboxError::invalid("jail root is empty"));
            }
        }
        Ok(Self {
            target_path,
            target_args,
            hostname,
            jail_root,
        })
    }

    /// Path of the executable to run inside the container.
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// Arguments following argv[0].
    pub fn target_args(&self) -> &[String] {
        &self.target_args
    }

    /// Hostname to set in the new UTS namespace.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Directory the child chroots into before exec.
    pub fn jail_root(&self) -> Option<&Path> {
        self.jail_root.as_deref()
    }

    /// Full argument vector: the target path followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.target_path.as_str())
            .chain(self.target_args.iter().map(String::as_str))
            .collect()
    }
}

fn reject_nul(what: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(NestboxError::invalid(format!("{what} contains a NUL byte")));
    }
    Ok(())
}

/// A kernel namespace kind the launcher isolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Process-tree isolation; the child becomes PID 1.
    Pid,
    /// Independent hostname and domain name.
    Uts,
    /// Independent mount table.
    Mount,
    /// System V IPC objects and POSIX message queues.
    Ipc,
    /// Independent network stack.
    Network,
    /// Private control-group view.
    Cgroup,
}

impl Namespace {
    /// Every namespace kind, in the order they are reported.
    pub const ALL: [Self; 6] = [
        Self::Pid,
        Self::Uts,
        Self::Mount,
        Self::Ipc,
        Self::Network,
        Self::Cgroup,
    ];
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pid => write!(f, "pid"),
            Self::Uts => write!(f, "uts"),
            Self::Mount => write!(f, "mnt"),
            Self::Ipc => write!(f, "ipc"),
            Self::Network => write!(f, "net"),
            Self::Cgroup => write!(f, "cgroup"),
        }
    }
}

/// The set of namespaces created for the child.
///
/// Only full isolation can be requested; there is no partial configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationRequest {
    kinds: [Namespace; 6],
}

impl IsolationRequest {
    /// Requests all six namespace kinds.
    pub const fn full() -> Self {
        Self {
            kinds: Namespace::ALL,
        }
    }

    /// Iterates over the requested namespace kinds.
    pub fn kinds(&self) -> impl Iterator<Item = Namespace> + '_ {
        self.kinds.iter().copied()
    }

    /// Returns whether `kind` is part of the request.
    pub fn contains(&self, kind: Namespace) -> bool {
        self.kinds.contains(&kind)
    }
}

impl Default for IsolationRequest {
    fn default() -> Self {
        Self::full()
    }
}

/// How the isolated child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildOutcome {
    /// The child called `exit` with this status.
    Exited(i32),
    /// The child was killed by a signal.
    Signaled {
        /// Signal number.
        signal: i32,
        /// Whether a core dump was produced.
        core_dumped: bool,
    },
}

impl ChildOutcome {
    /// Exit code the launcher reports for this outcome.
    ///
    /// Normal exits pass through unchanged; signal termination maps to
    /// `128 + signal`, matching shell convention.
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Exited(code) => code,
            Self::Signaled { signal, .. } => SIGNAL_EXIT_BASE + signal,
        }
    }

    /// Returns `true` if the child exited normally with status 0.
    pub const fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "killed by signal {signal} (core dumped)"),
            Self::Signaled { signal, .. } => write!(f, "killed by signal {signal}"),
        }
    }
}
