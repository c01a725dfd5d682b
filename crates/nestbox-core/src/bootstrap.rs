//! Child-side bootstrap sequence.
//!
//! Runs once, as the entry point of the cloned child, inside the new
//! namespaces:
//!
//! ```text
//! Created -> HostnameSet -> EnvironmentSanitized -> RootJailed
//!         -> ProcInfoMounted -> execve(2)
//! ```
//!
//! Each step is attempted exactly once. Any failure before `execve(2)`
//! ends the child; it never continues with a partially isolated setup.
//! The only tolerated failure is the `/proc` mount, which is logged as a
//! warning.
//!
//! All strings handed to the kernel are prepared by the parent in
//! [`BootstrapContext::prepare`], so the child branch only issues syscalls.

use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};

use nestbox_common::config::LauncherConfig;
use nestbox_common::constants::PROC_MOUNT_POINT;
use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::LaunchSpec;
use nix::errno::Errno;
use nix::unistd::execve;

use crate::environment::SanitizedEnv;
use crate::filesystem::{jail, mount};
use crate::namespace::uts;

/// Last bootstrap step the child completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    /// Nothing has been applied yet.
    Created,
    /// The requested hostname (if any) is set.
    HostnameSet,
    /// The target environment is reduced to the allow-list.
    EnvironmentSanitized,
    /// Mounts are private and the jail root (if any) is entered.
    RootJailed,
    /// `/proc` handling is done.
    ProcInfoMounted,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::HostnameSet => write!(f, "hostname-set"),
            Self::EnvironmentSanitized => write!(f, "environment-sanitized"),
            Self::RootJailed => write!(f, "root-jailed"),
            Self::ProcInfoMounted => write!(f, "proc-mounted"),
        }
    }
}

/// Everything the child needs to turn itself into the target program.
#[derive(Debug)]
pub struct BootstrapContext {
    hostname: Option<String>,
    jail_root: Option<PathBuf>,
    mount_proc: bool,
    env: SanitizedEnv,
    path: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
    stage: BootstrapStage,
}

impl BootstrapContext {
    /// Records the intended child setup for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::InvalidArguments`] if a path, argument, or
    /// environment value cannot be represented as a C string.
    pub fn prepare(spec: &LaunchSpec, config: &LauncherConfig) -> Result<Self> {
        let path = to_cstring("target path", spec.target_path())?;
        let argv = spec
            .argv()
            .into_iter()
            .map(|arg| to_cstring("target argument", arg))
            .collect::<Result<Vec<_>>>()?;
        let env = SanitizedEnv::from_config(config);
        let envp = env.to_cstrings()?;

        Ok(Self {
            hostname: spec.hostname().map(str::to_string),
            jail_root: spec.jail_root().map(Path::to_path_buf),
            mount_proc: config.mount_proc,
            env,
            path,
            argv,
            envp,
            stage: BootstrapStage::Created,
        })
    }

    /// Last completed step.
    pub const fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// Argument vector passed to `execve(2)`, starting with the target path.
    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    /// Environment passed to `execve(2)`.
    pub const fn env(&self) -> &SanitizedEnv {
        &self.env
    }

    /// Applies every bootstrap step and replaces the process image.
    ///
    /// Only returns on failure; on success the calling process is the
    /// target program.
    pub fn enter(&mut self) -> NestboxError {
        match self.setup() {
            Ok(()) => self.exec_target(),
            Err(e) => e,
        }
    }

    /// Entry point of the cloned child. Returns the child's exit status.
    pub(crate) fn run_in_child(&mut self) -> isize {
        let err = self.enter();
        tracing::error!(stage = %self.stage, error = %err, "container bootstrap failed");
        err.exit_code() as isize
    }

    fn setup(&mut self) -> Result<()> {
        if let Some(hostname) = &self.hostname {
            uts::set_hostname(hostname)?;
        }
        self.advance(BootstrapStage::HostnameSet);

        // The target environment was built from the allow-list before
        // cloning and is passed to execve(2) as is.
        self.advance(BootstrapStage::EnvironmentSanitized);

        jail::make_mounts_private()?;
        if let Some(root) = &self.jail_root {
            jail::enter_jail(root)?;
        }
        self.advance(BootstrapStage::RootJailed);

        if self.mount_proc {
            if let Err(e) = mount::mount_proc(Path::new(PROC_MOUNT_POINT)) {
                tracing::warn!(error = %e, "continuing without a fresh /proc");
            }
        }
        self.advance(BootstrapStage::ProcInfoMounted);
        Ok(())
    }

    fn advance(&mut self, next: BootstrapStage) {
        tracing::debug!(from = %self.stage, to = %next, "bootstrap step done");
        self.stage = next;
    }

    fn exec_target(&self) -> NestboxError {
        match execve(&self.path, &self.argv, &self.envp) {
            Ok(never) => match never {},
            Err(errno) => exec_error(&self.path, errno),
        }
    }
}

fn exec_error(path: &CString, errno: Errno) -> NestboxError {
    NestboxError::ExecFailed {
        path: path.to_string_lossy().into_owned(),
        not_found: matches!(errno, Errno::ENOENT | Errno::ENOTDIR),
        message: errno.to_string(),
    }
}

fn to_cstring(what: &str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| NestboxError::invalid(format!("{what} contains a NUL byte")))
}
