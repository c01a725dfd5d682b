//! # nestbox-core
//!
//! Linux isolation primitives and the launch pipeline for nestbox.
//!
//! - **Namespaces**: one `clone(2)` call creating PID, UTS, mount, IPC,
//!   network and cgroup namespaces.
//! - **Filesystem**: mount propagation hardening, `chroot` jail, `/proc`.
//! - **Bootstrap**: the child-side sequence ending in `execve(2)`.
//! - **Supervisor**: reaping the child and mapping its termination.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

#[cfg(not(target_os = "linux"))]
compile_error!("nestbox-core requires Linux namespaces");

pub mod bootstrap;
pub mod environment;
pub mod filesystem;
pub mod launcher;
pub mod namespace;
pub mod supervisor;
