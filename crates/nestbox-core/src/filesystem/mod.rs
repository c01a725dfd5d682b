//! Filesystem setup inside the container's mount namespace.
//!
//! Provides mount propagation hardening, the `chroot` jail, and the
//! `/proc` mount.

pub mod jail;
pub mod mount;
