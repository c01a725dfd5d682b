//! # nestbox-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the nestbox workspace.
//!
//! This crate is the leaf of the dependency graph. It knows nothing about
//! Linux syscalls; the launch pipeline itself lives in `nestbox-core`.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
