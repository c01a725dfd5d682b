//! Launcher configuration model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PATH, DEFAULT_TERM, STACK_SIZE};
use crate::error::{NestboxError, Result};

/// Tunables for a single launch.
///
/// Every field has a default, so a configuration file only needs to name
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Size in bytes of the stack allocated for the cloned child.
    pub stack_size: usize,
    /// Value of `TERM` inside the container.
    pub term: String,
    /// Value of `PATH` inside the container.
    pub path: String,
    /// Whether to mount a fresh `proc` filesystem at `/proc`.
    pub mount_proc: bool,
    /// Wall-clock limit after which the child is killed.
    pub timeout_secs: Option<u64>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            stack_size: STACK_SIZE,
            term: DEFAULT_TERM.to_string(),
            path: DEFAULT_PATH.to_string(),
            mount_proc: true,
            timeout_secs: None,
        }
    }
}

impl LauncherConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// describes an unusable configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NestboxError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make a launch impossible.
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::InvalidArguments`] for a zero stack size or
    /// environment values containing NUL bytes.
    pub fn validate(&self) -> Result<()> {
        if self.stack_size == 0 {
            return Err(NestboxError::invalid("stack_size must be non-zero"));
        }
        if self.term.contains('\0') || self.path.contains('\0') {
            return Err(NestboxError::invalid(
                "environment values must not contain NUL bytes",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = LauncherConfig::default();
        assert_eq!(config.stack_size, 1024 * 1024);
        assert_eq!(config.term, "xterm-256color");
        assert_eq!(config.path, DEFAULT_PATH);
        assert!(config.mount_proc);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "term": "dumb", "timeout_secs": 5 }}"#).unwrap();

        let config = LauncherConfig::load(file.path()).unwrap();
        assert_eq!(config.term, "dumb");
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.path, DEFAULT_PATH);
        assert_eq!(config.stack_size, STACK_SIZE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "memory_limit": 10 }}"#).unwrap();
        let err = LauncherConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, NestboxError::Serialization { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LauncherConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, NestboxError::Io { .. }));
    }

    #[test]
    fn zero_stack_is_invalid() {
        let config = LauncherConfig {
            stack_size: 0,
            ..LauncherConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
