//! Environment sanitization for the target program.
//!
//! The container never inherits the launcher's environment. It receives an
//! allow-list of exactly two variables, `TERM` and `PATH`, which is handed
//! to `execve(2)` explicitly.

use std::ffi::CString;

use nestbox_common::config::LauncherConfig;
use nestbox_common::error::{NestboxError, Result};

/// The complete environment of the target program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedEnv {
    vars: Vec<(String, String)>,
}

impl SanitizedEnv {
    /// Builds the allow-listed environment from the launcher configuration.
    pub fn from_config(config: &LauncherConfig) -> Self {
        let mut env = Self { vars: Vec::new() };
        env.set_if_absent("TERM", &config.term);
        env.set_if_absent("PATH", &config.path);
        env
    }

    fn set_if_absent(&mut self, key: &str, value: &str) {
        if self.get(key).is_none() {
            self.vars.push((key.to_string(), value.to_string()));
        }
    }

    /// Looks up a variable by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of variables exposed to the target.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variable is exposed.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the variables as `NAME=value` C strings for `execve(2)`.
    ///
    /// # Errors
    ///
    /// Returns [`NestboxError::InvalidArguments`] if a value contains a NUL byte.
    pub fn to_cstrings(&self) -> Result<Vec<CString>> {
        self.iter()
            .map(|(k, v)| {
                CString::new(format!("{k}={v}")).map_err(|_| {
                    NestboxError::invalid(format!("environment variable {k} contains a NUL byte"))
                })
            })
            .collect()
    }
}
