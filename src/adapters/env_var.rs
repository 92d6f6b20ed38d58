// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable adapters.
//!
//! [`ProcessEnvironment`] reads the live process environment;
//! [`MapEnvironment`] serves a fixed set of variables, for embedding and tests.

use crate::ports::Environment;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Environment backed by `std::env`.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::ProcessEnvironment;
/// use layercfg::ports::Environment;
///
/// let env = ProcessEnvironment::new();
/// assert!(env.var("LAYERCFG_SURELY_UNSET_12345").is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    /// Creates a new process environment adapter.
    pub fn new() -> Self {
        ProcessEnvironment
    }
}

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        match env::var(name) {
            Ok(value) if value.len() > MAX_ENV_VALUE_LEN => {
                tracing::debug!(
                    "Ignoring oversized environment variable '{}': value_len={} (max {})",
                    name,
                    value.len(),
                    MAX_ENV_VALUE_LEN
                );
                None
            }
            Ok(value) => Some(value),
            Err(_) => None,
        }
    }
}

/// Environment with a fixed set of variables.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapEnvironment;
/// use layercfg::ports::Environment;
///
/// let env = MapEnvironment::new()
///     .with_var("PROPS_FILE", "/etc/app/override.properties");
///
/// assert_eq!(env.var("PROPS_FILE").as_deref(), Some("/etc/app/override.properties"));
/// assert!(env.var("HOME").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment from pre-populated values.
    pub fn with_values(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Adds a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Snapshot of the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to set and clean up environment variables
    struct EnvGuard {
        keys: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { keys: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.keys.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_process_env_reads_var() {
        let mut guard = EnvGuard::new();
        guard.set("LAYERCFG_TEST_PROCESS_VAR", "value");

        let env = ProcessEnvironment::new();
        assert_eq!(
            env.var("LAYERCFG_TEST_PROCESS_VAR").as_deref(),
            Some("value")
        );
    }

    #[test]
    fn test_process_env_missing() {
        let env = ProcessEnvironment::new();
        assert!(env.var("LAYERCFG_TEST_NONEXISTENT_12345").is_none());
    }

    #[test]
    fn test_process_env_rejects_invalid_names() {
        let env = ProcessEnvironment::new();
        assert!(env.var("").is_none());
        assert!(env.var("A=B").is_none());
    }

    #[test]
    fn test_map_env_with_values() {
        let mut values = HashMap::new();
        values.insert("A".to_string(), "1".to_string());

        let env = MapEnvironment::with_values(values).with_var("B", "2");
        assert_eq!(env.var("A").as_deref(), Some("1"));
        assert_eq!(env.var("B").as_deref(), Some("2"));
        assert!(env.var("C").is_none());
    }

    #[test]
    fn test_map_env_from_process() {
        let mut guard = EnvGuard::new();
        guard.set("LAYERCFG_TEST_SNAPSHOT", "snap");

        let env = MapEnvironment::from_process();
        assert_eq!(env.var("LAYERCFG_TEST_SNAPSHOT").as_deref(), Some("snap"));
    }
}
