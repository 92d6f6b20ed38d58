// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fully evaluated configuration handed to the application.

use crate::domain::errors::{ConfigError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A `${...}` marker that survived evaluation.
///
/// Unresolved references are not errors: the marker text stays in the value so
/// the application can decide whether a half-configured deployment is acceptable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The key (or path description) whose value contains the marker
    pub key: String,
    /// The name that had no store entry, environment variable or default
    pub reference: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}} in '{}'", self.reference, self.key)
    }
}

/// Flat, fully expanded key/value configuration.
///
/// # Examples
///
/// ```
/// use layercfg::adapters::MapEnvironment;
/// use layercfg::domain::ConfigStore;
///
/// let store: ConfigStore = [("pool.size", "${POOL:8}"), ("debug", "on")]
///     .into_iter()
///     .collect();
/// let config = store.eval(&MapEnvironment::new()).unwrap();
///
/// assert_eq!(config.get_i64("pool.size").unwrap(), 8);
/// assert!(config.get_bool("debug").unwrap());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
    values: BTreeMap<String, String>,
    #[serde(skip)]
    unresolved: Vec<UnresolvedReference>,
}

impl ResolvedConfig {
    pub(crate) fn new(values: Vec<(String, String)>, unresolved: Vec<UnresolvedReference>) -> Self {
        Self {
            values: values.into_iter().collect(),
            unresolved,
        }
    }

    /// The value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The value for `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// The value for `key`, or [`ConfigError::ConfigKeyNotFound`].
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| ConfigError::ConfigKeyNotFound {
            key: key.to_string(),
        })
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no key was loaded from any source.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key/value pairs sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Interprets the value as a boolean.
    ///
    /// Recognizes (case-insensitive) `true`/`yes`/`1`/`on` and `false`/`no`/`0`/`off`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let raw = self.require(key)?;
        match raw.to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => raw
                .parse::<bool>()
                .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
        }
    }

    /// Interprets the value as an `i64`.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        self.require(key)?
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Interprets the value as a `u64`.
    pub fn get_u64(&self, key: &str) -> Result<u64> {
        self.require(key)?
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Interprets the value as an `f64`.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.require(key)?
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::from_parse_float_error(key.to_string(), e))
    }

    /// Parses the value into any type that implements `FromStr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::adapters::MapEnvironment;
    /// use layercfg::domain::ConfigStore;
    /// use std::net::IpAddr;
    ///
    /// let store: ConfigStore = [("bind", "127.0.0.1")].into_iter().collect();
    /// let config = store.eval(&MapEnvironment::new()).unwrap();
    /// let ip: IpAddr = config.get_parsed("bind").unwrap();
    /// assert!(ip.is_loopback());
    /// ```
    pub fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.require(key)?
            .parse::<T>()
            .map_err(|e| ConfigError::TypeConversionError {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }

    /// Every marker that could not be resolved, in discovery order.
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Returns `true` if every expression was substituted.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Consumes the configuration, returning the plain map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ResolvedConfig {
        ResolvedConfig::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Vec::new(),
        )
    }

    #[test]
    fn test_get_and_get_or() {
        let c = config(&[("a", "1")]);
        assert_eq!(c.get("a"), Some("1"));
        assert_eq!(c.get("b"), None);
        assert_eq!(c.get_or("b", "fallback"), "fallback");
    }

    #[test]
    fn test_require_missing() {
        let c = config(&[]);
        assert!(matches!(
            c.require("nope"),
            Err(ConfigError::ConfigKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_get_bool_variants() {
        let c = config(&[("a", "YES"), ("b", "off"), ("c", "maybe")]);
        assert!(c.get_bool("a").unwrap());
        assert!(!c.get_bool("b").unwrap());
        assert!(matches!(
            c.get_bool("c"),
            Err(ConfigError::TypeConversionError { .. })
        ));
    }

    #[test]
    fn test_numeric_getters() {
        let c = config(&[("i", "-42"), ("u", " 7 "), ("f", "2.5"), ("bad", "x")]);
        assert_eq!(c.get_i64("i").unwrap(), -42);
        assert_eq!(c.get_u64("u").unwrap(), 7);
        assert_eq!(c.get_f64("f").unwrap(), 2.5);
        assert!(c.get_i64("bad").is_err());
        assert!(c.get_f64("missing").is_err());
    }

    #[test]
    fn test_iteration_is_sorted() {
        let c = config(&[("z", "1"), ("a", "2")]);
        let keys: Vec<_> = c.keys().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn test_unresolved_display() {
        let reference = UnresolvedReference {
            key: "db.url".to_string(),
            reference: "DB_HOST".to_string(),
        };
        assert_eq!(reference.to_string(), "${DB_HOST} in 'db.url'");
    }

    #[test]
    fn test_into_map() {
        let map = config(&[("k", "v")]).into_map();
        assert_eq!(map.get("k").map(String::as_str), Some("v"));
    }
}
