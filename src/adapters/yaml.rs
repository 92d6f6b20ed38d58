// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML document parser.
//!
//! This module provides a parser that flattens YAML documents into dotted keys.

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;

/// YAML parser implementation.
///
/// This parser converts YAML documents into flat entries using dot notation
/// for nested mappings. A sequence of scalars becomes one comma-separated value,
/// so it can feed path lists such as `load.properties`; a sequence containing
/// mappings or nested sequences is indexed (`servers.0.host`).
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::YamlParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let yaml_content = "database:\n  host: localhost\n  port: 5432";
/// let result = parser.parse(yaml_content).unwrap();
/// assert!(result.contains(&("database.host".to_string(), "localhost".to_string())));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn join(prefix: &str, segment: &str) -> String {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    }

    fn scalar(value: &serde_yaml::Value) -> Option<String> {
        match value {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Null => Some(String::new()),
            serde_yaml::Value::Tagged(tagged) => Self::scalar(&tagged.value),
            _ => None,
        }
    }

    /// Flattens a YAML value into entries with dot notation keys.
    fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, result: &mut Vec<(String, String)>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    if let Some(key_str) = Self::scalar(key) {
                        Self::flatten_yaml(val, &Self::join(prefix, &key_str), result);
                    }
                }
            }
            serde_yaml::Value::Sequence(seq) => {
                let scalars: Option<Vec<String>> = seq.iter().map(Self::scalar).collect();
                match scalars {
                    Some(items) => result.push((prefix.to_string(), items.join(","))),
                    None => {
                        for (i, val) in seq.iter().enumerate() {
                            Self::flatten_yaml(val, &Self::join(prefix, &i.to_string()), result);
                        }
                    }
                }
            }
            serde_yaml::Value::Tagged(tagged) => Self::flatten_yaml(&tagged.value, prefix, result),
            other => {
                if let Some(s) = Self::scalar(other) {
                    result.push((prefix.to_string(), s));
                }
            }
        }
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<Vec<(String, String)>> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
                path: None,
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut result = Vec::new();
        match &value {
            // An empty document contributes nothing.
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(_) => Self::flatten_yaml(&value, "", &mut result),
            _ => {
                return Err(ConfigError::ParseError {
                    path: None,
                    message: "YAML document root must be a mapping".to_string(),
                    source: None,
                })
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
