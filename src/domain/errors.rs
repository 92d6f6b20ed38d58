// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! Absence of a resource is never an error; everything in [`ConfigError`] aborts
//! a resolution run. All errors use `thiserror` for proper error handling and conversion.

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// It is marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::ConfigError;
///
/// let error = ConfigError::UnsupportedExtension {
///     path: "/etc/myapp/override.toml".to_string(),
/// };
/// assert!(error.to_string().contains("override.toml"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested configuration key is not present in the resolved configuration.
    #[error("Configuration key not found: {key}")]
    ConfigKeyNotFound {
        /// The key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source reader could not open or read a resource that exists.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the reader that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed properties or YAML content.
    #[error("Failed to parse {}: {message}", .path.as_deref().unwrap_or("configuration"))]
    ParseError {
        /// The resource or file that failed to parse, once known
        path: Option<String>,
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An explicitly configured path is neither yaml nor properties.
    #[error("Expecting only yaml or properties file but got [{path}]")]
    UnsupportedExtension {
        /// The offending path
        path: String,
    },

    /// A key's value refers back to itself, directly or through other keys.
    #[error("Expression cycle detected: {}", .chain.join(" -> "))]
    ExpressionCycle {
        /// The keys in resolution order, ending with the repeated key
        chain: Vec<String>,
    },

    /// A `${` marker without its closing `}`.
    #[error("Unterminated expression in '{key}': {value}")]
    UnterminatedExpression {
        /// The key (or path description) whose value was being evaluated
        key: String,
        /// The raw value
        value: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error reading {}: {source}", .path.display())]
    IoError {
        /// The path being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Attaches the originating path to a parse error that does not carry one yet.
    ///
    /// Parsers only see content; the loader knows where it came from.
    pub fn with_path(self, origin: &str) -> Self {
        match self {
            ConfigError::ParseError {
                path: None,
                message,
                source,
            } => ConfigError::ParseError {
                path: Some(origin.to_string()),
                message,
                source,
            },
            other => other,
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
