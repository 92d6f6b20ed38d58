// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which turns the content of one
//! configuration document into flat key/value entries.

use crate::domain::Result;

/// A trait for parsing configuration documents.
///
/// Implementations convert raw content into a flat list of entries, in document
/// order. When a key repeats, later entries win once they reach the store.
///
/// # Key Format
///
/// Parsers should flatten nested structures using dot notation. For example,
/// a YAML structure like:
///
/// ```yaml
/// database:
///   host: localhost
///   port: 5432
/// ```
///
/// Should be parsed into:
/// - `database.host` -> `"localhost"`
/// - `database.port` -> `"5432"`
///
/// Parse failures are reported as [`crate::domain::ConfigError::ParseError`]
/// without a path; the loader attaches the origin.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::ConfigParser;
/// use layercfg::domain::Result;
///
/// struct PairParser;
///
/// impl ConfigParser for PairParser {
///     fn parse(&self, content: &str) -> Result<Vec<(String, String)>> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once('='))
///             .map(|(k, v)| (k.to_string(), v.to_string()))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["pairs"]
///     }
/// }
///
/// let entries = PairParser.parse("a=1\nb=2").unwrap();
/// assert_eq!(entries.len(), 2);
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into flat key/value entries.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<(String, String)>)` - The entries in document order
    /// * `Err(ConfigError)` - The content is malformed
    fn parse(&self, content: &str) -> Result<Vec<(String, String)>>;

    /// Returns the file extensions (without the leading dot) handled by this parser.
    fn supported_extensions(&self) -> &[&str];

    /// Returns `true` if `extension` (without the dot) is handled by this parser.
    fn supports(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
