// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source reader trait definition.
//!
//! A `SourceReader` opens a named resource or file as a byte stream. It is the
//! only way the loader touches storage.

use crate::domain::{Result, Source};
use std::io::Read;

/// A trait for opening configuration resources and files.
///
/// # Absence
///
/// A path that does not exist is a normal outcome and must be reported as
/// `Ok(None)`. Errors are reserved for things that exist but cannot be read.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::{Result, Source};
/// use layercfg::ports::SourceReader;
/// use std::io::{Cursor, Read};
///
/// struct Bundled;
///
/// impl SourceReader for Bundled {
///     fn name(&self) -> &str {
///         "bundled"
///     }
///
///     fn open(&self, path: &str, source: Source) -> Result<Option<Box<dyn Read>>> {
///         match (source, path) {
///             (Source::Resource, "application.properties") => {
///                 Ok(Some(Box::new(Cursor::new("app.name=demo"))))
///             }
///             _ => Ok(None),
///         }
///     }
/// }
///
/// assert!(Bundled.open("application.properties", Source::Resource).unwrap().is_some());
/// assert!(Bundled.open("application.properties", Source::File).unwrap().is_none());
/// ```
pub trait SourceReader: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Opens `path` from the given source.
    ///
    /// The returned stream is owned by the caller and closed when dropped.
    fn open(&self, path: &str, source: Source) -> Result<Option<Box<dyn Read>>>;
}
