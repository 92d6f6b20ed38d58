// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-backed source reader.
//!
//! Bundled resources are looked up in an ordered list of resource directories;
//! external files are resolved against a working directory.

use crate::domain::{ConfigError, Result, Source};
use crate::ports::SourceReader;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Maximum allowed file size for configuration files (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

const READER_NAME: &str = "filesystem";

/// Reads resources and files from the local filesystem.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::adapters::FileSystemReader;
/// use layercfg::domain::Source;
/// use layercfg::ports::SourceReader;
///
/// let reader = FileSystemReader::new()
///     .with_resource_dir("resources")
///     .with_working_dir("/srv/myapp");
///
/// // resources/application.properties, if present
/// let bundled = reader.open("application.properties", Source::Resource).unwrap();
/// // /srv/myapp/application.properties, if present
/// let external = reader.open("application.properties", Source::File).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileSystemReader {
    resource_dirs: Vec<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl FileSystemReader {
    /// Creates a reader with no resource directories, resolving files against
    /// the process working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource directory. Earlier directories win.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dirs.push(dir.into());
        self
    }

    /// Resolves relative file paths against `dir` instead of the process working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn locate(&self, path: &str, source: Source) -> Option<PathBuf> {
        match source {
            Source::Resource => {
                let relative = path.trim_start_matches('/');
                self.resource_dirs
                    .iter()
                    .map(|dir| dir.join(relative))
                    .find(|candidate| candidate.is_file())
            }
            Source::File => {
                let candidate = match &self.working_dir {
                    Some(dir) => dir.join(path),
                    None => PathBuf::from(path),
                };
                candidate.is_file().then_some(candidate)
            }
        }
    }

    fn open_file(path: &Path) -> Result<File> {
        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: READER_NAME.to_string(),
                message: format!(
                    "Configuration file too large: {} ({} bytes, max {} bytes)",
                    path.display(),
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                ),
                source: None,
            });
        }

        File::open(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl SourceReader for FileSystemReader {
    fn name(&self) -> &str {
        READER_NAME
    }

    fn open(&self, path: &str, source: Source) -> Result<Option<Box<dyn Read>>> {
        let Some(located) = self.locate(path, source) else {
            return Ok(None);
        };

        match Self::open_file(&located) {
            Ok(file) => {
                tracing::debug!("Opened {} {}", source, located.display());
                Ok(Some(Box::new(BufReader::new(file))))
            }
            // Removed between the existence check and the open.
            Err(ConfigError::IoError { source: e, .. }) if e.kind() == ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
