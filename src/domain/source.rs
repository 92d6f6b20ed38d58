// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where a configuration read comes from.

use std::fmt;

/// Distinguishes bundled resources from external files.
///
/// The tag only changes how a reader locates the path; absence is a normal
/// outcome for both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// A resource shipped with the application (looked up in resource directories).
    Resource,
    /// A file on the local filesystem (relative paths resolve against the working directory).
    File,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Resource => write!(f, "resource"),
            Source::File => write!(f, "file"),
        }
    }
}
