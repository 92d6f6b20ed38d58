// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location of local developer override files.
//!
//! Developers keep per-application overrides in `~/.localdev/<app name>.yaml`
//! or `.properties`; they apply only outside test runs.

use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Directory name under the user's home directory.
pub const LOCAL_DEV_DIR_NAME: &str = ".localdev";

/// Returns `~/.localdev`, or `None` when no home directory can be determined.
pub fn default_local_dev_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(LOCAL_DEV_DIR_NAME))
}

/// Candidate override files for `app_name`, in load order (yaml, then properties).
pub fn local_dev_files(dir: &Path, app_name: &str) -> [PathBuf; 2] {
    [
        dir.join(format!("{}.yaml", app_name)),
        dir.join(format!("{}.properties", app_name)),
    ]
}
