// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration resolution.
//!
//! This crate resolves an application's effective configuration by merging
//! key/value pairs from an ordered set of sources (bundled resources, local
//! files, environment-driven overrides, test overlays, developer overrides and
//! files named on the command line) into one flat mapping, then expanding the
//! `${name}` and `${name:default}` placeholders embedded in values.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: the merge store, the expression evaluator and the resolved result
//! - **Ports**: Trait definitions for collaborators (`ConfigParser`, `SourceReader`, `Environment`)
//! - **Adapters**: properties and YAML parsers, the filesystem reader, environments
//! - **Service**: the [`Loader`](service::Loader) that runs the phases in order
//!
//! # Precedence
//!
//! Later phases override earlier ones: bundled resources, then working
//! directory files, then `PROPS_FILE`, then `load.properties`, then the test
//! overlay. When the test overlay is present nothing else is loaded; otherwise
//! `~/.localdev/<app name>` overrides and `-P` files follow.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML document support (default)
//! - `cli`: Build the `layercfg` binary (default)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layercfg::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = Loader::builder().with_resource_dir("resources").build()?.load()?;
//!
//! let url = config.get_or("database.url", "postgres://localhost/app");
//! for reference in config.unresolved() {
//!     eprintln!("unresolved {}", reference);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Resolves configuration with every default collaborator.
///
/// Equivalent to `Loader::builder().build()?.load()`: resources are not
/// searched, files resolve against the process working directory, and the
/// process environment and arguments are used.
pub fn load() -> domain::Result<domain::ResolvedConfig> {
    service::Loader::builder().build()?.load()
}

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigError, ConfigStore, ResolvedConfig, Result, Source};
    pub use crate::ports::{ConfigParser, Environment, SourceReader};
    pub use crate::service::{Loader, LoaderBuilder};

    pub use crate::adapters::{
        CommandLineArgs, FileSystemReader, MapEnvironment, ProcessEnvironment, PropertiesParser,
    };
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlParser;
}
