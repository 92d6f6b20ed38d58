// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing collaborator implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: document parsers, the filesystem reader, and environments,
//! plus command-line scanning and local-dev directory discovery.

pub mod cli;
pub mod env_var;
pub mod fs_reader;
pub mod local_dev;
pub mod properties;
#[cfg(feature = "yaml")]
pub mod yaml;

// Re-export adapters based on feature flags
pub use cli::CommandLineArgs;
pub use env_var::{MapEnvironment, ProcessEnvironment};
pub use fs_reader::FileSystemReader;
pub use local_dev::default_local_dev_dir;
pub use properties::PropertiesParser;
#[cfg(feature = "yaml")]
pub use yaml::YamlParser;
