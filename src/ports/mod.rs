// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the traits at the collaborator seams of the resolution
//! engine: document parsers, source readers, and the environment. They are
//! implemented by adapters in the adapters layer.

pub mod environment;
pub mod parser;
pub mod reader;

// Re-export commonly used types
pub use environment::Environment;
pub use parser::ConfigParser;
pub use reader::SourceReader;
