// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the resolution engine.
//!
//! The [`Loader`] drives the phase order, reading documents through the ports
//! and merging them into a [`ConfigStore`](crate::domain::ConfigStore).

pub mod loader;

// Re-export commonly used types
pub use loader::{Loader, LoaderBuilder};
