// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the merge store and the expression evaluator.
//!
//! Nothing here touches the filesystem or the process; collaborators reach the
//! domain through the traits in [`crate::ports`].

pub mod errors;
pub mod expression;
pub mod resolved;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use errors::{ConfigError, Result};
pub use expression::ExpressionEvaluator;
pub use resolved::{ResolvedConfig, UnresolvedReference};
pub use source::Source;
pub use store::ConfigStore;
