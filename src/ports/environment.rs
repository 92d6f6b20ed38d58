// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to process-level variables.

/// Lookup of environment variables.
///
/// Consulted for the override-file variable, the pod metadata seed, and as the
/// fallback tier of expression evaluation.
pub trait Environment: Send + Sync {
    /// Returns the value of `name`, or `None` if unset or not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}
