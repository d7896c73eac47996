//! Core error types for transkit.
//!
//! Translation itself is total: unsupported syntax becomes a
//! [`Diagnostic`](crate::Diagnostic), never an `Err`. The variants here are
//! reserved for broken engine invariants and resource limits.
//!
//! Front-end error types (parse errors and the like) should implement
//! `From<transkit::Error>` so a whole pipeline can use `?`.

use core::fmt;

/// Core transkit error type.
///
/// # Example
///
/// ```ignore
/// use thiserror::Error;
///
/// #[derive(Error, Debug)]
/// pub enum PipelineError {
///     #[error("parse failed at {offset}")]
///     Parse { offset: usize },
///
///     #[error(transparent)]
///     Translate(#[from] transkit::Error),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The context stack depth after a traversal differs from the depth
    /// before it.
    ///
    /// Every `convert` call that pushes a context must pop exactly that
    /// context again, so this indicates a bug in a handler or in the engine.
    ContextImbalance {
        /// Depth recorded before the traversal started.
        expected: usize,
        /// Depth observed after the traversal finished.
        found: usize,
    },

    /// Recursion limit exceeded while converting nested nodes.
    ///
    /// The dispatcher does not surface this as an `Err`; it degrades the
    /// offending subtree to verbatim text and records an error diagnostic
    /// carrying this message.
    RecursionLimitExceeded {
        /// Current recursion depth when limit was exceeded.
        depth: usize,
        /// Maximum allowed recursion depth.
        limit: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextImbalance { expected, found } => {
                write!(
                    f,
                    "context stack imbalance: expected depth {} after traversal, found {}",
                    expected, found
                )
            }
            Error::RecursionLimitExceeded { depth, limit } => {
                write!(
                    f,
                    "recursion limit exceeded: depth {} > limit {}",
                    depth, limit
                )
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_context_imbalance() {
        let err = Error::ContextImbalance {
            expected: 1,
            found: 3,
        };
        insta::assert_snapshot!(err.to_string(), @"context stack imbalance: expected depth 1 after traversal, found 3");
    }

    #[test]
    fn test_display_recursion_limit() {
        let err = Error::RecursionLimitExceeded {
            depth: 257,
            limit: 256,
        };
        insta::assert_snapshot!(err.to_string(), @"recursion limit exceeded: depth 257 > limit 256");
    }
}
