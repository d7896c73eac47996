//! Translation configuration and recursion tracking.
//!
//! [`TranslateConfig`] selects how the dispatcher treats node kinds no
//! handler claims, how deep conversion may nest before a subtree degrades to
//! verbatim text, and which strategy renders the final output tree.
//!
//! # Recursion Limits
//!
//! Deeply nested syntax (`((((((...))))))`) makes every handler recurse once
//! per level. The dispatcher counts nested conversions with a
//! [`RecursionGuard`]; past the limit the subtree is emitted as its source
//! text and an error diagnostic is recorded, so a hostile input cannot blow
//! the stack.
//!
//! # Example
//!
//! ```ignore
//! use transkit_core::config::{TranslateConfig, UnknownNodePolicy};
//!
//! // Best effort, depth 256, recursive rendering
//! let config = TranslateConfig::default();
//!
//! // Placeholders for unknown syntax, deeper nesting allowed
//! let config = TranslateConfig::new()
//!     .with_unknown_nodes(UnknownNodePolicy::Strict)
//!     .with_max_recursion_depth(1024);
//! ```

use crate::Error;

/// What the dispatcher emits for a node kind no handler claims.
///
/// Either way the node is reported through
/// [`AstContext::report_unsupported`](crate::AstContext::report_unsupported).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum UnknownNodePolicy {
    /// Emit the node's source text verbatim.
    #[default]
    BestEffort,
    /// Emit a visible `<Kind text>` placeholder whose children are still
    /// converted, so that the surrounding output stays inspectable.
    Strict,
}

/// How an [`OTree`](crate::OTree) is walked when it is written to a
/// [`RenderSink`](crate::RenderSink).
///
/// Both strategies produce byte-identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum RenderStrategy {
    /// Plain recursion over nested trees.
    #[default]
    Recursive,
    /// Explicit frame stack, for output trees nested deeper than the thread's
    /// stack allows.
    WorkList,
}

/// Configuration for a translation run.
///
/// # Default Values
///
/// | Setting | Default |
/// |---------|---------|
/// | `unknown_nodes` | [`UnknownNodePolicy::BestEffort`] |
/// | `max_recursion_depth` | 256 |
/// | `render_strategy` | [`RenderStrategy::Recursive`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct TranslateConfig {
    /// Output for node kinds without a handler.
    pub unknown_nodes: UnknownNodePolicy,

    /// Maximum nesting of `convert` calls.
    ///
    /// A node converted at a deeper level is emitted verbatim and reported
    /// with the message of [`Error::RecursionLimitExceeded`].
    pub max_recursion_depth: usize,

    /// Strategy used by [`TranslateResult::render`](crate::TranslateResult::render).
    pub render_strategy: RenderStrategy,
}

impl Default for TranslateConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TranslateConfig {
    /// Default configuration, usable in const contexts.
    pub const DEFAULT: Self = Self {
        unknown_nodes: UnknownNodePolicy::BestEffort,
        max_recursion_depth: 256,
        render_strategy: RenderStrategy::Recursive,
    };

    /// Creates a new configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the policy for node kinds without a handler.
    #[inline]
    pub const fn with_unknown_nodes(mut self, policy: UnknownNodePolicy) -> Self {
        self.unknown_nodes = policy;
        self
    }

    /// Shorthand for `with_unknown_nodes(UnknownNodePolicy::Strict)`.
    #[inline]
    pub const fn strict(self) -> Self {
        self.with_unknown_nodes(UnknownNodePolicy::Strict)
    }

    /// Sets the maximum conversion depth.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum nesting level. Use `usize::MAX` to disable the limit.
    #[inline]
    pub const fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Sets the render strategy.
    #[inline]
    pub const fn with_render_strategy(mut self, strategy: RenderStrategy) -> Self {
        self.render_strategy = strategy;
        self
    }

    /// Disables the recursion limit.
    ///
    /// # Warning
    ///
    /// Only use this for trusted input! A deeply nested tree can then
    /// overflow the stack.
    #[inline]
    pub const fn disable_recursion_limit(self) -> Self {
        self.with_max_recursion_depth(usize::MAX)
    }
}

/// Tracks recursion depth during conversion.
///
/// A lightweight counter paired with
/// [`TranslateConfig::max_recursion_depth`]. The dispatcher keeps one per
/// translation run.
///
/// # Example
///
/// ```ignore
/// let mut depth = RecursionGuard::new();
/// depth.enter(config.max_recursion_depth)?;
/// // ... convert nested content ...
/// depth.exit();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursionGuard {
    /// Current recursion depth.
    depth: usize,
}

impl RecursionGuard {
    /// Creates a new guard with depth 0.
    #[inline]
    pub const fn new() -> Self {
        Self { depth: 0 }
    }

    /// Current recursion depth.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a nested conversion, incrementing depth.
    ///
    /// Returns `Err(Error::RecursionLimitExceeded)` if the new depth would
    /// exceed the limit.
    #[inline]
    pub fn enter(&mut self, limit: usize) -> Result<(), Error> {
        self.depth = self.depth.saturating_add(1);
        if self.depth > limit {
            Err(Error::RecursionLimitExceeded {
                depth: self.depth,
                limit,
            })
        } else {
            Ok(())
        }
    }

    /// Exit a nested conversion, decrementing depth.
    ///
    /// Uses saturating subtraction so extra `exit()` calls don't underflow.
    #[inline]
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
