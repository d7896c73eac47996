//! Engine of the transkit source-to-source translator.
//!
//! A front-end supplies a syntax tree ([`SyntaxNode`]); a backend supplies
//! per-kind handlers ([`Visitor`] plus a generated handler trait). The
//! [`Dispatcher`] walks the tree, hands each node to its handler with an
//! [`AstContext`], attaches leading comments to the output handlers build
//! ([`OTree`]), and the [`RenderSink`] prints that output with lazy
//! indentation and render-once deduplication.
//!
//! Translation is total: syntax no handler understands is emitted verbatim
//! (or as a visible placeholder) and reported in the [`Diagnostics`].

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod dispatch;
mod error;
pub mod layout;
pub mod otree;
pub mod sink;
pub mod traits;
pub mod trivia;
pub mod visualize;

pub use config::{RecursionGuard, RenderStrategy, TranslateConfig, UnknownNodePolicy};
pub use context::{ContextGuard, ContextStack};
pub use diagnostics::{Diagnostic, Diagnostics, LineIndex, Severity};
pub use dispatch::{translate, AstContext, Dispatcher, TranslateResult, TranslateStats};
pub use error::Error;
pub use layout::{
    blank_line_separator, convert_children_with_newlines, join_with_blank_lines,
    preserve_separating_newlines, ChildrenOptions,
};
pub use otree::{Fragment, OTree, TreeOptions};
pub use sink::{render_tree, render_tree_with, IndentRestore, Mark, RenderSink};
pub use traits::{Dispatch, NoTypeOracle, SyntaxNode, TypeOracle, Visitor};
pub use trivia::{count_naked_newlines, scan, TriviaKind, TriviaSpan};
pub use visualize::{visualize, VisualizeVisitor};
