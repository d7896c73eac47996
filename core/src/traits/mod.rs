//! Core traits for the transkit translation engine.
//!
//! Front-ends describe their syntax trees through [`SyntaxNode`], backends
//! describe their output through [`Visitor`], and [`Dispatch`] connects the
//! two by mapping each node kind to a handler.
//!
//! # Trait Hierarchy
//!
//! ```text
//! SyntaxNode (front-end tree)
//!     └── Dispatch<V> (kind -> handler, usually generated by `declare_visitor!`)
//!
//! Visitor (backend)
//!     ├── per-language handler trait (generated, one method per kind)
//!     └── fallback / comment_range / context merging
//!
//! TypeOracle<N> (optional semantic queries)
//! ```
//!
//! # Usage Patterns
//!
//! ```ignore
//! declare_visitor! {
//!     node: TsNode,
//!     kind: SyntaxKind,
//!     pub trait TsVisitor {
//!         Identifier => identifier,
//!         CallExpression => call_expression,
//!     }
//! }
//!
//! impl TsVisitor for PythonVisitor {
//!     fn identifier(&self, node: &TsNode, cx: &AstContext<'_, Self>) -> Option<OTree> {
//!         Some(OTree::text(snake_case(cx.text_of(node))))
//!     }
//! }
//! ```

mod node;
mod visitor;

pub use node::{NoTypeOracle, SyntaxNode, TypeOracle};
pub use visitor::{Dispatch, Visitor};
