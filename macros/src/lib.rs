#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Procedural macros for the transkit translation engine.
//!
//! - [`declare_visitor!`]: Generates a front-end's handler trait and the
//!   kind-to-handler dispatch for its syntax tree
//!
//! # Quick Start
//!
//! ```ignore
//! use transkit::declare_visitor;
//!
//! declare_visitor! {
//!     node: TsNode,
//!     kind: SyntaxKind,
//!     pub trait TsVisitor {
//!         SourceFile,
//!         CallExpression => call,
//!     }
//! }
//! ```
use proc_macro::TokenStream;
use syn::parse_macro_input;

mod declare_visitor;

/// Generates a per-language handler trait and its [`Dispatch`] impl.
///
/// # Syntax
///
/// ```ignore
/// declare_visitor! {
///     // Optional: path to the transkit crate (default `::transkit`)
///     path: ::transkit,
///
///     // Required: the front-end's node type (implements `SyntaxNode`)
///     node: TsNode,
///
///     // Required: the node's kind enum (`SyntaxNode::Kind`)
///     kind: SyntaxKind,
///
///     // Required: the handler trait, one entry per handled kind
///     /// Doc comments and attributes are kept.
///     pub trait TsVisitor {
///         // Method name derived from the variant: `source_file`
///         SourceFile,
///         // Explicit method name
///         CallExpression => call,
///     },
/// }
/// ```
///
/// # Generated Code
///
/// - `pub trait TsVisitor: Visitor<Node = TsNode>` with one
///   `fn kind(&self, node: &TsNode, cx: &AstContext<'_, Self>) -> Option<OTree>`
///   per entry, each defaulting to `None`
/// - `impl<V: TsVisitor> Dispatch<V> for TsNode`, matching the node's kind to
///   the handler; kinds without an entry dispatch to `None`
///
/// A backend implements the trait and overrides only the kinds it handles.
/// Everything else falls through to `Visitor::fallback` and then to the
/// configured unknown-node policy.
///
/// [`Dispatch`]: https://docs.rs/transkit/latest/transkit/trait.Dispatch.html
#[proc_macro]
pub fn declare_visitor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as declare_visitor::DeclareVisitorInput);
    declare_visitor::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
