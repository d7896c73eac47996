use crate::dispatch::AstContext;
use crate::fragments;
use crate::otree::OTree;
use crate::traits::SyntaxNode;
use crate::trivia::{TriviaKind, TriviaSpan};

/// A translation backend.
///
/// Per-kind handlers live on a language specific trait generated by
/// `declare_visitor!`, which has `Visitor` as its supertrait. This trait
/// carries what the engine needs regardless of the source language.
pub trait Visitor: Sized {
    type Node: SyntaxNode;

    /// Context threaded down the tree by the context stack.
    type Context: Clone;

    /// Context at the root of a translation.
    fn default_context(&self) -> Self::Context;

    /// Combines the current context with an update from a parent handler.
    ///
    /// Must be associative. The default lets the update replace the old
    /// context.
    fn merge_context(&self, old: &Self::Context, update: Self::Context) -> Self::Context {
        let _ = old;
        update
    }

    /// Renders a comment attached to a node.
    ///
    /// The default keeps the comment verbatim, followed by a line break for
    /// line comments and comments that ended their line in the source.
    fn comment_range(&self, comment: &TriviaSpan, cx: &AstContext<'_, Self>) -> OTree {
        let text = cx.text_at(comment.start, comment.end);
        let tail = if comment.kind == TriviaKind::LineComment || comment.has_trailing_blank_line {
            "\n"
        } else {
            " "
        };
        OTree::new(fragments![text, tail])
    }

    /// Handler used for kinds this visitor does not handle.
    ///
    /// `None` leaves the node to the configured
    /// [`UnknownNodePolicy`](crate::UnknownNodePolicy).
    fn fallback(&self, node: &Self::Node, cx: &AstContext<'_, Self>) -> Option<OTree> {
        let _ = (node, cx);
        None
    }
}

/// Maps a node's kind to the matching handler of visitor `V`.
///
/// `None` means no handler claims the node.
pub trait Dispatch<V>: SyntaxNode
where
    V: Visitor<Node = Self>,
{
    fn dispatch(&self, visitor: &V, cx: &AstContext<'_, V>) -> Option<OTree>;
}
