//! A backend that prints the syntax tree itself.
//!
//! Every node renders through [`AstContext::not_implemented`], giving an
//! indented s-expression of kinds with the source text of the leaves, and
//! comments render as `(Comment ...)`. Useful for inspecting what a
//! front-end produced before writing a real backend.
//!
//! A front-end makes its tree printable by implementing its generated
//! handler trait for `VisualizeVisitor<Node>` without overriding anything:
//!
//! ```ignore
//! impl TsVisitor for VisualizeVisitor<TsNode> {}
//!
//! let text = transkit::visualize(source, &root)?;
//! ```

use core::marker::PhantomData;

use crate::dispatch::{AstContext, Dispatcher};
use crate::fragments;
use crate::otree::OTree;
use crate::traits::{Dispatch, SyntaxNode, Visitor};
use crate::trivia::TriviaSpan;
use crate::Error;

/// Prints nodes as `(Kind ...)` s-expressions.
#[derive(Debug)]
pub struct VisualizeVisitor<N> {
    _node: PhantomData<fn() -> N>,
}

impl<N> VisualizeVisitor<N> {
    pub const fn new() -> Self {
        Self { _node: PhantomData }
    }
}

impl<N> Default for VisualizeVisitor<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: SyntaxNode> Visitor for VisualizeVisitor<N> {
    type Node = N;
    type Context = ();

    fn default_context(&self) {}

    fn comment_range(&self, comment: &TriviaSpan, cx: &AstContext<'_, Self>) -> OTree {
        OTree::new(fragments!["(Comment ", cx.text_at(comment.start, comment.end)]).suffix(")\n")
    }

    fn fallback(&self, node: &N, cx: &AstContext<'_, Self>) -> Option<OTree> {
        Some(cx.not_implemented(node, None).attach_comment())
    }
}

/// Renders the tree rooted at `root` as an s-expression.
pub fn visualize<N>(source: &str, root: &N) -> Result<String, Error>
where
    N: SyntaxNode + Dispatch<VisualizeVisitor<N>>,
{
    let visitor = VisualizeVisitor::new();
    let result = Dispatcher::new(&visitor).translate(source, root)?;
    Ok(result.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::{parse, Node};

    impl Dispatch<VisualizeVisitor<Node>> for Node {
        fn dispatch(
            &self,
            _visitor: &VisualizeVisitor<Node>,
            _cx: &AstContext<'_, VisualizeVisitor<Node>>,
        ) -> Option<OTree> {
            None
        }
    }

    #[test]
    fn test_visualize_nested() {
        let src = "a (b {c})";
        let text = visualize(src, &parse(src)).unwrap();
        insta::assert_snapshot!(text, @r"
        (Root
          (Word a)
          (Group
            (Word b)
            (Opaque
              (Word c))))
        ");
    }

    #[test]
    fn test_visualize_comments_once() {
        let src = "// top\na";
        let text = visualize(src, &parse(src)).unwrap();
        insta::assert_snapshot!(text, @r"
        (Comment // top)
        (Root
          (Word a))
        ");
    }
}
