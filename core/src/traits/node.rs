use core::fmt;
use core::ops::Range;
use std::borrow::Cow;

/// A node of a front-end's syntax tree.
///
/// The engine only reads nodes. Cloning should be cheap (a shared pointer or
/// a small handle) because [`SyntaxNode::children`] hands out owned nodes.
///
/// Offsets are byte offsets into the source text handed to the dispatcher.
pub trait SyntaxNode: Clone {
    /// Closed set of node kinds the front-end produces.
    type Kind: Copy + Eq + fmt::Debug;

    /// What a [`TypeOracle`] answers about this tree.
    type Type;

    fn kind(&self) -> Self::Kind;

    /// Human readable kind name used in diagnostics and placeholders.
    fn kind_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{:?}", self.kind()))
    }

    /// Direct children in source order.
    fn children(&self) -> Vec<Self>;

    /// Start of the node including its leading trivia.
    fn full_start(&self) -> usize;

    /// Start of the node's first token.
    fn start(&self) -> usize;

    /// End of the node's last token.
    fn end(&self) -> usize;

    #[inline]
    fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Semantic queries a backend may need (types of expressions and of type
/// annotations). Purely optional: [`NoTypeOracle`] answers nothing.
pub trait TypeOracle<N: SyntaxNode> {
    fn type_of_expression(&self, node: &N) -> Option<N::Type>;

    fn type_of_type(&self, node: &N) -> Option<N::Type>;
}

/// A [`TypeOracle`] without type information.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypeOracle;

impl<N: SyntaxNode> TypeOracle<N> for NoTypeOracle {
    #[inline]
    fn type_of_expression(&self, _node: &N) -> Option<N::Type> {
        None
    }

    #[inline]
    fn type_of_type(&self, _node: &N) -> Option<N::Type> {
        None
    }
}
