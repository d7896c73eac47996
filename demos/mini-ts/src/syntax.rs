//! The syntax tree produced by the parser.

use std::rc::Rc;

use transkit::{SyntaxNode, VisualizeVisitor};

use crate::lexer::Token;
use crate::types::TsType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    Block,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    ReturnStatement,
    FunctionDeclaration,
    Parameter,
    CallExpression,
    NewExpression,
    PropertyAccessExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    ArrayLiteralExpression,
    BinaryExpression,
    PrefixUnaryExpression,
    ParenthesizedExpression,
    Identifier,
    ThisKeyword,
    StringLiteral,
    NumericLiteral,
    TrueKeyword,
    FalseKeyword,
    EmptyStatement,
    /// Operator of a binary or prefix expression.
    Token,
}

#[derive(Debug)]
struct NodeData {
    kind: SyntaxKind,
    token: Option<Token>,
    full_start: usize,
    start: usize,
    end: usize,
    children: Vec<TsNode>,
}

/// A node of the syntax tree. Clones share the node.
#[derive(Debug, Clone)]
pub struct TsNode(Rc<NodeData>);

impl TsNode {
    pub fn new(
        kind: SyntaxKind,
        full_start: usize,
        start: usize,
        end: usize,
        children: Vec<TsNode>,
    ) -> Self {
        Self(Rc::new(NodeData {
            kind,
            token: None,
            full_start,
            start,
            end,
            children,
        }))
    }

    /// A [`SyntaxKind::Token`] node for an operator.
    pub fn token(token: Token, full_start: usize, start: usize, end: usize) -> Self {
        Self(Rc::new(NodeData {
            kind: SyntaxKind::Token,
            token: Some(token),
            full_start,
            start,
            end,
            children: Vec::new(),
        }))
    }

    /// The operator of a [`SyntaxKind::Token`] node.
    #[inline]
    pub fn operator(&self) -> Option<Token> {
        self.0.token
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&TsNode> {
        self.0.children.get(index)
    }

    #[inline]
    pub fn child_nodes(&self) -> &[TsNode] {
        &self.0.children
    }

    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.0.kind == kind
    }
}

impl SyntaxNode for TsNode {
    type Kind = SyntaxKind;
    type Type = TsType;

    fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.clone()
    }

    fn full_start(&self) -> usize {
        self.0.full_start
    }

    fn start(&self) -> usize {
        self.0.start
    }

    fn end(&self) -> usize {
        self.0.end
    }
}

transkit::declare_visitor! {
    node: TsNode,
    kind: SyntaxKind,
    /// Per-kind handlers of a backend for the TypeScript subset.
    pub trait TsVisitor {
        SourceFile,
        Block,
        ExpressionStatement,
        VariableStatement,
        VariableDeclaration,
        IfStatement,
        WhileStatement,
        ReturnStatement,
        FunctionDeclaration,
        Parameter,
        CallExpression,
        NewExpression,
        PropertyAccessExpression,
        ObjectLiteralExpression,
        PropertyAssignment,
        ArrayLiteralExpression,
        BinaryExpression,
        PrefixUnaryExpression,
        ParenthesizedExpression,
        Identifier,
        ThisKeyword,
        StringLiteral,
        NumericLiteral,
        TrueKeyword,
        FalseKeyword,
        EmptyStatement,
        Token => operator,
    }
}

impl TsVisitor for VisualizeVisitor<TsNode> {}
