//! A type oracle that knows the types of literals and the expressions
//! built directly from them.

use transkit::{SyntaxNode, TypeOracle};

use crate::lexer::Token;
use crate::syntax::{SyntaxKind, TsNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsType {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralTypes;

impl TypeOracle<TsNode> for LiteralTypes {
    fn type_of_expression(&self, node: &TsNode) -> Option<TsType> {
        match node.kind() {
            SyntaxKind::StringLiteral => Some(TsType::String),
            SyntaxKind::NumericLiteral => Some(TsType::Number),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => Some(TsType::Boolean),
            SyntaxKind::ParenthesizedExpression => {
                node.child(0).and_then(|inner| self.type_of_expression(inner))
            }
            SyntaxKind::PrefixUnaryExpression => match node.child(0)?.operator()? {
                Token::Bang => Some(TsType::Boolean),
                Token::Minus => Some(TsType::Number),
                _ => None,
            },
            SyntaxKind::BinaryExpression => {
                let [left, operator, right] = node.child_nodes() else {
                    return None;
                };
                let operator = operator.operator()?;
                if operator.binary_precedence().is_some_and(|p| p <= 4) {
                    return Some(TsType::Boolean);
                }
                let types = (self.type_of_expression(left), self.type_of_expression(right));
                match (operator, types) {
                    (Token::Plus, (Some(TsType::String), _) | (_, Some(TsType::String))) => {
                        Some(TsType::String)
                    }
                    (Token::Eq, (_, right)) => right,
                    (_, (Some(TsType::Number), Some(TsType::Number))) => Some(TsType::Number),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// The subset has no type annotations.
    fn type_of_type(&self, _node: &TsNode) -> Option<TsType> {
        None
    }
}
