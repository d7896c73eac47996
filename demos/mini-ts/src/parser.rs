//! Recursive descent parser for the TypeScript subset.
//!
//! Every node records its full start as the end of the token before its
//! first token, so the comments and blank lines in between belong to it.

use transkit::RecursionGuard;

use crate::lexer::{lex, Lexeme, Token};
use crate::syntax::{SyntaxKind, TsNode};
use crate::ParseError;

/// Nesting limit of statements and expressions.
pub const MAX_NESTING: usize = 128;

pub struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Lexeme>,
    pos: usize,
    depth: RecursionGuard,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: lex(source)?,
            pos: 0,
            depth: RecursionGuard::new(),
        })
    }

    pub fn parse_source_file(mut self) -> Result<TsNode, ParseError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.statement()?);
        }
        let start = self
            .tokens
            .first()
            .map_or(self.source.len(), |lexeme| lexeme.span.start);
        Ok(TsNode::new(
            SyntaxKind::SourceFile,
            0,
            start,
            self.source.len(),
            statements,
        ))
    }

    // token cursor

    #[inline]
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|lexeme| lexeme.token)
    }

    #[inline]
    fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: Token) -> bool {
        let found = self.at(token);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(token.describe()))
        }
    }

    fn unexpected(&self, expect: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(lexeme) => ParseError::Expected {
                expect,
                found: self.source[lexeme.span.clone()].to_string(),
                at: lexeme.span.start,
            },
            None => ParseError::Empty { expect },
        }
    }

    fn full_start_of(&self, first: usize) -> usize {
        first
            .checked_sub(1)
            .and_then(|previous| self.tokens.get(previous))
            .map_or(0, |lexeme| lexeme.span.end)
    }

    /// A node spanning the tokens from `first` up to the current position.
    fn node(&self, kind: SyntaxKind, first: usize, children: Vec<TsNode>) -> TsNode {
        let full_start = self.full_start_of(first);
        let start = self
            .tokens
            .get(first)
            .map_or(full_start, |lexeme| lexeme.span.start);
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map_or(start, |lexeme| lexeme.span.end);
        TsNode::new(kind, full_start, start, end.max(start), children)
    }

    fn leaf(&mut self, kind: SyntaxKind) -> TsNode {
        let first = self.pos;
        self.pos += 1;
        self.node(kind, first, Vec::new())
    }

    fn operator(&mut self, token: Token) -> TsNode {
        let first = self.pos;
        let full_start = self.full_start_of(first);
        let span = self.tokens[first].span.clone();
        self.pos += 1;
        TsNode::token(token, full_start, span.start, span.end)
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.depth.enter(MAX_NESTING)?;
        let result = parse(self);
        self.depth.exit();
        result
    }

    // statements

    fn statement(&mut self) -> Result<TsNode, ParseError> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        match self.peek() {
            None => Err(self.unexpected("statement")),
            Some(Token::Semicolon) => Ok(self.leaf(SyntaxKind::EmptyStatement)),
            Some(Token::LBrace) => self.block(),
            Some(Token::Const | Token::Let | Token::Var) => self.variable_statement(),
            Some(Token::If) => self.if_statement(),
            Some(Token::While) => self.while_statement(),
            Some(Token::Return) => self.return_statement(),
            Some(Token::Function) => self.function_declaration(),
            Some(_) => {
                let expression = self.expression()?;
                self.eat(Token::Semicolon);
                Ok(self.node(SyntaxKind::ExpressionStatement, first, vec![expression]))
            }
        }
    }

    fn block(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.eat(Token::RBrace) {
            statements.push(self.statement()?);
        }
        Ok(self.node(SyntaxKind::Block, first, statements))
    }

    fn variable_statement(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let mut declarations = Vec::new();
        loop {
            let declaration = self.pos;
            let mut children = vec![self.identifier()?];
            if self.eat(Token::Eq) {
                children.push(self.expression()?);
            }
            declarations.push(self.node(SyntaxKind::VariableDeclaration, declaration, children));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.eat(Token::Semicolon);
        Ok(self.node(SyntaxKind::VariableStatement, first, declarations))
    }

    fn if_statement(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let mut children = vec![self.condition()?, self.statement()?];
        if self.eat(Token::Else) {
            children.push(self.statement()?);
        }
        Ok(self.node(SyntaxKind::IfStatement, first, children))
    }

    fn while_statement(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let children = vec![self.condition()?, self.statement()?];
        Ok(self.node(SyntaxKind::WhileStatement, first, children))
    }

    fn condition(&mut self) -> Result<TsNode, ParseError> {
        self.expect(Token::LParen)?;
        let condition = self.expression()?;
        self.expect(Token::RParen)?;
        Ok(condition)
    }

    fn return_statement(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let mut children = Vec::new();
        if !self.at_end() && !self.at(Token::Semicolon) && !self.at(Token::RBrace) {
            children.push(self.expression()?);
        }
        self.eat(Token::Semicolon);
        Ok(self.node(SyntaxKind::ReturnStatement, first, children))
    }

    fn function_declaration(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let mut children = vec![self.identifier()?];
        self.expect(Token::LParen)?;
        while !self.eat(Token::RParen) {
            let parameter = self.pos;
            let name = self.identifier()?;
            children.push(self.node(SyntaxKind::Parameter, parameter, vec![name]));
            if !self.eat(Token::Comma) {
                self.expect(Token::RParen)?;
                break;
            }
        }
        children.push(self.block()?);
        Ok(self.node(SyntaxKind::FunctionDeclaration, first, children))
    }

    // expressions

    fn expression(&mut self) -> Result<TsNode, ParseError> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        let target = self.binary(1)?;
        if !self.at(Token::Eq) {
            return Ok(target);
        }
        let operator = self.operator(Token::Eq);
        let value = self.expression()?;
        Ok(self.node(
            SyntaxKind::BinaryExpression,
            first,
            vec![target, operator, value],
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<TsNode, ParseError> {
        let first = self.pos;
        let mut left = self.unary()?;
        while let Some(token) = self.peek() {
            let Some(precedence) = token.binary_precedence() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let operator = self.operator(token);
            let right = self.binary(precedence + 1)?;
            left = self.node(SyntaxKind::BinaryExpression, first, vec![left, operator, right]);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<TsNode, ParseError> {
        self.nested(|parser| match parser.peek() {
            Some(token @ (Token::Bang | Token::Minus)) => {
                let first = parser.pos;
                let operator = parser.operator(token);
                let operand = parser.unary()?;
                Ok(parser.node(
                    SyntaxKind::PrefixUnaryExpression,
                    first,
                    vec![operator, operand],
                ))
            }
            _ => parser.postfix(),
        })
    }

    fn postfix(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        let mut expression = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    let name = self.identifier()?;
                    expression = self.node(
                        SyntaxKind::PropertyAccessExpression,
                        first,
                        vec![expression, name],
                    );
                }
                Some(Token::LParen) => {
                    let mut children = vec![expression];
                    self.arguments(&mut children)?;
                    expression = self.node(SyntaxKind::CallExpression, first, children);
                }
                _ => return Ok(expression),
            }
        }
    }

    fn arguments(&mut self, into: &mut Vec<TsNode>) -> Result<(), ParseError> {
        self.list(Token::LParen, Token::RParen, |parser| {
            let argument = parser.expression()?;
            into.push(argument);
            Ok(())
        })
    }

    /// Parses `open item, item, ... close`, allowing a trailing comma.
    fn list(
        &mut self,
        open: Token,
        close: Token,
        mut item: impl FnMut(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        self.expect(open)?;
        while !self.eat(close) {
            item(self)?;
            if !self.eat(Token::Comma) {
                return self.expect(close);
            }
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        let kind = match self.peek() {
            None => return Err(self.unexpected("expression")),
            Some(Token::Ident) => SyntaxKind::Identifier,
            Some(Token::This) => SyntaxKind::ThisKeyword,
            Some(Token::Number) => SyntaxKind::NumericLiteral,
            Some(Token::String) => SyntaxKind::StringLiteral,
            Some(Token::True) => SyntaxKind::TrueKeyword,
            Some(Token::False) => SyntaxKind::FalseKeyword,
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                return Ok(self.node(SyntaxKind::ParenthesizedExpression, first, vec![inner]));
            }
            Some(Token::LBrace) => return self.object_literal(),
            Some(Token::LBracket) => {
                let mut elements = Vec::new();
                self.list(Token::LBracket, Token::RBracket, |parser| {
                    let element = parser.expression()?;
                    elements.push(element);
                    Ok(())
                })?;
                return Ok(self.node(SyntaxKind::ArrayLiteralExpression, first, elements));
            }
            Some(Token::New) => return self.new_expression(),
            Some(_) => return Err(self.unexpected("expression")),
        };
        Ok(self.leaf(kind))
    }

    fn object_literal(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        let mut properties = Vec::new();
        self.list(Token::LBrace, Token::RBrace, |parser| {
            let property = parser.pos;
            let key = match parser.peek() {
                Some(Token::Ident) => parser.leaf(SyntaxKind::Identifier),
                Some(Token::String) => parser.leaf(SyntaxKind::StringLiteral),
                _ => return Err(parser.unexpected("property name")),
            };
            parser.expect(Token::Colon)?;
            let value = parser.expression()?;
            properties.push(parser.node(SyntaxKind::PropertyAssignment, property, vec![key, value]));
            Ok(())
        })?;
        Ok(self.node(SyntaxKind::ObjectLiteralExpression, first, properties))
    }

    fn new_expression(&mut self) -> Result<TsNode, ParseError> {
        let first = self.pos;
        self.pos += 1;
        let callee_start = self.pos;
        let mut callee = self.identifier()?;
        while self.eat(Token::Dot) {
            let name = self.identifier()?;
            callee = self.node(
                SyntaxKind::PropertyAccessExpression,
                callee_start,
                vec![callee, name],
            );
        }
        let mut children = vec![callee];
        if self.at(Token::LParen) {
            self.arguments(&mut children)?;
        }
        Ok(self.node(SyntaxKind::NewExpression, first, children))
    }

    fn identifier(&mut self) -> Result<TsNode, ParseError> {
        if self.at(Token::Ident) {
            Ok(self.leaf(SyntaxKind::Identifier))
        } else {
            Err(self.unexpected("identifier"))
        }
    }
}
