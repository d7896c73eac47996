//! Tokens of the TypeScript subset.
//!
//! Comments are real tokens here so that they are checked for termination,
//! but [`lex`] drops them: the translation engine recovers them from the
//! source text between nodes.

use core::fmt;
use core::ops::Range;

use logos::Logos;

use crate::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", allow_greedy = true)]
    BlockComment,

    // Keywords
    #[token("const")]
    Const,

    #[token("let")]
    Let,

    #[token("var")]
    Var,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("return")]
    Return,

    #[token("function")]
    Function,

    #[token("new")]
    New,

    #[token("this")]
    This,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Literals
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    String,

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    // Operators
    #[token("=")]
    Eq,

    #[token("==")]
    EqEq,

    #[token("===")]
    EqEqEq,

    #[token("!=")]
    NotEq,

    #[token("!==")]
    NotEqEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,
}

impl Token {
    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment)
    }

    /// Binding power of a binary operator; higher binds tighter.
    pub const fn binary_precedence(self) -> Option<u8> {
        Some(match self {
            Token::OrOr => 1,
            Token::AndAnd => 2,
            Token::EqEq | Token::EqEqEq | Token::NotEq | Token::NotEqEq => 3,
            Token::Lt | Token::Gt | Token::Le | Token::Ge => 4,
            Token::Plus | Token::Minus => 5,
            Token::Star | Token::Slash | Token::Percent => 6,
            _ => return None,
        })
    }
}

impl Token {
    /// How the token is named in parse errors.
    pub const fn describe(self) -> &'static str {
        match self {
            Token::LineComment | Token::BlockComment => "comment",
            Token::Const => "`const`",
            Token::Let => "`let`",
            Token::Var => "`var`",
            Token::If => "`if`",
            Token::Else => "`else`",
            Token::While => "`while`",
            Token::Return => "`return`",
            Token::Function => "`function`",
            Token::New => "`new`",
            Token::This => "`this`",
            Token::True => "`true`",
            Token::False => "`false`",
            Token::Ident => "identifier",
            Token::Number => "number",
            Token::String => "string",
            Token::LParen => "`(`",
            Token::RParen => "`)`",
            Token::LBrace => "`{`",
            Token::RBrace => "`}`",
            Token::LBracket => "`[`",
            Token::RBracket => "`]`",
            Token::Comma => "`,`",
            Token::Semicolon => "`;`",
            Token::Colon => "`:`",
            Token::Dot => "`.`",
            Token::Eq => "`=`",
            Token::EqEq => "`==`",
            Token::EqEqEq => "`===`",
            Token::NotEq => "`!=`",
            Token::NotEqEq => "`!==`",
            Token::Lt => "`<`",
            Token::Gt => "`>`",
            Token::Le => "`<=`",
            Token::Ge => "`>=`",
            Token::Plus => "`+`",
            Token::Minus => "`-`",
            Token::Star => "`*`",
            Token::Slash => "`/`",
            Token::Percent => "`%`",
            Token::Bang => "`!`",
            Token::AndAnd => "`&&`",
            Token::OrOr => "`||`",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A significant token and its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Lexes `source`, dropping comments.
pub fn lex(source: &str) -> Result<Vec<Lexeme>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) if token.is_comment() => {}
            Ok(token) => lexemes.push(Lexeme { token, span }),
            Err(()) => return Err(ParseError::InvalidToken { span }),
        }
    }
    tracing::trace!(tokens = lexemes.len(), "lexed");
    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn test_comments_dropped() {
        assert_eq!(
            tokens("a /* b\n * c */ // d\n;"),
            vec![Token::Ident, Token::Semicolon]
        );
    }

    #[test_case::test_case("===", Token::EqEqEq; "strict equality")]
    #[test_case::test_case("!==", Token::NotEqEq; "strict inequality")]
    #[test_case::test_case("constant", Token::Ident; "keyword prefix")]
    #[test_case::test_case("'it''s'", Token::String; "single quoted")]
    #[test_case::test_case("3.25", Token::Number; "decimal")]
    fn test_longest_match(source: &str, expected: Token) {
        assert_eq!(tokens(source)[0], expected);
    }

    #[test]
    fn test_spans() {
        let lexemes = lex("  foo(1)").unwrap();
        assert_eq!(lexemes[0].span, 2..5);
        assert_eq!(lexemes[3].span, 7..8);
    }

    #[test]
    fn test_unterminated_block_comment_lexes_as_operators() {
        assert_eq!(
            tokens("/* x"),
            vec![Token::Slash, Token::Star, Token::Ident]
        );
    }

    #[test]
    fn test_unknown_character_is_error() {
        assert_eq!(lex("a # b"), Err(ParseError::InvalidToken { span: 2..3 }));
    }
}
