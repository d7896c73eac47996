//! A small call language shared by the integration tests.
//!
//! Programs are `;`-terminated expressions: calls `name(arg, ...)`,
//! identifiers, numbers and double-quoted strings, with `//` and `/* */`
//! comments anywhere between tokens.
#![allow(dead_code)]

use std::rc::Rc;

use thiserror::Error;
use transkit::trivia::skip_trivia;
use transkit::SyntaxNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Program,
    Call,
    Ident,
    Number,
    Str,
}

#[derive(Debug)]
struct NodeData {
    kind: Kind,
    full_start: usize,
    start: usize,
    end: usize,
    children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Node(Rc<NodeData>);

impl SyntaxNode for Node {
    type Kind = Kind;
    type Type = ();

    fn kind(&self) -> Kind {
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

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected {found:?} at {at}")]
    Unexpected { found: char, at: usize },

    #[error("expected {expect}, found EOF")]
    Eof { expect: &'static str },
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip(&mut self) -> usize {
        self.pos = skip_trivia(self.src, self.pos);
        self.pos
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        self.skip();
        match self.peek() {
            Some(found) if found == c => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(ParseError::Unexpected {
                found,
                at: self.pos,
            }),
            None => Err(ParseError::Eof { expect: "punctuation" }),
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) {
        let len = self.src[self.pos..]
            .find(|c: char| !f(c))
            .unwrap_or(self.src.len() - self.pos);
        self.pos += len;
    }

    /// Parses an expression whose leading trivia starts at `full_start`.
    fn expr(&mut self, full_start: usize) -> Result<Node, ParseError> {
        let start = self.skip();
        let Some(first) = self.peek() else {
            return Err(ParseError::Eof { expect: "expression" });
        };
        if first.is_ascii_digit() {
            self.take_while(|c| c.is_ascii_digit());
            return Ok(node(Kind::Number, full_start, start, self.pos, Vec::new()));
        }
        if first == '"' {
            self.pos += 1;
            self.take_while(|c| c != '"');
            self.expect('"')?;
            return Ok(node(Kind::Str, full_start, start, self.pos, Vec::new()));
        }
        if !first.is_alphabetic() {
            return Err(ParseError::Unexpected {
                found: first,
                at: start,
            });
        }

        self.take_while(|c| c.is_alphanumeric() || c == '_');
        let name = node(Kind::Ident, full_start, start, self.pos, Vec::new());
        if self.peek() != Some('(') {
            return Ok(name);
        }
        self.pos += 1;

        let mut children = vec![name];
        loop {
            let full_start = self.pos;
            self.skip();
            if self.peek() == Some(')') {
                self.pos += 1;
                break;
            }
            children.push(self.expr(full_start)?);
            self.skip();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
        Ok(node(Kind::Call, full_start, start, self.pos, children))
    }
}

fn node(kind: Kind, full_start: usize, start: usize, end: usize, children: Vec<Node>) -> Node {
    Node(Rc::new(NodeData {
        kind,
        full_start,
        start,
        end,
        children,
    }))
}

pub fn parse(src: &str) -> Result<Node, ParseError> {
    let mut parser = Parser { src, pos: 0 };
    let mut statements = Vec::new();
    loop {
        let full_start = parser.pos;
        if parser.skip() >= src.len() {
            break;
        }
        statements.push(parser.expr(full_start)?);
        parser.expect(';')?;
    }
    let start = statements.first().map_or(src.len(), |s| s.start());
    Ok(node(Kind::Program, 0, start, src.len(), statements))
}

transkit::declare_visitor! {
    node: Node,
    kind: Kind,
    /// Handlers for the call language.
    pub trait CalcVisitor {
        Program,
        Call,
        Ident => identifier,
        Number,
    }
}

/// Renders calls as s-expressions. Identifiers carry the call depth they
/// appear at, e.g. `x^2`.
pub struct Lisp;

impl transkit::Visitor for Lisp {
    type Node = Node;
    type Context = usize;

    fn default_context(&self) -> usize {
        0
    }

    fn merge_context(&self, old: &usize, update: usize) -> usize {
        old + update
    }
}

impl CalcVisitor for Lisp {
    fn program(&self, node: &Node, cx: &transkit::AstContext<'_, Self>) -> Option<transkit::OTree> {
        Some(transkit::OTree::new(transkit::join_with_blank_lines(
            &node.children(),
            cx,
        )))
    }

    fn call(&self, node: &Node, cx: &transkit::AstContext<'_, Self>) -> Option<transkit::OTree> {
        let children = node.children();
        let (name, args) = children.split_first()?;
        let args = cx
            .convert_all_with(args, 1)
            .into_iter()
            .map(|arg| transkit::OTree::new(transkit::fragments![" ", arg]));
        Some(
            transkit::OTree::text(format!("({}", cx.text_of(name)))
                .children(args)
                .suffix(")")
                .attach_comment(),
        )
    }

    fn identifier(
        &self,
        node: &Node,
        cx: &transkit::AstContext<'_, Self>,
    ) -> Option<transkit::OTree> {
        let text = format!("{}^{}", cx.text_of(node), cx.current_context());
        Some(transkit::OTree::text(text).attach_comment())
    }

    fn number(&self, node: &Node, cx: &transkit::AstContext<'_, Self>) -> Option<transkit::OTree> {
        Some(transkit::OTree::text(cx.text_of(node)).attach_comment())
    }
}

impl CalcVisitor for transkit::VisualizeVisitor<Node> {}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
