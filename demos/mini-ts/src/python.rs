//! Python backend.
//!
//! Identifiers become `snake_case`, `console.log` becomes `print`, and an
//! object literal passed as the last argument of a call is exploded into
//! keyword arguments. Comments are kept as `#` comments and blank lines
//! between statements survive (at most one).
//!
//! `while` loops are deliberately left untranslated: they come out verbatim
//! with an error diagnostic.

use std::borrow::Cow;

use transkit::trivia::strip_comment_markers;
use transkit::{
    convert_children_with_newlines, fragments, join_with_blank_lines, AstContext,
    ChildrenOptions, Fragment, OTree, Severity, SyntaxNode, TriviaKind, TriviaSpan, Visitor,
};

use crate::lexer::Token;
use crate::syntax::{SyntaxKind, TsNode, TsVisitor};
use crate::types::TsType;

const INDENT: i32 = 4;

/// Context threaded through the Python conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PythonContext {
    /// Object literals render as keyword arguments instead of dicts.
    pub keyword_args: bool,
    /// Inside a function body.
    pub in_function: bool,
}

impl PythonContext {
    const VALUE: Self = Self {
        keyword_args: false,
        in_function: false,
    };

    const KEYWORD_ARGS: Self = Self {
        keyword_args: true,
        in_function: false,
    };

    const FUNCTION_BODY: Self = Self {
        keyword_args: false,
        in_function: true,
    };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonVisitor;

type Cx<'a> = AstContext<'a, PythonVisitor>;

impl Visitor for PythonVisitor {
    type Node = TsNode;
    type Context = PythonContext;

    fn default_context(&self) -> PythonContext {
        PythonContext::default()
    }

    /// `keyword_args` applies to the next object literal only, so it comes
    /// from the update. Once inside a function we stay inside.
    fn merge_context(&self, old: &PythonContext, update: PythonContext) -> PythonContext {
        PythonContext {
            keyword_args: update.keyword_args,
            in_function: old.in_function || update.in_function,
        }
    }

    fn comment_range(&self, comment: &TriviaSpan, cx: &Cx<'_>) -> OTree {
        let text = cx.text_at(comment.start, comment.end);
        let body = strip_comment_markers(text, comment.kind == TriviaKind::BlockComment);
        if body.is_empty() {
            return OTree::text("#\n");
        }
        OTree::new(body.lines().map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        }))
    }
}

impl PythonVisitor {
    /// An indented block of statements, `pass` when empty.
    fn body(&self, statement: &TsNode, cx: &Cx<'_>) -> OTree {
        let statements = if statement.is(SyntaxKind::Block) {
            statement.children()
        } else {
            vec![statement.clone()]
        };
        let mut lines = join_with_blank_lines(&statements, cx);
        if lines.is_empty() {
            lines.push(Fragment::from("pass"));
        }
        OTree::new(fragments![])
            .children(lines)
            .newline()
            .indent(INDENT)
    }

    /// `if`/`elif` clause of `node`, followed by its `elif`/`else` chain.
    fn if_clause(&self, node: &TsNode, cx: &Cx<'_>, keyword: &str) -> Option<OTree> {
        let [condition, then, rest @ ..] = node.child_nodes() else {
            return None;
        };
        let mut parts = fragments![
            keyword,
            " ",
            cx.convert(condition),
            ":",
            self.body(then, cx)
        ];
        match rest.first() {
            Some(otherwise) if otherwise.is(SyntaxKind::IfStatement) => {
                parts.push("\n".into());
                parts.push(self.if_clause(otherwise, cx, "elif").into());
            }
            Some(otherwise) => {
                parts.push("\nelse:".into());
                parts.push(self.body(otherwise, cx).into());
            }
            None => {}
        }
        Some(OTree::new(parts))
    }

    /// `callee(arguments)`, exploding a trailing object literal into keyword
    /// arguments.
    fn call_like(&self, callee: OTree, arguments: &[TsNode], cx: &Cx<'_>) -> OTree {
        let mut converted = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.iter().enumerate() {
            let last = index + 1 == arguments.len();
            let update = if last && argument.is(SyntaxKind::ObjectLiteralExpression) {
                PythonContext::KEYWORD_ARGS
            } else {
                PythonContext::VALUE
            };
            converted.push(cx.convert_with(argument, update));
        }
        OTree::new(fragments![callee, "("])
            .children(converted)
            .separator(", ")
            .indent(INDENT)
            .suffix(")")
    }

    /// Properties as `key=value`, each on a new line if it was in the
    /// source, comments included.
    fn keyword_arguments(&self, properties: &[TsNode], cx: &Cx<'_>) -> OTree {
        let arguments = properties.iter().map(|property| {
            let line_break = cx.mirror_newline_before(Some(property), "");
            let argument = cx.attach_leading_trivia(property, cx.convert(property));
            OTree::new(fragments![line_break, argument])
        });
        OTree::new(fragments![]).children(arguments).separator(", ")
    }
}

impl TsVisitor for PythonVisitor {
    fn source_file(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::new(join_with_blank_lines(node.child_nodes(), cx)))
    }

    /// A nested block has no Python equivalent; its statements are spliced.
    fn block(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::new(join_with_blank_lines(node.child_nodes(), cx)).attach_comment())
    }

    fn expression_statement(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let expression = node.child(0)?;
        Some(OTree::new(fragments![cx.convert(expression)]).attach_comment())
    }

    fn variable_statement(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(
            OTree::new(fragments![])
                .children(cx.convert_all(node.child_nodes()))
                .separator("\n")
                .attach_comment(),
        )
    }

    fn variable_declaration(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let name = cx.convert(node.child(0)?);
        let value = match node.child(1) {
            Some(init) => cx.convert_with(init, PythonContext::VALUE),
            None => OTree::text("None"),
        };
        Some(OTree::new(fragments![name, " = ", value]))
    }

    fn if_statement(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(self.if_clause(node, cx, "if")?.attach_comment())
    }

    fn return_statement(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        if !cx.with_context(|context| context.in_function) {
            cx.report_with(node, "`return` outside of a function", Severity::Warning);
        }
        let value = node.child(0).map(|value| {
            OTree::new(fragments![" ", cx.convert_with(value, PythonContext::VALUE)])
        });
        Some(OTree::new(fragments!["return", value]).attach_comment())
    }

    fn function_declaration(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let [name, rest @ .., body] = node.child_nodes() else {
            return None;
        };
        let parameters = OTree::new(fragments![])
            .children(cx.convert_all(rest))
            .separator(", ");
        let body = cx.scoped(PythonContext::FUNCTION_BODY, || self.body(body, cx));
        Some(
            OTree::new(fragments!["def ", cx.convert(name), "(", parameters, "):", body])
                .attach_comment(),
        )
    }

    fn parameter(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(cx.convert(node.child(0)?))
    }

    fn call_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let (callee, arguments) = node.child_nodes().split_first()?;
        let callee = cx.convert_with(callee, PythonContext::VALUE);
        Some(self.call_like(callee, arguments, cx).attach_comment())
    }

    /// Python has no `new`; the constructor is just called.
    fn new_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let (callee, arguments) = node.child_nodes().split_first()?;
        let callee = cx.convert_with(callee, PythonContext::VALUE);
        Some(self.call_like(callee, arguments, cx).attach_comment())
    }

    fn property_access_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        if cx.text_of(node) == "console.log" {
            return Some(OTree::text("print"));
        }
        let [object, name] = node.child_nodes() else {
            return None;
        };
        Some(OTree::new(fragments![
            cx.convert_with(object, PythonContext::VALUE),
            ".",
            cx.convert(name)
        ]))
    }

    fn object_literal_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let properties = node.child_nodes();
        if cx.with_context(|context| context.keyword_args) {
            return Some(self.keyword_arguments(properties, cx));
        }
        let options = ChildrenOptions::delimited("{", "}").with_indent(INDENT);
        Some(convert_children_with_newlines(node, properties, cx, options))
    }

    fn property_assignment(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let [key, value] = node.child_nodes() else {
            return None;
        };
        let value = cx.convert_with(value, PythonContext::VALUE);
        let name = cx.text_of(key);
        if cx.with_context(|context| context.keyword_args) {
            let name = match key.kind() {
                SyntaxKind::StringLiteral => unquote(name),
                _ => Cow::Borrowed(name),
            };
            return Some(OTree::new(fragments![snake_case(&name), "=", value]));
        }
        let key = match key.kind() {
            SyntaxKind::StringLiteral => double_quoted(name),
            _ => Cow::Owned(format!("\"{name}\"")),
        };
        Some(OTree::new(fragments![key, ": ", value]).attach_comment())
    }

    fn array_literal_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let options = ChildrenOptions::delimited("[", "]")
            .with_indent(INDENT)
            .with_context(PythonContext::VALUE);
        Some(convert_children_with_newlines(
            node,
            node.child_nodes(),
            cx,
            options,
        ))
    }

    fn binary_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let [left, operator, right] = node.child_nodes() else {
            return None;
        };
        let token = operator.operator()?;
        let symbol = match token {
            Token::EqEqEq | Token::EqEq => "==",
            Token::NotEqEq | Token::NotEq => "!=",
            Token::AndAnd => "and",
            Token::OrOr => "or",
            _ => cx.text_of(operator),
        };
        let mut left_tree = cx.convert(left);
        let mut right_tree = cx.convert(right);
        if token == Token::Plus {
            // Python refuses to add strings and numbers.
            match (cx.type_of_expression(left), cx.type_of_expression(right)) {
                (Some(TsType::String), Some(TsType::Number | TsType::Boolean)) => {
                    right_tree = OTree::new(fragments!["str(", right_tree, ")"]);
                }
                (Some(TsType::Number | TsType::Boolean), Some(TsType::String)) => {
                    left_tree = OTree::new(fragments!["str(", left_tree, ")"]);
                }
                _ => {}
            }
        }
        Some(OTree::new(fragments![left_tree, " ", symbol, " ", right_tree]))
    }

    fn prefix_unary_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        let [operator, operand] = node.child_nodes() else {
            return None;
        };
        let symbol = match operator.operator()? {
            Token::Bang => "not ",
            _ => cx.text_of(operator),
        };
        Some(OTree::new(fragments![symbol, cx.convert(operand)]))
    }

    fn parenthesized_expression(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::new(fragments!["(", cx.convert(node.child(0)?), ")"]))
    }

    fn identifier(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text(snake_case(cx.text_of(node))).attach_comment())
    }

    fn this_keyword(&self, _node: &TsNode, _cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text("self"))
    }

    fn string_literal(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text(double_quoted(cx.text_of(node))).attach_comment())
    }

    fn numeric_literal(&self, node: &TsNode, cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text(cx.text_of(node)).attach_comment())
    }

    fn true_keyword(&self, _node: &TsNode, _cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text("True"))
    }

    fn false_keyword(&self, _node: &TsNode, _cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::text("False"))
    }

    fn empty_statement(&self, _node: &TsNode, _cx: &Cx<'_>) -> Option<OTree> {
        Some(OTree::empty())
    }
}

/// `camelCase` to `snake_case`. Names starting with an upper case letter
/// (classes, constants) are kept.
pub fn snake_case(name: &str) -> Cow<'_, str> {
    if name.starts_with(|c: char| c.is_ascii_uppercase())
        || !name.contains(|c: char| c.is_ascii_uppercase())
    {
        return Cow::Borrowed(name);
    }
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let previous = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if previous.is_ascii_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_ascii_uppercase() && next_lower)
            {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// A string literal re-quoted with double quotes.
fn double_quoted(literal: &str) -> Cow<'_, str> {
    if !literal.starts_with('\'') {
        return Cow::Borrowed(literal);
    }
    let inner = unquote(literal);
    Cow::Owned(format!(
        "\"{}\"",
        inner.replace("\\'", "'").replace('"', "\\\"")
    ))
}

fn unquote(literal: &str) -> Cow<'_, str> {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();
    Cow::Borrowed(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case::test_case("doIt", "do_it"; "camel")]
    #[test_case::test_case("someFunction", "some_function"; "two words")]
    #[test_case::test_case("arg1", "arg1"; "already snake")]
    #[test_case::test_case("getHTTPServer", "get_http_server"; "acronym")]
    #[test_case::test_case("item2Name", "item2_name"; "digit")]
    #[test_case::test_case("Foo", "Foo"; "class name")]
    #[test_case::test_case("MAX_SIZE", "MAX_SIZE"; "constant")]
    fn test_snake_case(name: &str, expected: &str) {
        assert_eq!(snake_case(name), expected);
    }

    #[test_case::test_case("'hello'", "\"hello\""; "single quoted")]
    #[test_case::test_case("\"hi\"", "\"hi\""; "double quoted")]
    #[test_case::test_case(r#"'it\'s "x"'"#, r#""it's \"x\"""#; "escapes")]
    fn test_double_quoted(literal: &str, expected: &str) {
        assert_eq!(double_quoted(literal), expected);
    }

    #[test]
    fn test_merge_context() {
        let merged = PythonVisitor.merge_context(
            &PythonContext::FUNCTION_BODY,
            PythonContext::KEYWORD_ARGS,
        );
        assert_eq!(
            merged,
            PythonContext {
                keyword_args: true,
                in_function: true,
            }
        );
        let merged = PythonVisitor.merge_context(&merged, PythonContext::VALUE);
        assert!(!merged.keyword_args);
        assert!(merged.in_function);
    }
}
