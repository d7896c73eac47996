//! Layout helpers for handlers that lay out lists of converted children.
//!
//! These keep the line structure of the source where it matters: blank
//! lines between statements, line breaks between list elements, and the
//! leading line break of a multi-line literal.

use crate::dispatch::AstContext;
use crate::otree::{Fragment, OTree};
use crate::traits::{SyntaxNode, Visitor};
use crate::trivia;

/// Separator reproducing at most one blank line.
#[inline]
pub const fn blank_line_separator(blank_lines: usize) -> &'static str {
    if blank_lines == 0 { "\n" } else { "\n\n" }
}

/// Converts `nodes` and joins them with line breaks, keeping a single blank
/// line wherever the source had one or more.
///
/// Nodes converting to nothing are skipped along with their separator.
pub fn join_with_blank_lines<V: Visitor>(
    nodes: &[V::Node],
    cx: &AstContext<'_, V>,
) -> Vec<Fragment> {
    let mut parts = Vec::with_capacity(nodes.len() * 2);
    let mut previous: Option<&V::Node> = None;
    for node in nodes {
        let converted = cx.convert(node);
        if converted.is_empty() {
            continue;
        }
        if let Some(previous) = previous {
            let blank = cx.blank_lines_between(previous, node);
            parts.push(Fragment::from(blank_line_separator(blank)));
        }
        parts.push(converted.into());
        previous = Some(node);
    }
    parts
}

/// Interleaves `rendered` with a line break wherever the source text between
/// two consecutive `nodes` contains one.
///
/// `rendered[i]` must be the output for `nodes[i]`.
pub fn preserve_separating_newlines<V: Visitor>(
    rendered: Vec<OTree>,
    nodes: &[V::Node],
    cx: &AstContext<'_, V>,
) -> Vec<Fragment> {
    let mut parts = Vec::with_capacity(rendered.len() * 2);
    for (index, tree) in rendered.into_iter().enumerate() {
        if index > 0 {
            if let (Some(previous), Some(node)) = (nodes.get(index - 1), nodes.get(index)) {
                if trivia::contains_newline(cx.text_between(previous, node)) {
                    parts.push(Fragment::from("\n"));
                }
            }
        }
        parts.push(tree.into());
    }
    parts
}

/// Options for [`convert_children_with_newlines`].
#[derive(Debug, Clone)]
pub struct ChildrenOptions<C> {
    /// Context update applied while converting the children.
    pub context: Option<C>,
    pub prefix: String,
    pub suffix: String,
    pub indent: i32,
    pub separator: String,
}

impl<C> Default for ChildrenOptions<C> {
    fn default() -> Self {
        Self {
            context: None,
            prefix: String::new(),
            suffix: String::new(),
            indent: 0,
            separator: ", ".to_string(),
        }
    }
}

impl<C> ChildrenOptions<C> {
    pub fn delimited(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: i32) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn with_context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }
}

/// Converts `children` of `parent` into a delimited list that mirrors the
/// source's line breaks.
///
/// Each child is preceded by as many line breaks as separate it from the
/// previous child (or, for the first child, from the start of `parent`),
/// counted up to the child's first leading comment. If the first child
/// starts on a new line, the closing suffix does too. The result asks for
/// `parent`'s leading comments.
pub fn convert_children_with_newlines<V: Visitor>(
    parent: &V::Node,
    children: &[V::Node],
    cx: &AstContext<'_, V>,
    options: ChildrenOptions<V::Context>,
) -> OTree {
    let leading = children
        .first()
        .map(|first| breaks_before(cx, parent.start(), first))
        .unwrap_or_default();

    let mut converted = Vec::with_capacity(children.len());
    let mut previous: Option<&V::Node> = None;
    for child in children {
        let tree = match &options.context {
            Some(update) => cx.convert_with(child, update.clone()),
            None => cx.convert(child),
        };
        let breaks = match previous {
            Some(previous) => breaks_before(cx, previous.end(), child),
            None => leading.clone(),
        };
        previous = Some(child);
        converted.push(if breaks.is_empty() {
            tree
        } else {
            OTree::new([Fragment::from(breaks), tree.into()])
        });
    }

    let suffix = if leading.is_empty() {
        options.suffix
    } else {
        format!("\n{}", options.suffix)
    };
    OTree::text(options.prefix)
        .children(converted)
        .indent(options.indent)
        .separator(options.separator)
        .suffix(suffix)
        .attach_comment()
}

/// Line breaks between `from` and `node`'s first leading comment (or first
/// token). The comments bring their own.
fn breaks_before<V: Visitor>(cx: &AstContext<'_, V>, from: usize, node: &V::Node) -> String {
    let start = node.start();
    let stop = trivia::scan(cx.source(), from, Some(start))
        .iter()
        .find(|span| span.is_comment())
        .map_or(start, |span| span.start);
    trivia::repeat_newlines(cx.text_at(from, stop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslateConfig;
    use crate::dispatch::tests::{parse, Brackets, Node};
    use crate::sink::render_tree;
    use crate::traits::{Dispatch, NoTypeOracle};

    fn with_context<R>(src: &str, f: impl FnOnce(&AstContext<'_, Brackets>, &Node) -> R) -> R {
        let root = parse(src);
        let cx = AstContext::new(
            &Brackets,
            src,
            &NoTypeOracle,
            TranslateConfig::DEFAULT,
            <Node as Dispatch<Brackets>>::dispatch,
        );
        f(&cx, &root)
    }

    #[test]
    fn test_blank_line_separator() {
        assert_eq!(blank_line_separator(0), "\n");
        assert_eq!(blank_line_separator(1), "\n\n");
        assert_eq!(blank_line_separator(2), "\n\n");
    }

    #[test]
    fn test_join_with_blank_lines_collapses_runs() {
        let src = "a\nb\n\n\n\nc _\n\nd";
        with_context(src, |cx, root| {
            let tree = OTree::new(join_with_blank_lines(&root.children(), cx));
            assert_eq!(render_tree(&tree), "a@0\nb@0\n\nc@0\n\nd@0");
        });
    }

    #[test]
    fn test_preserve_separating_newlines() {
        with_context("a b\nc", |cx, root| {
            let children = root.children();
            let rendered = cx.convert_all(&children);
            let tree = OTree::new(preserve_separating_newlines(rendered, &children, cx));
            assert_eq!(render_tree(&tree), "a@0b@0\nc@0");
        });
    }

    #[test]
    fn test_children_with_newlines_multiline() {
        with_context("(\n  a\n  b\n)", |cx, root| {
            let group = &root.children()[0];
            let options = ChildrenOptions::delimited("{", "}").with_indent(4);
            let tree = convert_children_with_newlines(group, &group.children(), cx, options);
            insta::assert_snapshot!(render_tree(&tree), @r"
            {
                a@0,
                b@0
            }
            ");
        });
    }

    #[test]
    fn test_children_with_newlines_comment_owns_its_line() {
        with_context("(\n  // first\n  a b\n)", |cx, root| {
            let group = &root.children()[0];
            let options = ChildrenOptions::delimited("{", "}").with_indent(4);
            let tree = convert_children_with_newlines(group, &group.children(), cx, options);
            insta::assert_snapshot!(render_tree(&tree), @r"
            {
                // first
                a@0, b@0
            }
            ");
        });
    }

    #[test]
    fn test_children_with_newlines_inline_with_context() {
        with_context("(a b)", |cx, root| {
            let group = &root.children()[0];
            let options = ChildrenOptions::delimited("{", "}").with_context(3);
            let tree = convert_children_with_newlines(group, &group.children(), cx, options);
            assert_eq!(render_tree(&tree), "{a@3, b@3}");
            assert!(tree.wants_comments());
            assert_eq!(cx.context_depth(), 1);
        });
    }
}
