//! Rendering of hand-built output trees through the public API.

use transkit::{fragments, render_tree_with, OTree, RenderSink, RenderStrategy};

fn both(tree: &OTree) -> String {
    let recursive = render_tree_with(tree, RenderStrategy::Recursive);
    let iterative = render_tree_with(tree, RenderStrategy::WorkList);
    assert_eq!(recursive, iterative);
    recursive
}

fn literal(items: &[&str]) -> OTree {
    OTree::new(fragments!["{"])
        .children(items.iter().map(|item| format!("\n{item}")))
        .separator(",")
        .indent(4)
        .suffix("\n}")
}

#[test]
fn test_multiline_literal() {
    assert_eq!(both(&literal(&["a", "b", "c"])), "{\n    a,\n    b,\n    c\n}");
}

#[test]
fn test_nested_literal_indents_relative() {
    let tree = OTree::new(fragments!["x = "]).children(fragments![literal(&["a", "b"])]);
    let outer = literal(&["k"]);
    let nested = OTree::new(fragments!["{"])
        .children(fragments![OTree::new(fragments!["\n", tree]), outer])
        .separator(",")
        .indent(2)
        .suffix("\n}");
    insta::assert_snapshot!(both(&nested), @r"
    {
      x = {
          a,
          b
      },{
          k
      }
    }
    ");
}

#[test]
fn test_inline_children_ignore_indent() {
    let tree = OTree::new(fragments!["f("])
        .children(fragments!["a", "b"])
        .separator(", ")
        .indent(8)
        .suffix(")");
    assert_eq!(both(&tree), "f(a, b)");
}

#[test]
fn test_block_with_newline_option() {
    let body = OTree::new(fragments![])
        .children(fragments!["a()", "b()"])
        .separator("\n")
        .newline()
        .indent(4);
    let tree = OTree::new(fragments!["if x:", body]);
    assert_eq!(both(&tree), "if x:\n    a()\n    b()");
}

#[test]
fn test_render_once_shared_comment() {
    let comment = OTree::text("# note\n").render_once("comment-3");
    let first = OTree::new(fragments![comment.clone(), "a"]);
    let second = OTree::new(fragments![comment, "b"]);
    let tree = OTree::new(fragments![first, "\n", second]);
    assert_eq!(both(&tree), "# note\na\nb");
}

#[test]
fn test_separator_skips_empty_and_whitespace_children() {
    let tree = OTree::new(fragments!["["])
        .children(fragments!["a", OTree::empty(), " ", "b"])
        .separator(", ")
        .suffix("]");
    assert_eq!(both(&tree), "[a,  b]");
}

#[test]
fn test_sink_strips_trailing_whitespace() {
    let mut sink = RenderSink::new();
    sink.write_str("a   \n\t\nb ");
    assert_eq!(sink.finish(), "a\n\nb");
}
