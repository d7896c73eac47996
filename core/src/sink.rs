//! The render sink: turns an [`OTree`] into text.
//!
//! The sink owns the indentation state. Indentation is lazy: a tree's indent
//! request only takes effect at the next line break written inside it, so a
//! tree whose children stay on one line never shifts anything. Each line
//! break written is followed by the current indentation, and trailing
//! whitespace is stripped from every line when the sink is finished.
//!
//! Separators are driven by [`Mark`]s: a child's separator is written only
//! if the previous child wrote something other than whitespace, which keeps
//! empty and whitespace-only children from producing dangling `, `.
//!
//! # Example
//!
//! ```ignore
//! let mut sink = RenderSink::new();
//! sink.write_tree(&tree);
//! let text = sink.finish();
//! ```

use std::collections::HashSet;

use crate::config::RenderStrategy;
use crate::otree::{Fragment, OTree};

/// An opaque position in the sink's output, see [`RenderSink::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

/// Undoes one [`RenderSink::request_indent_change`].
#[must_use = "an indent change must be restored with `RenderSink::restore_indent`"]
#[derive(Debug)]
pub struct IndentRestore {
    depth: usize,
    active: bool,
    /// Request this one replaced.
    previous: i32,
    applied: usize,
}

/// Text output with lazily applied indentation and render-once keys.
#[derive(Debug)]
pub struct RenderSink {
    buf: String,
    /// Indentation stack in spaces; never empty.
    indent_levels: Vec<usize>,
    pending_indent: i32,
    /// Number of indent requests applied so far.
    applied: usize,
    /// End of the last non-whitespace text written.
    non_ws_end: usize,
    fired: HashSet<String>,
}

impl Default for RenderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            indent_levels: vec![0],
            pending_indent: 0,
            applied: 0,
            non_ws_end: 0,
            fired: HashSet::new(),
        }
    }

    /// Current indentation in spaces.
    #[inline]
    pub fn current_indent(&self) -> usize {
        self.indent_levels.last().copied().unwrap_or_default()
    }

    /// Raw output so far, before trailing whitespace is stripped.
    #[inline]
    pub fn buf(&self) -> &str {
        &self.buf
    }

    /// Records `key` as rendered.
    ///
    /// Returns `false` if the key already fired in this render pass; `None`
    /// always passes.
    pub fn tag_once(&mut self, key: Option<&str>) -> bool {
        match key {
            Some(key) if self.fired.contains(key) => false,
            Some(key) => {
                self.fired.insert(key.to_string());
                true
            }
            None => true,
        }
    }

    #[inline]
    pub fn mark(&self) -> Mark {
        Mark(self.buf.len())
    }

    /// Whether anything other than whitespace was written after `mark`.
    #[inline]
    pub fn wrote_non_whitespace_since(&self, mark: Mark) -> bool {
        self.non_ws_end > mark.0
    }

    /// Writes `text`, indenting after each line break.
    ///
    /// The first line break applies any pending indent request.
    pub fn write_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if text.contains('\n') {
            self.apply_pending_indent();
            let indent = self.current_indent();
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.buf.push('\n');
                    self.buf.extend(std::iter::repeat_n(' ', indent));
                }
                self.buf.push_str(line);
            }
        } else {
            self.buf.push_str(text);
        }
        if !text.trim().is_empty() {
            self.non_ws_end = self.buf.len();
        }
    }

    #[inline]
    pub fn newline(&mut self) {
        self.write_str("\n");
    }

    /// Requests an indentation change for the next line break.
    ///
    /// A later request made before that line break replaces this one until
    /// it is restored.
    pub fn request_indent_change(&mut self, delta: i32) -> IndentRestore {
        let restore = IndentRestore {
            depth: self.indent_levels.len(),
            active: delta != 0,
            previous: self.pending_indent,
            applied: self.applied,
        };
        if delta != 0 {
            self.pending_indent = delta;
        }
        restore
    }

    /// Drops every indentation level pushed since the matching request.
    ///
    /// If no line break applied a request in between, the request this one
    /// replaced is pending again; otherwise nothing is.
    pub fn restore_indent(&mut self, restore: IndentRestore) {
        if restore.active {
            self.indent_levels.truncate(restore.depth.max(1));
            self.pending_indent = if self.applied == restore.applied {
                restore.previous
            } else {
                0
            };
        }
    }

    fn apply_pending_indent(&mut self) {
        if self.pending_indent != 0 {
            let next = self
                .current_indent()
                .saturating_add_signed(self.pending_indent as isize);
            self.indent_levels.push(next);
            self.pending_indent = 0;
            self.applied += 1;
        }
    }

    /// Writes `tree` with the [`RenderStrategy::Recursive`] strategy.
    pub fn write_tree(&mut self, tree: &OTree) {
        if !self.tag_once(tree.options().render_once.as_deref()) {
            return;
        }
        for fragment in tree.prefix() {
            self.write_fragment(fragment);
        }

        let options = tree.options();
        let restore = self.request_indent_change(options.indent);
        if options.newline {
            self.newline();
        }
        let mut mark = self.mark();
        for child in tree.child_fragments() {
            if let Some(separator) = &options.separator {
                if self.wrote_non_whitespace_since(mark) {
                    self.write_str(separator);
                }
            }
            mark = self.mark();
            self.write_fragment(child);
        }
        self.restore_indent(restore);

        if let Some(suffix) = &options.suffix {
            self.write_str(suffix);
        }
    }

    fn write_fragment(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::Text(text) => self.write_str(text),
            Fragment::Tree(tree) => self.write_tree(tree),
        }
    }

    /// Writes `tree` with an explicit frame stack instead of recursion.
    ///
    /// Produces the same output as [`RenderSink::write_tree`].
    pub fn write_tree_iterative(&mut self, tree: &OTree) {
        enum Step<'t> {
            Enter(&'t OTree),
            Write(&'t Fragment),
            Open(&'t OTree),
            Child(&'t OTree, usize),
        }

        let mut steps = vec![Step::Enter(tree)];
        let mut open: Vec<(IndentRestore, Mark)> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(tree) => {
                    if !self.tag_once(tree.options().render_once.as_deref()) {
                        continue;
                    }
                    steps.push(Step::Open(tree));
                    steps.extend(tree.prefix().iter().rev().map(Step::Write));
                }
                Step::Write(Fragment::Text(text)) => self.write_str(text),
                Step::Write(Fragment::Tree(tree)) => steps.push(Step::Enter(tree)),
                Step::Open(tree) => {
                    let restore = self.request_indent_change(tree.options().indent);
                    if tree.options().newline {
                        self.newline();
                    }
                    open.push((restore, self.mark()));
                    steps.push(Step::Child(tree, 0));
                }
                Step::Child(tree, index) => match tree.child_fragments().get(index) {
                    Some(child) => {
                        let separator = tree.options().separator.as_deref();
                        let since = open.last().map(|(_, mark)| *mark);
                        if let (Some(separator), Some(since)) = (separator, since) {
                            if self.wrote_non_whitespace_since(since) {
                                self.write_str(separator);
                            }
                        }
                        let mark = self.mark();
                        if let Some((_, last)) = open.last_mut() {
                            *last = mark;
                        }
                        steps.push(Step::Child(tree, index + 1));
                        steps.push(Step::Write(child));
                    }
                    None => {
                        if let Some((restore, _)) = open.pop() {
                            self.restore_indent(restore);
                        }
                        if let Some(suffix) = &tree.options().suffix {
                            self.write_str(suffix);
                        }
                    }
                },
            }
        }
    }

    /// Writes `tree` using `strategy`.
    pub fn write_tree_with(&mut self, tree: &OTree, strategy: RenderStrategy) {
        match strategy {
            RenderStrategy::Recursive => self.write_tree(tree),
            RenderStrategy::WorkList => self.write_tree_iterative(tree),
        }
    }

    /// Returns the output with trailing spaces and tabs removed from every
    /// line.
    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.buf.len());
        for (i, line) in self.buf.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.trim_end_matches([' ', '\t']));
        }
        out
    }
}

/// Renders `tree` to a string with a fresh sink.
pub fn render_tree(tree: &OTree) -> String {
    render_tree_with(tree, RenderStrategy::Recursive)
}

/// Renders `tree` to a string with a fresh sink and the given strategy.
pub fn render_tree_with(tree: &OTree, strategy: RenderStrategy) -> String {
    let mut sink = RenderSink::new();
    sink.write_tree_with(tree, strategy);
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments;

    fn both(tree: &OTree) -> String {
        let recursive = render_tree_with(tree, RenderStrategy::Recursive);
        let iterative = render_tree_with(tree, RenderStrategy::WorkList);
        assert_eq!(recursive, iterative);
        recursive
    }

    #[test]
    fn test_block_with_separator_and_indent() {
        let tree = OTree::new(fragments!["{"])
            .children(fragments!["\na", "\nb", "\nc"])
            .separator(", ")
            .indent(4)
            .suffix("\n}");
        insta::assert_snapshot!(both(&tree), @r"
        {
            a,
            b,
            c
        }
        ");
        assert_eq!(both(&tree), "{\n    a,\n    b,\n    c\n}");
    }

    #[test]
    fn test_indent_is_lazy() {
        let tree = OTree::new(fragments!["f("])
            .children(fragments!["a", "b"])
            .separator(", ")
            .indent(4)
            .suffix(")");
        assert_eq!(both(&tree), "f(a, b)");
    }

    #[test]
    fn test_newline_option_indents_children() {
        let body = OTree::new(fragments![])
            .children(fragments!["x = 1", "y = 2"])
            .separator("\n")
            .indent(4)
            .newline();
        let tree = OTree::new(fragments!["if c:", body, "\nz = 3"]);
        assert_eq!(both(&tree), "if c:\n    x = 1\n    y = 2\nz = 3");
    }

    #[test]
    fn test_nested_indentation_accumulates() {
        let inner = OTree::new(fragments!["{"])
            .children(fragments!["\nleaf"])
            .indent(2)
            .suffix("\n}");
        let outer = OTree::new(fragments!["{"])
            .children(fragments!["\n", inner])
            .indent(2)
            .suffix("\n}");
        assert_eq!(both(&outer), "{\n  {\n    leaf\n  }\n}");
    }

    #[test]
    fn test_later_request_replaces_pending() {
        let mut sink = RenderSink::new();
        let outer = sink.request_indent_change(8);
        let inner = sink.request_indent_change(2);
        sink.write_str("a\nb");
        sink.restore_indent(inner);
        sink.write_str("\nc");
        sink.restore_indent(outer);
        assert_eq!(sink.finish(), "a\n  b\nc");
    }

    #[test]
    fn test_inline_sibling_keeps_parent_request() {
        let call = OTree::new(fragments!["f("])
            .children(fragments!["x"])
            .indent(4)
            .suffix(")");
        let tree = OTree::new(fragments!["{"])
            .children(fragments![call, "\nb"])
            .indent(4)
            .suffix("\n}");
        assert_eq!(both(&tree), "{f(x)\n    b\n}");
    }

    #[test]
    fn test_applied_child_request_consumes_parent_request() {
        let dict = OTree::new(fragments!["{"])
            .children(fragments!["\na"])
            .indent(4)
            .suffix("\n}");
        let call = OTree::new(fragments!["f("])
            .children(fragments![dict, "2"])
            .separator(", ")
            .indent(4)
            .suffix(")");
        assert_eq!(both(&call), "f({\n    a\n}, 2)");
    }

    #[test]
    fn test_negative_indent_saturates() {
        let tree = OTree::new(fragments!["a"]).children(fragments!["\nb"]).indent(-4);
        assert_eq!(both(&tree), "a\nb");
    }

    #[test]
    fn test_render_once_dedups() {
        let comment = || OTree::text("// c\n").render_once("comment-0");
        let tree = OTree::new(fragments![comment(), comment(), "x", comment()]);
        assert_eq!(both(&tree), "// c\nx");
    }

    #[test]
    fn test_empty_child_is_transparent() {
        let with_empty = OTree::new(fragments!["("])
            .children(fragments!["a", OTree::empty(), "b"])
            .separator(", ")
            .suffix(")");
        let without = OTree::new(fragments!["("])
            .children(fragments!["a", "b"])
            .separator(", ")
            .suffix(")");
        assert_eq!(both(&with_empty), both(&without));
        assert_eq!(both(&with_empty), "(a, b)");
    }

    #[test]
    fn test_whitespace_child_suppresses_separator() {
        let tree = OTree::new(fragments![])
            .children(fragments!["\n", "a", "b"])
            .separator("\n")
            .indent(2);
        assert_eq!(both(&tree), "\n  a\n  b");
    }

    #[test]
    fn test_deduped_child_suppresses_separator() {
        let seen = OTree::text("a").render_once("k");
        let tree = OTree::new(fragments![])
            .children(fragments![seen.clone(), seen, "b"])
            .separator(", ");
        assert_eq!(both(&tree), "a, b");
    }

    #[test]
    fn test_finish_strips_trailing_whitespace() {
        let mut sink = RenderSink::new();
        sink.write_str("a  \t\nb ");
        assert_eq!(sink.finish(), "a\nb");
    }

    #[test]
    fn test_worklist_handles_deep_nesting() {
        let mut tree = OTree::text("x");
        for _ in 0..10_000 {
            tree = OTree::new(fragments!["(", tree, ")"]);
        }
        let text = render_tree_with(&tree, RenderStrategy::WorkList);
        assert_eq!(text.len(), 20_001);
        // Dropping a tree this deep recursively would be the next overflow.
        std::mem::forget(tree);
    }
}
