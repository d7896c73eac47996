//! The output tree handlers build and the render sink consumes.
//!
//! An [`OTree`] is a prefix, a list of children and a handful of layout
//! options. Empty fragments are dropped on construction, which makes an
//! empty tree ([`OTree::empty`]) transparent wherever it is embedded: it
//! neither prints nor triggers a separator.
//!
//! # Example
//!
//! ```ignore
//! use transkit_core::{fragments, OTree};
//!
//! let tree = OTree::new(fragments!["{"])
//!     .children(fragments!["\na", "\nb", "\nc"])
//!     .separator(", ")
//!     .indent(4)
//!     .suffix("\n}");
//!
//! assert_eq!(transkit_core::render_tree(&tree), "{\n    a,\n    b,\n    c\n}");
//! ```

use std::borrow::Cow;

/// One element of an [`OTree`]'s prefix or children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Tree(OTree),
}

impl Fragment {
    /// Whether the fragment contributes nothing to the output.
    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Text(text) => text.is_empty(),
            Fragment::Tree(tree) => tree.is_empty(),
        }
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::Text(text.to_string())
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::Text(text)
    }
}

impl From<&String> for Fragment {
    fn from(text: &String) -> Self {
        Fragment::Text(text.clone())
    }
}

impl From<Cow<'_, str>> for Fragment {
    fn from(text: Cow<'_, str>) -> Self {
        Fragment::Text(text.into_owned())
    }
}

impl From<OTree> for Fragment {
    fn from(tree: OTree) -> Self {
        Fragment::Tree(tree)
    }
}

/// A missing fragment renders as nothing and is dropped on construction.
impl<T: Into<Fragment>> From<Option<T>> for Fragment {
    fn from(fragment: Option<T>) -> Self {
        fragment.map_or_else(|| Fragment::Text(String::new()), Into::into)
    }
}

/// Builds a `Vec<Fragment>` from expressions of mixed fragment types.
///
/// ```ignore
/// let parts = fragments!["if ", cx.convert(&cond), ":"];
/// ```
#[macro_export]
macro_rules! fragments {
    () => {
        ::std::vec::Vec::<$crate::Fragment>::new()
    };
    ($($fragment:expr),+ $(,)?) => {
        ::std::vec![$($crate::Fragment::from($fragment)),+]
    };
}

/// Layout options of an [`OTree`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeOptions {
    /// Emit a line break (at the new indentation) before the children.
    pub newline: bool,
    /// Indentation delta applied to the children.
    pub indent: i32,
    /// Written between two children when the first one produced
    /// non-whitespace output.
    pub separator: Option<String>,
    /// Written after the children, at the outer indentation.
    pub suffix: Option<String>,
    /// Ask the dispatcher to prepend the node's leading comments.
    pub attach_comment: bool,
    /// Render this tree at most once per render pass.
    pub render_once: Option<String>,
}

impl TreeOptions {
    pub const DEFAULT: Self = Self {
        newline: false,
        indent: 0,
        separator: None,
        suffix: None,
        attach_comment: false,
        render_once: None,
    };
}

/// An immutable node of target-language output.
///
/// Built once by a handler, then only read by the render sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OTree {
    prefix: Vec<Fragment>,
    children: Vec<Fragment>,
    options: TreeOptions,
}

impl OTree {
    /// The empty tree. Renders nothing and is dropped when embedded.
    pub const EMPTY: Self = Self {
        prefix: Vec::new(),
        children: Vec::new(),
        options: TreeOptions::DEFAULT,
    };

    /// A tree with the given prefix fragments and no children.
    pub fn new<F: Into<Fragment>>(prefix: impl IntoIterator<Item = F>) -> Self {
        Self {
            prefix: simplify(prefix),
            ..Self::EMPTY
        }
    }

    /// A tree consisting of a single piece of text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new([Fragment::Text(text.into())])
    }

    #[inline]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Replaces the children, dropping empty ones.
    pub fn children<F: Into<Fragment>>(mut self, children: impl IntoIterator<Item = F>) -> Self {
        self.children = simplify(children);
        self
    }

    pub fn indent(mut self, indent: i32) -> Self {
        self.options.indent = indent;
        self
    }

    pub fn newline(mut self) -> Self {
        self.options.newline = true;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.options.separator = Some(separator.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.options.suffix = Some(suffix.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn attach_comment(mut self) -> Self {
        self.options.attach_comment = true;
        self
    }

    pub fn render_once(mut self, key: impl Into<String>) -> Self {
        self.options.render_once = Some(key.into());
        self
    }

    /// True when the tree renders nothing regardless of its options.
    ///
    /// A bare `newline`/`indent`/`separator` never prints on its own, so only
    /// prefix, children and suffix count.
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.children.is_empty() && self.options.suffix.is_none()
    }

    #[inline]
    pub fn prefix(&self) -> &[Fragment] {
        &self.prefix
    }

    #[inline]
    pub fn child_fragments(&self) -> &[Fragment] {
        &self.children
    }

    #[inline]
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    #[inline]
    pub fn wants_comments(&self) -> bool {
        self.options.attach_comment
    }

    /// Number of trees in this tree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .prefix
            .iter()
            .chain(&self.children)
            .map(|fragment| match fragment {
                Fragment::Tree(tree) => tree.node_count(),
                Fragment::Text(_) => 0,
            })
            .sum::<usize>()
    }
}

impl From<&str> for OTree {
    fn from(text: &str) -> Self {
        OTree::text(text)
    }
}

impl From<String> for OTree {
    fn from(text: String) -> Self {
        OTree::text(text)
    }
}

fn simplify<F: Into<Fragment>>(fragments: impl IntoIterator<Item = F>) -> Vec<Fragment> {
    fragments
        .into_iter()
        .map(Into::into)
        .filter(|f: &Fragment| !f.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragments_dropped() {
        let tree = OTree::new(fragments!["a", "", OTree::empty(), None::<OTree>, "b"]);
        assert_eq!(tree.prefix().len(), 2);
    }

    #[test]
    fn test_is_empty_ignores_layout_options() {
        assert!(OTree::empty().is_empty());
        assert!(OTree::new(fragments![]).indent(4).newline().separator(", ").is_empty());
        assert!(!OTree::new(fragments![]).suffix(")").is_empty());
        assert!(OTree::new(fragments![]).suffix("").is_empty());
    }

    #[test]
    fn test_suffix_only_tree_renders() {
        let close = OTree::text("").children(fragments![""]).suffix("]");
        assert!(!close.is_empty());
        let tree = OTree::new(fragments!["[", close]);
        assert_eq!(crate::render_tree(&tree), "[]");
    }

    #[test]
    fn test_nested_empty_trees_collapse() {
        let inner = OTree::new(fragments![OTree::empty()]).children(fragments![""]);
        assert!(inner.is_empty());
        let outer = OTree::new(fragments!["x"]).children(fragments![inner, "y"]);
        assert_eq!(outer.child_fragments().len(), 1);
    }

    #[test]
    fn test_builder_options() {
        let tree = OTree::text("x")
            .indent(2)
            .newline()
            .separator("\n")
            .suffix(")")
            .attach_comment()
            .render_once("k");
        let options = tree.options();
        assert_eq!(options.indent, 2);
        assert!(options.newline);
        assert_eq!(options.separator.as_deref(), Some("\n"));
        assert_eq!(options.suffix.as_deref(), Some(")"));
        assert!(tree.wants_comments());
        assert_eq!(options.render_once.as_deref(), Some("k"));
    }

    #[test]
    fn test_node_count() {
        let tree = OTree::new(fragments![OTree::text("a")]).children(fragments![
            OTree::new(fragments![OTree::text("b")]),
            "c"
        ]);
        assert_eq!(tree.node_count(), 4);
    }
}
