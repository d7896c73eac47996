//! The dispatcher: recursive traversal from syntax nodes to output trees.
//!
//! [`Dispatcher::translate`] walks a tree from its root. Every node goes
//! through the same steps:
//!
//! 1. the recursion guard is entered (past the limit the node is emitted
//!    verbatim with an error diagnostic);
//! 2. [`Dispatch::dispatch`] picks the handler for the node's kind;
//! 3. unclaimed nodes follow the configured [`UnknownNodePolicy`] and are
//!    reported;
//! 4. output that asked for comments gets the node's leading trivia
//!    prepended.
//!
//! Handlers receive an [`AstContext`], the per-run object exposing
//! conversion of children, source text, trivia, the context stack,
//! diagnostics and the type oracle.

use std::cell::{Cell, RefCell};

use crate::config::{RecursionGuard, RenderStrategy, TranslateConfig, UnknownNodePolicy};
use crate::context::ContextStack;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::otree::{Fragment, OTree};
use crate::sink::render_tree_with;
use crate::traits::{Dispatch, NoTypeOracle, SyntaxNode, TypeOracle, Visitor};
use crate::trivia::{self, TriviaKind};
use crate::Error;

type DispatchFn<V> =
    fn(&<V as Visitor>::Node, &V, &AstContext<'_, V>) -> Option<OTree>;

/// Counters of one translation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateStats {
    /// Nodes handed to [`Dispatch::dispatch`].
    pub nodes_visited: usize,
    /// Contexts pushed by `convert_with` and friends.
    pub context_pushes: usize,
    /// Contexts popped again.
    pub context_pops: usize,
}

/// Output of [`Dispatcher::translate`].
#[derive(Debug, Clone)]
pub struct TranslateResult {
    pub tree: OTree,
    pub diagnostics: Diagnostics,
    pub stats: TranslateStats,
    render_strategy: RenderStrategy,
}

impl TranslateResult {
    /// Renders the output tree with the configured strategy.
    pub fn render(&self) -> String {
        render_tree_with(&self.tree, self.render_strategy)
    }

    pub fn render_with(&self, strategy: RenderStrategy) -> String {
        render_tree_with(&self.tree, strategy)
    }
}

/// Entry point of a translation: a visitor, an optional type oracle and a
/// configuration.
///
/// # Example
///
/// ```ignore
/// let result = Dispatcher::new(&PythonVisitor::default())
///     .with_config(TranslateConfig::new().strict())
///     .translate(source, &root)?;
/// println!("{}", result.render());
/// ```
pub struct Dispatcher<'a, V: Visitor> {
    visitor: &'a V,
    oracle: &'a dyn TypeOracle<V::Node>,
    config: TranslateConfig,
}

impl<'a, V: Visitor> Dispatcher<'a, V> {
    pub fn new(visitor: &'a V) -> Self {
        Self {
            visitor,
            oracle: &NoTypeOracle,
            config: TranslateConfig::DEFAULT,
        }
    }

    pub fn with_config(mut self, config: TranslateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_oracle(mut self, oracle: &'a dyn TypeOracle<V::Node>) -> Self {
        self.oracle = oracle;
        self
    }

    #[inline]
    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Translates the tree rooted at `root`, whose offsets refer to `source`.
    ///
    /// Unsupported syntax never fails the run; it shows up in the returned
    /// diagnostics. The only error is a context stack left unbalanced by a
    /// handler.
    pub fn translate(&self, source: &str, root: &V::Node) -> Result<TranslateResult, Error>
    where
        V::Node: Dispatch<V>,
    {
        let _span = tracing::debug_span!(
            "translate",
            source_len = source.len(),
            unknown_nodes = ?self.config.unknown_nodes,
        )
        .entered();

        let cx = AstContext::new(
            self.visitor,
            source,
            self.oracle,
            self.config,
            <V::Node as Dispatch<V>>::dispatch,
        );
        let expected = cx.contexts.depth();
        let tree = cx.convert(root);
        let found = cx.contexts.depth();
        if found != expected {
            return Err(Error::ContextImbalance { expected, found });
        }

        let stats = cx.stats();
        let diagnostics = cx.diagnostics.into_inner();
        tracing::debug!(
            nodes = stats.nodes_visited,
            output_trees = tree.node_count(),
            diagnostics = diagnostics.len(),
            "translation finished"
        );
        Ok(TranslateResult {
            tree,
            diagnostics,
            stats,
            render_strategy: self.config.render_strategy,
        })
    }
}

/// Translates `root` with `visitor` and the default configuration.
pub fn translate<V>(visitor: &V, source: &str, root: &V::Node) -> Result<TranslateResult, Error>
where
    V: Visitor,
    V::Node: Dispatch<V>,
{
    Dispatcher::new(visitor).translate(source, root)
}

/// Services available to handlers during one translation run.
pub struct AstContext<'a, V: Visitor> {
    visitor: &'a V,
    source: &'a str,
    oracle: &'a dyn TypeOracle<V::Node>,
    config: TranslateConfig,
    contexts: ContextStack<V::Context>,
    diagnostics: RefCell<Diagnostics>,
    depth: Cell<RecursionGuard>,
    visited: Cell<usize>,
    dispatch: DispatchFn<V>,
}

impl<'a, V: Visitor> AstContext<'a, V> {
    pub(crate) fn new(
        visitor: &'a V,
        source: &'a str,
        oracle: &'a dyn TypeOracle<V::Node>,
        config: TranslateConfig,
        dispatch: DispatchFn<V>,
    ) -> Self {
        Self {
            contexts: ContextStack::new(visitor.default_context()),
            visitor,
            source,
            oracle,
            config,
            diagnostics: RefCell::new(Diagnostics::new()),
            depth: Cell::new(RecursionGuard::new()),
            visited: Cell::new(0),
            dispatch,
        }
    }

    #[inline]
    pub fn visitor(&self) -> &'a V {
        self.visitor
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    // conversion

    /// Converts `node` under the current context.
    ///
    /// Output that asked for comments gets the node's leading comments,
    /// unless it is empty: empty output stays transparent to separators.
    pub fn convert(&self, node: &V::Node) -> OTree {
        let output = self.transform(node);
        if output.wants_comments() && !output.is_empty() {
            self.attach_leading_trivia(node, output)
        } else {
            output
        }
    }

    /// Converts `node` with `update` merged onto the current context.
    pub fn convert_with(&self, node: &V::Node, update: V::Context) -> OTree {
        let _guard = self.push_context(update);
        self.convert(node)
    }

    /// Converts `node` if present; an absent node converts to nothing.
    pub fn convert_opt(&self, node: Option<&V::Node>) -> OTree {
        node.map(|node| self.convert(node)).unwrap_or_default()
    }

    pub fn convert_all(&self, nodes: &[V::Node]) -> Vec<OTree> {
        nodes.iter().map(|node| self.convert(node)).collect()
    }

    /// Converts every node in `nodes` with `update` merged onto the current
    /// context.
    pub fn convert_all_with(&self, nodes: &[V::Node], update: V::Context) -> Vec<OTree> {
        let _guard = self.push_context(update);
        self.convert_all(nodes)
    }

    /// Runs `f` with `update` merged onto the current context.
    ///
    /// For handlers that convert several nodes, or go through helpers such
    /// as [`join_with_blank_lines`](crate::join_with_blank_lines), under one
    /// context.
    pub fn scoped<R>(&self, update: V::Context, f: impl FnOnce() -> R) -> R {
        let _guard = self.push_context(update);
        f()
    }

    fn push_context(&self, update: V::Context) -> crate::context::ContextGuard<'_, V::Context> {
        self.contexts
            .push(Some(update), |old, update| self.visitor.merge_context(old, update))
    }

    fn transform(&self, node: &V::Node) -> OTree {
        let mut depth = self.depth.get();
        if let Err(err) = depth.enter(self.config.max_recursion_depth) {
            tracing::warn!(kind = %node.kind_name(), %err, "emitting subtree verbatim");
            self.report(node, format!("{err}; subtree emitted verbatim"));
            return OTree::text(self.text_of(node));
        }
        self.depth.set(depth);
        self.visited.set(self.visited.get() + 1);
        tracing::trace!(kind = %node.kind_name(), start = node.start(), "dispatch");

        let output = (self.dispatch)(node, self.visitor, self)
            .or_else(|| self.visitor.fallback(node, self))
            .unwrap_or_else(|| self.unrecognized(node));

        let mut depth = self.depth.get();
        depth.exit();
        self.depth.set(depth);
        output
    }

    fn unrecognized(&self, node: &V::Node) -> OTree {
        self.report_unsupported(node);
        match self.config.unknown_nodes {
            UnknownNodePolicy::BestEffort => OTree::text(self.text_of(node)),
            UnknownNodePolicy::Strict => {
                let placeholder = format!("<{} {}>", node.kind_name(), self.text_of(node));
                let children = node.children();
                if children.is_empty() {
                    return OTree::text(placeholder);
                }
                OTree::text(placeholder)
                    .children(self.convert_all(&children))
                    .newline()
                    .separator("\n")
                    .indent(2)
            }
        }
    }

    /// Generic rendering for kinds a backend has no real translation for:
    /// `(Kind {info} text)` for leaves, and `(Kind {info}` followed by the
    /// converted children, one per line, for inner nodes.
    pub fn not_implemented(&self, node: &V::Node, info: Option<&str>) -> OTree {
        let mut head = format!("({}", node.kind_name());
        if let Some(info) = info.filter(|info| !info.is_empty()) {
            head.push_str(" {");
            head.push_str(info);
            head.push('}');
        }

        let children = node.children();
        if children.is_empty() {
            head.push(' ');
            head.push_str(self.text_of(node));
            return OTree::text(head).suffix(")");
        }
        OTree::text(head)
            .children(self.convert_all(&children))
            .newline()
            .separator("\n")
            .indent(2)
            .suffix(")")
    }

    // source text

    /// Source text of `node` without its leading trivia.
    pub fn text_of(&self, node: &V::Node) -> &'a str {
        self.text_at(node.start(), node.end())
    }

    /// Source text in `start..end`; empty when the range is invalid.
    pub fn text_at(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    /// Text from the end of `a` to the start of `b`.
    pub fn text_between(&self, a: &V::Node, b: &V::Node) -> &'a str {
        self.text_at(a.end(), b.start())
    }

    /// Text from the start of `a` to the start of `b`.
    pub fn text_from_to(&self, a: &V::Node, b: &V::Node) -> &'a str {
        self.text_at(a.start(), b.start())
    }

    // trivia

    /// Prepends the leading comments of `node` to `output`.
    ///
    /// Each comment is rendered through [`Visitor::comment_range`] and keyed
    /// by its position, so it prints once even when nested nodes sharing the
    /// same leading trivia all ask for it. Blank lines after a comment are
    /// kept (at most one per whitespace run); blank lines before the first
    /// comment belong to whoever separates `node` from its previous sibling.
    pub fn attach_leading_trivia(&self, node: &V::Node, output: OTree) -> OTree {
        let mut leading: Vec<Fragment> = Vec::new();
        let mut seen_comment = false;
        let mut owes_line_break = false;

        for span in trivia::scan(self.source, node.full_start(), None) {
            match span.kind {
                TriviaKind::Text => {
                    if !seen_comment {
                        continue;
                    }
                    let newlines = trivia::count_newlines(span.text(self.source));
                    let blank = newlines.saturating_sub(usize::from(owes_line_break));
                    if newlines > 0 {
                        owes_line_break = false;
                    }
                    if blank > 0 {
                        leading.push(
                            OTree::text("\n")
                                .render_once(format!("ws-{}", span.start))
                                .into(),
                        );
                    }
                }
                TriviaKind::LineComment | TriviaKind::BlockComment => {
                    seen_comment = true;
                    owes_line_break =
                        span.kind == TriviaKind::BlockComment && span.has_trailing_blank_line;
                    leading.push(
                        self.visitor
                            .comment_range(&span, self)
                            .render_once(format!("comment-{}", span.start))
                            .into(),
                    );
                }
            }
        }

        if leading.is_empty() {
            return output;
        }
        leading.push(output.into());
        OTree::new(leading)
    }

    /// `"\n" + suffix` if a line break precedes `node` in its leading
    /// trivia, `suffix` otherwise.
    pub fn mirror_newline_before(&self, node: Option<&V::Node>, suffix: &str) -> String {
        let breaks = node.is_some_and(|node| {
            trivia::scan(self.source, node.full_start(), None)
                .iter()
                .any(|span| match span.kind {
                    TriviaKind::Text => trivia::contains_newline(span.text(self.source)),
                    TriviaKind::LineComment => true,
                    TriviaKind::BlockComment => false,
                })
        });
        if breaks {
            format!("\n{suffix}")
        } else {
            suffix.to_string()
        }
    }

    /// Blank lines between sibling `a` and the following sibling `b`.
    ///
    /// Counts the naked newlines from the line break that ends `a`'s line up
    /// to `b`'s first leading comment (or first token).
    pub fn blank_lines_between(&self, a: &V::Node, b: &V::Node) -> usize {
        let (end, start) = (a.end(), b.start());
        if end >= start {
            return 0;
        }
        let from = trivia::next_line_start(self.source, end, start);
        let stop = trivia::scan(self.source, from, Some(start))
            .iter()
            .find(|span| span.is_comment())
            .map_or(start, |span| span.start);
        trivia::count_naked_newlines(self.text_at(from, stop))
    }

    // context stack

    /// The innermost context value.
    pub fn current_context(&self) -> V::Context {
        self.contexts.top()
    }

    /// Runs `f` on the innermost context without cloning it.
    pub fn with_context<R>(&self, f: impl FnOnce(&V::Context) -> R) -> R {
        self.contexts.with_top(f)
    }

    pub fn context_depth(&self) -> usize {
        self.contexts.depth()
    }

    // diagnostics

    /// Records an error about `node`.
    pub fn report(&self, node: &V::Node, message: impl Into<String>) {
        self.report_with(node, message, Severity::Error);
    }

    pub fn report_with(&self, node: &V::Node, message: impl Into<String>, severity: Severity) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            kind: node.kind_name(),
            start: node.start(),
            end: node.end(),
            message: message.into(),
            severity,
        });
    }

    /// Records the standard "not supported" error for `node`.
    pub fn report_unsupported(&self, node: &V::Node) {
        let kind = node.kind_name();
        tracing::warn!(%kind, start = node.start(), "unsupported syntax");
        self.report(
            node,
            format!("this language feature ({kind}) is not supported by the translation"),
        );
    }

    /// Number of diagnostics recorded so far.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    // types

    pub fn type_of_expression(&self, node: &V::Node) -> Option<<V::Node as SyntaxNode>::Type> {
        self.oracle.type_of_expression(node)
    }

    pub fn type_of_type(&self, node: &V::Node) -> Option<<V::Node as SyntaxNode>::Type> {
        self.oracle.type_of_type(node)
    }

    fn stats(&self) -> TranslateStats {
        TranslateStats {
            nodes_visited: self.visited.get(),
            context_pushes: self.contexts.push_count(),
            context_pops: self.contexts.pop_count(),
        }
    }
}
