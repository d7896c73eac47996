#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! TypeScript to Python Example
//!
//! This example demonstrates a complete transkit pipeline: a `logos` lexer
//! and a recursive descent parser for a small TypeScript subset, and a
//! Python backend built on a `declare_visitor!` handler trait.
//!
//! # Features
//!
//! - Comments and blank lines carried over into the output
//! - Object literals as last call argument become keyword arguments
//! - A literal-type oracle used to coerce `"a" + 1` into `"a" + str(1)`
//! - Unsupported syntax (`while`) degrades to verbatim text plus a diagnostic
//!
//! # Example
//!
//! ```ignore
//! let translation = mini_ts::to_python("console.log(fooBar);")?;
//! assert_eq!(translation.code, "print(foo_bar)");
//! ```

use core::ops::Range;

use thiserror::Error;
use transkit::{Diagnostics, Dispatcher, TranslateConfig};

pub mod lexer;
pub mod parser;
pub mod python;
pub mod syntax;
pub mod types;

pub use python::{PythonContext, PythonVisitor};
pub use syntax::{SyntaxKind, TsNode, TsVisitor};
pub use types::{LiteralTypes, TsType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid token at {span:?}")]
    InvalidToken { span: Range<usize> },

    #[error("expected {expect}, found {found} at {at}")]
    Expected {
        expect: &'static str,
        found: String,
        at: usize,
    },

    #[error("expected {expect}, found EOF")]
    Empty { expect: &'static str },

    #[error("{0}")]
    TooDeep(#[from] transkit::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translate(#[from] transkit::Error),
}

/// Parses `source` into a [`SyntaxKind::SourceFile`] tree.
pub fn parse(source: &str) -> Result<TsNode, ParseError> {
    parser::Parser::new(source)?.parse_source_file()
}

/// Python code plus whatever could not be translated.
#[derive(Debug, Clone)]
pub struct Translation {
    pub code: String,
    pub diagnostics: Diagnostics,
}

/// Translates `source` to Python with the default configuration.
pub fn to_python(source: &str) -> Result<Translation, Error> {
    to_python_with(source, TranslateConfig::DEFAULT)
}

pub fn to_python_with(source: &str, config: TranslateConfig) -> Result<Translation, Error> {
    let root = parse(source)?;
    let result = Dispatcher::new(&PythonVisitor)
        .with_config(config)
        .with_oracle(&LiteralTypes)
        .translate(source, &root)?;
    let code = result.render();
    tracing::debug!(
        diagnostics = result.diagnostics.len(),
        lines = code.lines().count(),
        "translated to python"
    );
    Ok(Translation {
        code,
        diagnostics: result.diagnostics,
    })
}

/// Renders the syntax tree of `source` as an s-expression.
pub fn visualize(source: &str) -> Result<String, Error> {
    let root = parse(source)?;
    Ok(transkit::visualize(source, &root)?)
}
