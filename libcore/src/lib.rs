//! Translates typeset math between an atom stream, a portable syntax tree and LaTeX.
//!
//! # Example
//!
//! ```latex
//! 2\sin^{-1} x + |y|
//! ```
//!
//! parses to
//!
//! ```text
//! 2*arcsin(x)+abs(y)
//! ```
//!
//! Operator precedences, canonical names and output templates come from a
//! [`Catalog`](context::Catalog) handed to the parser and the serializer.

#[macro_use]
extern crate maplit;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate vector_assertions;

pub mod ast;
pub mod atom;
pub mod context;
pub mod dumper;
pub mod error;
pub mod format;
pub mod parser;
pub mod transcript;

pub use ast::*;
pub use atom::{Atom, AtomKind};
pub use context::{Catalog, Context, Declaration};
pub use dumper::{dump_latex, render, LaTeX};
pub use error::Error;
pub use format::{FormatOptions, Notation};
pub use parser::lexer::tokenize;
pub use parser::{parse, parse_with_limits, ParseLimits};
pub use transcript::{Transcript, TranscriptEntry};
