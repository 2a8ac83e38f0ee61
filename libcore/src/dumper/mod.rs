//! Serializers turning an `AstNode` back into text.
mod base;
pub mod latex;
pub mod plain;

pub use latex::{dump_latex, render, LaTeX};
pub use plain::{dump, dump_with};
