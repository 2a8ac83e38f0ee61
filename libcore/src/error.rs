use thiserror::Error;

/// Failures at the edges of the crate: loading catalogs and options,
/// exchanging trees, lexing text. Parsing and rendering never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid bincode: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("unexpected input at offset {offset}: {rest:?}")]
    Lex { offset: usize, rest: String },
}
