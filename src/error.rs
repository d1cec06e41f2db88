use std::io;

use thiserror::Error;

/// An error that occurs while building, training, decoding or persisting a model.
#[derive(Debug, Error)]
pub enum HmmError {
    /// An I/O error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// A CSV read or write error (from the csv crate)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Zero state or symbol counts, or parameter vectors of the wrong length.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
    /// A model-validity checkpoint failed.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// An observation sequence that cannot be evaluated against the model.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
    #[error("training corpus is empty")]
    EmptyCorpus,
    /// A key the model layout requires is absent from the store.
    #[error("missing key `{0}` in model store")]
    MissingKey(String),
    #[error("malformed entry `{key}`: expected {expected} values, found {found}")]
    MalformedEntry {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = ::std::result::Result<T, HmmError>;
