//! Error types for decoding and the surrounding I/O.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// File could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON model configuration.
    #[error("invalid model configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Malformed line in a sequence file.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Parameters which do not describe a probability model.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Malformed command line value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("observation sequence is empty")]
    EmptySequence,

    /// The observation can not be emitted by the model at all.
    #[error("observation {value} at position {position} is out of range (the model has {symbols} symbols)")]
    ObservationOutOfRange {
        position: usize,
        value: u64,
        symbols: u64,
    },

    #[error("length mismatch: expected {expected} entries, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown state label {label:?} at line {line}")]
    UnknownLabel { line: usize, label: String },

    /// Every state path has probability zero under the model.
    #[error("no state path has a non-zero probability")]
    NoFeasiblePath,
}

pub type Result<T> = std::result::Result<T, Error>;
