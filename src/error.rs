//! Error types for the sigmoid-mlp library

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Layer sizes that cannot form a network
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Learning rate must be finite and positive
    #[error("invalid learning rate {0}: must be finite and positive")]
    InvalidLearningRate(f64),

    /// A vector disagrees with the layer it is fed to
    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Parallel input/target sequences of different lengths
    #[error("got {inputs} inputs but {targets} targets")]
    LengthMismatch { inputs: usize, targets: usize },

    /// Malformed IDX data
    #[error("format error: {0}")]
    Format(String),

    /// Unusable training configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error on a specific file
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn dimension(what: &'static str, expected: usize, actual: usize) -> Error {
        Error::DimensionMismatch { what, expected, actual }
    }
}
