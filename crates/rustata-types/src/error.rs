//! Error types for rustata.

use std::io;

/// Errors produced by the rustata shell and its engines.
///
/// `Syntax` and `Computation` display as the bare message because the read
/// loop prints them directly to the operator; the remaining variants carry a
/// short prefix naming the failing layer.
#[derive(Debug, thiserror::Error)]
pub enum RustataError {
    /// Malformed command line, disallowed clause/option, unknown variable.
    #[error("{0}")]
    Syntax(String),

    /// A statistical procedure could not be carried out on the given data.
    #[error("{0}")]
    Computation(String),

    /// Dataset resolution failed; `{0}` is the file name that was tried.
    #[error("file \"{0}\" not found")]
    DatasetNotFound(String),

    /// Malformed dataset metadata sidecar.
    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RustataError {
    /// Shorthand for the common syntax-failure construction.
    pub fn syntax(msg: impl Into<String>) -> Self {
        RustataError::Syntax(msg.into())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RustataError>;
