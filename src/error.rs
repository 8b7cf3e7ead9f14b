//! Error types for anaphora.

use thiserror::Error;

/// Result type for anaphora operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for anaphora operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Model weight loading failed (missing or malformed artifact).
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    /// Weight/feature dimension mismatch. Fatal configuration error:
    /// the weight shapes must agree with the feature extractor's layout.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    Dimension {
        /// Where the mismatch was detected (layer or vector name).
        context: String,
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (embedding table, word counts, weight file).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resolution was cancelled cooperatively. The document's partial
    /// cluster state is unusable as a whole; callers may retry or skip.
    #[error("Resolution interrupted")]
    Interrupted,
}

impl Error {
    /// Create a model load error.
    pub fn model_load(msg: impl Into<String>) -> Self {
        Error::ModelLoad(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::Dimension {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// True if this error is the cooperative cancellation signal.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_error_formats_context() {
        let err = Error::dimension("pair projection", 40, 32);
        let msg = err.to_string();
        assert!(msg.contains("pair projection"));
        assert!(msg.contains("40"));
        assert!(msg.contains("32"));
    }

    #[test]
    fn interrupted_is_distinguishable() {
        assert!(Error::Interrupted.is_interrupted());
        assert!(!Error::parse("x").is_interrupted());
    }
}
