//! Error types for the engine.

use thiserror::Error;

/// Boxed error produced by caller-supplied surface and field functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type shared by every paramsurf crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed uv ranges, resolution or epsilon
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Tween scheduled with a bad duration, target or easing curve
    #[error("Invalid tween: {0}")]
    InvalidTween(String),

    /// Colormap with too few stops or out-of-order stop positions
    #[error("Invalid colormap: {0}")]
    InvalidColorMap(String),

    /// Scene graph misuse (unknown node path, mismatched inputs)
    #[error("Scene error: {0}")]
    Scene(String),

    /// A caller-supplied function failed; the original error is the source
    #[error("Function evaluation failed: {0}")]
    Evaluation(#[source] BoxError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an error raised by a caller-supplied function.
    pub fn evaluation(err: impl Into<BoxError>) -> Self {
        Self::Evaluation(err.into())
    }
}

/// Result type alias using the engine's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_evaluation_keeps_source() {
        let err = Error::evaluation("field blew up");
        assert_eq!(err.to_string(), "Function evaluation failed: field blew up");
        let source = err.source().expect("evaluation errors carry a source");
        assert_eq!(source.to_string(), "field blew up");
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::InvalidDomain("nu < 2".into()).to_string(),
            "Invalid domain: nu < 2"
        );
        assert_eq!(
            Error::InvalidTween("negative duration".into()).to_string(),
            "Invalid tween: negative duration"
        );
    }
}
