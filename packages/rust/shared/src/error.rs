//! Error types for readmegen.
//!
//! Library crates use [`ReadmeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all readmegen operations.
#[derive(Debug, thiserror::Error)]
pub enum ReadmeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The remote API answered but reported errors (bad credential, bad query).
    #[error("API error: {0}")]
    Api(String),

    /// Malformed or unexpected response shape, or an unparseable date.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReadmeError>;

impl ReadmeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ReadmeError::config("unknown query variant");
        assert_eq!(err.to_string(), "config error: unknown query variant");

        let err = ReadmeError::Api("Bad credentials".into());
        assert_eq!(err.to_string(), "API error: Bad credentials");

        let err = ReadmeError::parse("missing field `nodes`");
        assert!(err.to_string().contains("`nodes`"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = ReadmeError::io(
            "README.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("README.md"));
        assert!(matches!(err, ReadmeError::Io { .. }));
    }
}
