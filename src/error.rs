//! Error types for the Cairo static analyzer.
//!
//! The analyzer's propagation policy (spec.md §7) is deliberately narrow:
//! only unambiguous environmental failures become a `Result` error. File-level
//! parse failures, unresolved imports, and per-function analysis failures are
//! recorded as data (parse warnings, stub entries, per-function error
//! strings) and never abort the pipeline. `AnalyzerError` exists only for
//! what spec.md §7 calls "Input errors".

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for the analyzer pipeline.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

/// Helper trait for attaching a path to an I/O error.
pub trait ErrorContext<T> {
    fn with_path(self, path: &std::path::Path) -> AnalyzerResult<T>;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_path(self, path: &std::path::Path) -> AnalyzerResult<T> {
        self.map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result type alias for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
