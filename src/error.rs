//! Error types for the lineage analysis pipeline.
//!
//! This module provides structured error types using thiserror so that
//! per-file and per-package failures carry enough context to report
//! without unwinding the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// File system errors
    #[error("failed to read file '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// Parsing errors
    #[error("failed to parse {language} file '{path}': {reason}")]
    Parse {
        path: PathBuf,
        language: String,
        reason: String,
    },

    #[error("unsupported file type '{extension}' for file '{path}'. Supported types: .go, .java")]
    UnsupportedFileType { path: PathBuf, extension: String },

    #[error("no project root marker found under '{path}'")]
    NoProjectRoot { path: PathBuf },

    #[error("failed to export graph to '{path}': {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: crate::ir::exporter::ExportError,
    },

    /// Configuration errors
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("{0}")]
    General(String),
}

impl AnalysisError {
    /// Recovery suggestions for this error, surfaced by the CLI alongside
    /// the error message.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::NoProjectRoot { .. } => vec![
                "Pass --root explicitly, or add a go.mod/pom.xml marker",
                "Check that project_root_markers in flowlens.toml matches your layout",
            ],
            Self::UnsupportedFileType { .. } => vec![
                "Only .go and .java sources are analyzed",
                "Unsupported files are skipped, not fatal — check your --languages filter",
            ],
            Self::Io { .. } => vec![
                "Check that the file exists and you have read permissions",
            ],
            _ => vec![],
        }
    }
}

/// One file's outcome within a package analysis run. A failed file does
/// not abort the package — it is recorded and surfaced in the summary
/// (spec §7).
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed { path: PathBuf, edges_emitted: usize },
    Failed { path: PathBuf, error: AnalysisError },
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Helper trait for attaching a path to an arbitrary error while folding
/// it into [`AnalysisError`].
pub trait ErrorContext<T> {
    fn with_path(self, path: &std::path::Path) -> AnalysisResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path(self, path: &std::path::Path) -> AnalysisResult<T> {
        self.map_err(|e| AnalysisError::General(format!("error processing '{}': {e}", path.display())))
    }
}
