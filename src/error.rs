//! Error types for the survey flattening and reshaping engine.
//!
//! This module defines a hierarchy of error types, one per pipeline stage:
//!
//! - [`FlattenError`] - XFDF directory flattening errors
//! - [`TableError`] - wide-table CSV load/save errors
//! - [`ReshapeError`] - view reshaping errors
//! - [`EngineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Question;
use crate::parser::XfdfError;
use crate::reshape::views::ViewKind;

// =============================================================================
// Flattening Errors
// =============================================================================

/// Errors during XFDF directory flattening.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Source directory cannot be listed.
    #[error("Cannot list directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A record file cannot be read.
    #[error("Cannot read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A record file is not well-formed XFDF.
    ///
    /// With the default abort policy this ends the whole batch; with
    /// skip-and-report the file is recorded and the batch continues.
    #[error("Malformed XFDF file '{path}': {source}")]
    Xfdf { path: PathBuf, source: XfdfError },
}

// =============================================================================
// Wide-Table IO Errors
// =============================================================================

/// Errors while loading or saving a flattened CSV table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read or write the table file.
    #[error("Cannot access file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header shares no column with the questionnaire schema.
    #[error("No questionnaire columns found in CSV header")]
    MissingSchemaColumns,
}

// =============================================================================
// Reshaping Errors
// =============================================================================

/// Errors during view reshaping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReshapeError {
    /// The question key is not part of the questionnaire.
    #[error("Unknown question '{0}' (expected one of: Department, Q1, Q2, Q3, Q4)")]
    UnknownQuestion(String),

    /// The view kind string is not recognized.
    #[error("Unknown view kind '{0}' (expected one of: counts, contingency, network, long)")]
    UnknownView(String),

    /// The (question, view) pair is not offered by the engine.
    ///
    /// Contingency and network views only exist for Q2. The engine rejects
    /// other combinations instead of silently downgrading them.
    #[error("View '{view}' is not available for question {question}")]
    UnsupportedView { question: Question, view: ViewKind },

    /// No table loaded, or the question filter produced zero rows.
    ///
    /// Recoverable: callers should render an empty-state placeholder.
    #[error("No data to display for question {question}")]
    EmptySource { question: Question },
}

// =============================================================================
// Engine Errors (top-level)
// =============================================================================

/// Top-level engine errors.
///
/// Wraps all stage errors so CLI commands can propagate with `?`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Flattening error.
    #[error("Flatten error: {0}")]
    Flatten(#[from] FlattenError),

    /// Table IO error.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Reshaping error.
    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for flattening operations.
pub type FlattenResult<T> = Result<T, FlattenError>;

/// Result type for table IO operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for reshaping operations.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Result type for top-level engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ReshapeError -> EngineError
        let reshape_err = ReshapeError::UnknownQuestion("Q7".into());
        let engine_err: EngineError = reshape_err.into();
        assert!(engine_err.to_string().contains("Q7"));

        // TableError -> EngineError
        let table_err = TableError::EmptyFile;
        let engine_err: EngineError = table_err.into();
        assert!(engine_err.to_string().contains("empty"));
    }

    #[test]
    fn test_unsupported_view_message() {
        let err = ReshapeError::UnsupportedView {
            question: Question::Q1,
            view: ViewKind::Network,
        };
        let msg = err.to_string();
        assert!(msg.contains("network"));
        assert!(msg.contains("Q1"));
    }
}
