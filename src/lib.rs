//! # Sondage - survey form flattening and view reshaping
//!
//! Sondage turns a folder of filled-in XFDF survey forms into a single wide
//! table, then reshapes that table into the dataset behind each analysis
//! view (counts, contingency matrix, relation network, long table).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XFDF forms  │────▶│  Flattener  │────▶│  WideTable  │────▶│  Reshaper   │
//! │ (one/resp.) │     │ (32-col map)│     │  (CSV ";")  │     │ (4 views)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sondage::{flatten_dir, reshape, FlattenOptions, Question, ViewKind};
//!
//! fn main() {
//!     let report = flatten_dir(Path::new("forms"), &FlattenOptions::default()).unwrap();
//!     let dataset = reshape(&report.table, Question::Q1, ViewKind::Counts).unwrap();
//!     println!("{} categories", match dataset {
//!         sondage::ViewDataset::Counts(rows) => rows.len(),
//!         _ => unreachable!(),
//!     });
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Column schema, questions, records, wide table
//! - [`parser`] - XFDF form parsing
//! - [`flatten`] - Directory of forms to wide table
//! - [`table`] - Semicolon-CSV persistence with encoding auto-detection
//! - [`reshape`] - Wide table to per-view datasets

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Flattening
pub mod flatten;

// Table persistence
pub mod table;

// Reshaping
pub mod reshape;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EngineError,
    EngineResult,
    FlattenError,
    ReshapeError,
    TableError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    column_index,
    Question,
    Record,
    WideTable,
    CATEGORIES,
    COLUMNS,
    NO_ANSWER,
    YES,
};

// =============================================================================
// Re-exports - XFDF Parsing
// =============================================================================

pub use parser::{parse_xfdf, XfdfError, XfdfField};

// =============================================================================
// Re-exports - Flattener
// =============================================================================

pub use flatten::{flatten_dir, flatten_file, FlattenOptions, FlattenReport, SkippedFile};

// =============================================================================
// Re-exports - Table persistence
// =============================================================================

pub use table::{detect_encoding, load_table, save_table};

// =============================================================================
// Re-exports - Reshaper
// =============================================================================

pub use reshape::{long_rows, parse_question, parse_view_kind, reshape};

pub use reshape::views::{
    ContingencyCell,
    ContingencyTable,
    CountRow,
    GraphEdge,
    GraphNode,
    LongRow,
    NodeTag,
    RelationGraph,
    ViewDataset,
    ViewKind,
};

pub use reshape::top_n::{MAX_CATEGORIES, OTHER_LABEL};
