//! Directory flattening: many single-respondent XFDF files, one wide table.
//!
//! ```text
//! answers/             ┌──────────────────────────────┐
//! ├── form_a.xfdf  ──▶ │ A-Name;Department;Q1-IT;...  │
//! ├── form_b.xfdf  ──▶ │ Alice;IT;Oui;...             │
//! └── notes.txt (skip) │ Bob;Editorial;;...           │
//!                      └──────────────────────────────┘
//! ```
//!
//! Files are selected by their `.xfdf` extension (case-insensitive) and
//! processed in file-name order, so the same directory always flattens to the
//! same table. Fields whose name is not a schema column are ignored; schema
//! columns absent from a file stay empty strings.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FlattenError, FlattenResult};
use crate::models::{Record, WideTable};
use crate::parser::parse_xfdf;

/// Extension of respondent record files.
const RECORD_EXTENSION: &str = ".xfdf";

/// Options for a flattening run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlattenOptions {
    /// Skip malformed record files and report them, instead of aborting the
    /// whole batch on the first one. Off by default: one bad file ends the
    /// batch.
    pub skip_invalid: bool,
}

/// A record file left out of the batch, with the reason why.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a flattening run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenReport {
    /// One row per successfully parsed record file, in file-name order.
    #[serde(skip)]
    pub table: WideTable,
    /// Malformed files, only populated with [`FlattenOptions::skip_invalid`].
    pub skipped: Vec<SkippedFile>,
    /// Directory entries that did not look like record files.
    pub ignored_count: usize,
}

/// Flatten every `.xfdf` file of `dir` into a wide table.
///
/// An empty directory (or one without any record file) yields an empty
/// table, not an error. A malformed file aborts the batch unless
/// `options.skip_invalid` is set, in which case it lands in
/// [`FlattenReport::skipped`].
pub fn flatten_dir(dir: &Path, options: &FlattenOptions) -> FlattenResult<FlattenReport> {
    let entries = std::fs::read_dir(dir).map_err(|source| FlattenError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut record_files: Vec<PathBuf> = Vec::new();
    let mut ignored_count = 0usize;
    for entry in entries {
        let entry = entry.map_err(|source| FlattenError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if is_record_file(&path) {
            record_files.push(path);
        } else {
            ignored_count += 1;
        }
    }
    // Platform enumeration order is unspecified; sort for reproducible rows.
    record_files.sort();

    debug!(
        directory = %dir.display(),
        files = record_files.len(),
        ignored = ignored_count,
        "flattening directory"
    );

    let mut report = FlattenReport {
        ignored_count,
        ..Default::default()
    };
    for path in record_files {
        match flatten_file(&path) {
            Ok(record) => report.table.push(record),
            Err(e) if options.skip_invalid => {
                warn!(file = %path.display(), error = %e, "skipping malformed record file");
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Flatten a single record file into one schema row.
pub fn flatten_file(path: &Path) -> FlattenResult<Record> {
    let file = File::open(path).map_err(|source| FlattenError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let fields = parse_xfdf(BufReader::new(file)).map_err(|source| FlattenError::Xfdf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut record = Record::empty();
    for field in fields {
        if !record.set(&field.name, field.value) {
            debug!(file = %path.display(), field = %field.name, "ignoring unknown field");
        }
    }
    Ok(record)
}

fn is_record_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_lowercase().ends_with(RECORD_EXTENSION))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_form(dir: &Path, file: &str, fields: &str) {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdf xmlns="http://ns.adobe.com/xfdf/"><fields>{fields}</fields></xfdf>"#
        );
        fs::write(dir.join(file), xml).unwrap();
    }

    fn field(name: &str, value: &str) -> String {
        format!(r#"<field name="{name}"><value>{value}</value></field>"#)
    }

    #[test]
    fn test_flatten_empty_dir_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let report = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap();
        assert!(report.table.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_flatten_missing_dir_is_error() {
        let err = flatten_dir(Path::new("/no/such/dir"), &FlattenOptions::default()).unwrap_err();
        assert!(matches!(err, FlattenError::ReadDir { .. }));
    }

    #[test]
    fn test_rows_follow_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_form(dir.path(), "b.xfdf", &field("A-Name", "Bob"));
        write_form(dir.path(), "a.xfdf", &field("A-Name", "Alice"));
        write_form(dir.path(), "c.XFDF", &field("A-Name", "Carol"));

        let report = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap();
        let names: Vec<&str> = report.table.rows().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_non_xfdf_files_skipped_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        write_form(dir.path(), "a.xfdf", &field("A-Name", "Alice"));
        fs::write(dir.path().join("notes.txt"), "not xml at all").unwrap();

        let report = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap();
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.ignored_count, 1);
    }

    #[test]
    fn test_omitted_fields_stay_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_form(
            dir.path(),
            "a.xfdf",
            &format!("{}{}", field("A-Name", "Alice"), field("Q1-IT", "Oui")),
        );

        let report = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap();
        let row = &report.table.rows()[0];
        assert_eq!(row.get("Q1-IT"), Some("Oui"));
        assert_eq!(row.get("Department"), Some(""));
        assert_eq!(row.get("Q2-Name1"), Some(""));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_form(
            dir.path(),
            "a.xfdf",
            &format!("{}{}", field("A-Name", "Alice"), field("Signature", "xyz")),
        );

        let report = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap();
        assert_eq!(report.table.rows()[0].name(), "Alice");
    }

    #[test]
    fn test_malformed_file_aborts_batch_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write_form(dir.path(), "a.xfdf", &field("A-Name", "Alice"));
        fs::write(dir.path().join("bad.xfdf"), "<xfdf><oops></xfdf>").unwrap();

        let err = flatten_dir(dir.path(), &FlattenOptions::default()).unwrap_err();
        assert!(matches!(err, FlattenError::Xfdf { .. }));
        assert!(err.to_string().contains("bad.xfdf"));
    }

    #[test]
    fn test_skip_invalid_reports_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        write_form(dir.path(), "a.xfdf", &field("A-Name", "Alice"));
        fs::write(dir.path().join("bad.xfdf"), "<xfdf><oops></xfdf>").unwrap();
        write_form(dir.path(), "z.xfdf", &field("A-Name", "Zoe"));

        let options = FlattenOptions { skip_invalid: true };
        let report = flatten_dir(dir.path(), &options).unwrap();
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("bad.xfdf"));
    }
}
