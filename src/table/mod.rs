//! Wide-table persistence: semicolon-delimited CSV, schema header.
//!
//! Saving always writes UTF-8 with the header equal to the questionnaire
//! column list in schema order - this file is the flattener's sole externally
//! visible artifact. Loading is more forgiving: encoding is auto-detected
//! (tables round-tripped through spreadsheet tools come back as Latin-1 or
//! Windows-1252 more often than not), columns are matched by header name,
//! schema columns missing from the file stay empty and unknown columns are
//! ignored.

use std::path::Path;

use tracing::debug;

use crate::error::{TableError, TableResult};
use crate::models::{column_index, Record, WideTable, COLUMNS};

/// Field delimiter of flattened tables.
pub const DELIMITER: u8 = b';';

/// Write the table as a semicolon CSV with the full schema header.
pub fn save_table(table: &WideTable, path: &Path) -> TableResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)?;

    writer.write_record(COLUMNS.iter())?;
    for row in table.rows() {
        writer.write_record(row.values())?;
    }
    writer.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Load a flattened table from a semicolon CSV file.
pub fn load_table(path: &Path) -> TableResult<WideTable> {
    let bytes = std::fs::read(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    debug!(file = %path.display(), %encoding, "loading table");

    if content.trim().is_empty() {
        return Err(TableError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if !headers.iter().any(|h| column_index(h).is_some()) {
        return Err(TableError::MissingSchemaColumns);
    }

    let mut table = WideTable::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::empty();
        for (i, value) in row.iter().enumerate() {
            if let Some(column) = headers.get(i) {
                record.set(column, value);
            }
        }
        table.push(record);
    }
    Ok(table)
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding, lossy on the
/// fallback path.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> WideTable {
        let mut table = WideTable::new();
        let mut r = Record::empty();
        r.set("A-Name", "Alice");
        r.set("Department", "IT");
        r.set("Q1-IT", "Oui");
        r.set("Q2-Name1", "Bob");
        table.push(r);
        let mut r = Record::empty();
        r.set("A-Name", "Bob");
        r.set("Department", "Editorial");
        table.push(r);
        table
    }

    #[test]
    fn test_save_writes_schema_header_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_table(&sample_table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(";"));
        // 1 header + 2 data rows, no trailing index column
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_save_empty_table_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        save_table(&WideTable::new(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let table = sample_table();
        save_table(&table, &path).unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_partial_header_fills_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "A-Name;Department;Extra\nAlice;IT;whatever\n").unwrap();

        let table = load_table(&path).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.name(), "Alice");
        assert_eq!(row.department(), "IT");
        // Unknown column dropped, absent schema columns empty
        assert_eq!(row.get("Q1-IT"), Some(""));
    }

    #[test]
    fn test_load_empty_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(load_table(&path), Err(TableError::EmptyFile)));
    }

    #[test]
    fn test_load_foreign_header_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.csv");
        std::fs::write(&path, "id;title\n123;Report\n").unwrap();
        assert!(matches!(
            load_table(&path),
            Err(TableError::MissingSchemaColumns)
        ));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(matches!(
            load_table(Path::new("/no/such/table.csv")),
            Err(TableError::Io { .. })
        ));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect_encoding("A-Name;Department\n".as_bytes()), "utf-8");
    }
}
