//! Dataset rows and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata about the source dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the dataset was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// One dataset row: an ordered field-name to raw-value mapping.
///
/// Immutable once read. Identified by its original zero-based row index,
/// which stays stable through the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Zero-based position in the source dataset.
    pub row_index: usize,
    fields: IndexMap<String, String>,
}

impl Record {
    /// Create a record from an already-built field map.
    pub fn new(row_index: usize, fields: IndexMap<String, String>) -> Self {
        Self { row_index, fields }
    }

    /// Create a record from (field, value) pairs, preserving order.
    pub fn from_pairs<K, V>(row_index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { row_index, fields }
    }

    /// Get the raw value of a field, if the record carries it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate over (field, value) pairs in original column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields present in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if a raw value counts as blank (absent in spirit).
    pub fn is_blank_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed == "-"
    }
}

/// An ordered collection of records sharing one header schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Rows, in file order.
    pub records: Vec<Record>,
}

impl Dataset {
    /// Create a new dataset.
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Number of columns in the header schema.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Position of a header by name.
    pub fn header_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_field_order() {
        let record = Record::from_pairs(0, [("cpf", "123"), ("email", "a@b.com"), ("cep", "")]);
        let names: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["cpf", "email", "cep"]);
    }

    #[test]
    fn test_record_get_missing_field() {
        let record = Record::from_pairs(3, [("cpf", "123")]);
        assert_eq!(record.get("cpf"), Some("123"));
        assert_eq!(record.get("email"), None);
        assert_eq!(record.row_index, 3);
    }

    #[test]
    fn test_blank_values() {
        assert!(Record::is_blank_value(""));
        assert!(Record::is_blank_value("  "));
        assert!(Record::is_blank_value("NA"));
        assert!(Record::is_blank_value("null"));
        assert!(Record::is_blank_value("-"));
        assert!(!Record::is_blank_value("0"));
        assert!(!Record::is_blank_value("não"));
    }
}
