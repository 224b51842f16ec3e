//! Report document rendering and sinks.
//!
//! The emitter is fully determined by the [`ReportModel`]: rendering the
//! same model with the same timestamp is byte-for-byte reproducible. The
//! timestamp is the single `generated_at` field and nothing else varies
//! between runs.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::report::ReportModel;

/// One line of the summary section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub rule_id: String,
    pub field: String,
    pub failures: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// One failure within a detail row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFailure {
    pub rule_id: String,
    pub field: String,
    pub reason: FailReason,
    pub severity: Severity,
}

/// One line of the detail section: one original record with its failures
/// (empty for a clean record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub row_index: usize,
    pub is_valid: bool,
    pub failures: Vec<DetailFailure>,
}

/// The rendered two-section report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// When the report was rendered. The only field that varies between
    /// re-emissions of the same model.
    pub generated_at: DateTime<Utc>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    /// Summary: one line per rule, plan order.
    pub summary: Vec<SummaryLine>,
    /// Detail: one line per original record, in row order.
    pub details: Vec<DetailRow>,
}

impl ReportDocument {
    /// Render a model, stamping the current time.
    pub fn from_model(model: &ReportModel) -> Self {
        Self::from_model_at(model, Utc::now())
    }

    /// Render a model with an explicit timestamp.
    pub fn from_model_at(model: &ReportModel, generated_at: DateTime<Utc>) -> Self {
        let summary = model
            .rule_totals
            .iter()
            .map(|t| SummaryLine {
                rule_id: t.rule_id.clone(),
                field: t.field.clone(),
                failures: t.failures,
                errors: t.errors,
                warnings: t.warnings,
            })
            .collect();

        let mut details = Vec::new();
        for row in &model.rows {
            let mut failures = Vec::new();
            for outcome in row.failures() {
                if let ValidationOutcome::Fail { reason, severity } = outcome.outcome {
                    failures.push(DetailFailure {
                        rule_id: outcome.rule_id.clone(),
                        field: outcome.field.clone(),
                        reason,
                        severity,
                    });
                }
            }
            details.push(DetailRow {
                row_index: row.row_index,
                is_valid: row.is_valid,
                failures,
            });
        }

        Self {
            generated_at,
            total_rows: model.total_rows,
            valid_rows: model.valid_rows,
            invalid_rows: model.invalid_rows,
            summary,
            details,
        }
    }
}

/// A destination for a rendered report.
pub trait ReportSink {
    /// Persist the document. Implementations must be all-or-nothing: on
    /// error, no partial artifact remains visible.
    fn write(&mut self, document: &ReportDocument) -> Result<()>;
}

/// Serializes the document as pretty-printed JSON.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn write(&mut self, document: &ReportDocument) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, document)?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| VerdictError::Io {
                path: "<sink>".into(),
                source: e,
            })?;
        Ok(())
    }
}

/// Writes the summary section then the detail section as CSV tables,
/// separated by a blank line.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn write(&mut self, document: &ReportDocument) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut self.writer);

        // Header counters, one labeled record each
        let generated_at = document.generated_at.to_rfc3339();
        csv.write_record(["generated_at", generated_at.as_str()])?;
        csv.write_record(["total_rows", document.total_rows.to_string().as_str()])?;
        csv.write_record(["valid_rows", document.valid_rows.to_string().as_str()])?;
        csv.write_record(["invalid_rows", document.invalid_rows.to_string().as_str()])?;
        csv.write_record([""])?;

        // Summary section
        csv.write_record(["rule", "field", "failures", "errors", "warnings"])?;
        for line in &document.summary {
            let failures = line.failures.to_string();
            let errors = line.errors.to_string();
            let warnings = line.warnings.to_string();
            csv.write_record([
                line.rule_id.as_str(),
                line.field.as_str(),
                failures.as_str(),
                errors.as_str(),
                warnings.as_str(),
            ])?;
        }
        csv.write_record([""])?;

        // Detail section: one line per record, failures joined in one cell
        csv.write_record(["row", "valid", "failures"])?;
        for line in &document.details {
            let row = line.row_index.to_string();
            let failures = line
                .failures
                .iter()
                .map(|f| {
                    format!(
                        "{}: {} ({})",
                        f.rule_id,
                        f.reason.label(),
                        f.severity.label()
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            csv.write_record([
                row.as_str(),
                if line.is_valid { "true" } else { "false" },
                failures.as_str(),
            ])?;
        }

        csv.flush().map_err(|e| VerdictError::Io {
            path: "<sink>".into(),
            source: e,
        })?;
        Ok(())
    }
}

/// Report artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use json or csv.", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Render the document to memory.
pub fn render(document: &ReportDocument, format: ReportFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        ReportFormat::Json => JsonSink::new(&mut buffer).write(document)?,
        ReportFormat::Csv => CsvSink::new(&mut buffer).write(document)?,
    }
    Ok(buffer)
}

/// Render the document and write the file in one operation.
///
/// The artifact is fully rendered in memory first, so a failure never
/// leaves a partial report behind.
pub fn emit_to_path(
    document: &ReportDocument,
    path: impl AsRef<Path>,
    format: ReportFormat,
) -> Result<()> {
    let path = path.as_ref();
    let buffer = render(document, format)?;
    fs::write(path, buffer).map_err(|e| VerdictError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
