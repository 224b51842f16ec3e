//! Verdict: field-level validation pipeline for tabular customer datasets.
//!
//! Verdict maps dataset columns to named validators (Brazilian registry
//! documents, email, phone, postal codes, remote registry lookups), runs
//! them over every row, and aggregates the outcomes into a deterministic
//! two-section report.
//!
//! # Core Principles
//!
//! - **No row left behind**: every record produces exactly one row result,
//!   one outcome per bound rule; a bad value is data in the report, never a
//!   fault.
//! - **Bind once**: rules resolve against the schema before any row runs;
//!   configuration problems fail fast, before processing.
//! - **Degrade, don't abort**: a flaky lookup service is retried, then
//!   downgraded to a warning; the batch always completes.
//!
//! # Example
//!
//! ```no_run
//! use verdict::{Pipeline, RuleSet};
//!
//! let pipeline = Pipeline::new();
//! let rules = RuleSet::infer(&["cpf".to_string(), "email".to_string()]);
//! let result = pipeline.check_file("customers.csv", &rules).unwrap();
//!
//! println!("Rows: {}", result.model.total_rows);
//! println!("Invalid: {}", result.model.invalid_rows);
//! ```

pub mod emit;
pub mod engine;
pub mod error;
pub mod input;
pub mod registry;
pub mod report;
pub mod rule;
pub mod validators;

mod outcome;
mod pipeline;

pub use emit::{
    CsvSink, DetailFailure, DetailRow, JsonSink, ReportDocument, ReportFormat, ReportSink,
    SummaryLine, emit_to_path,
};
pub use engine::{Engine, EngineConfig, EngineHook, RetryPolicy};
pub use error::{Result, VerdictError};
pub use input::{Dataset, DatasetReader, ReaderConfig, Record, SourceMetadata};
pub use outcome::{FailReason, Severity, ValidationOutcome};
pub use pipeline::{FailureCounts, Pipeline, PipelineConfig, RunResult, RunSummary};
pub use registry::{Registry, Validator};
pub use report::{ReportModel, RowResult, RuleOutcome, RuleTally};
pub use rule::{BoundRule, ExecutionPlan, FieldSelector, Rule, RuleParams, RuleSet};
