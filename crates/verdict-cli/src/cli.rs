//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use verdict::ReportFormat;

/// Verdict: field-level validation for tabular customer datasets
#[derive(Parser)]
#[command(name = "verdict")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a dataset file and write the validation report
    Check {
        /// Path to the dataset file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rule file (JSON); rules are inferred from headers when omitted
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output path for the report (default: <file>.report.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, default_value = "json")]
        format: ReportFormat,

        /// Skip remote lookups; referential rules fall back to local checks
        #[arg(long)]
        offline: bool,

        /// Failure severity that marks a row invalid
        #[arg(long, default_value = "error")]
        fail_on: SeverityChoice,

        /// Attempts per lookup call before degrading to a warning
        #[arg(long, default_value = "3")]
        retries: u32,
    },

    /// List registered validators, or the rules inferred for given headers
    Rules {
        /// Headers to infer rules for
        #[arg(value_name = "HEADER")]
        headers: Vec<String>,
    },
}

/// Failure severity threshold choice.
#[derive(Clone, Copy, Debug, Default)]
pub enum SeverityChoice {
    Info,
    Warning,
    #[default]
    Error,
}

impl SeverityChoice {
    pub fn to_severity(self) -> verdict::Severity {
        match self {
            SeverityChoice::Info => verdict::Severity::Info,
            SeverityChoice::Warning => verdict::Severity::Warning,
            SeverityChoice::Error => verdict::Severity::Error,
        }
    }
}

impl std::str::FromStr for SeverityChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(SeverityChoice::Info),
            "warning" | "warn" => Ok(SeverityChoice::Warning),
            "error" => Ok(SeverityChoice::Error),
            _ => Err(format!(
                "Unknown severity: {}. Use info, warning, or error.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SeverityChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityChoice::Info => write!(f, "info"),
            SeverityChoice::Warning => write!(f, "warning"),
            SeverityChoice::Error => write!(f, "error"),
        }
    }
}
