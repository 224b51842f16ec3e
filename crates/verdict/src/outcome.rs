//! Outcome types for individual validator applications.

use serde::{Deserialize, Serialize};

/// Severity level of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Why a value failed validation.
///
/// A closed set of message categories, not free text, so that failures can
/// be tallied and compared across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// The rule's target field is absent from the record.
    MissingField,
    /// A required field is present but empty.
    EmptyValue,
    /// Value contains characters or structure the grammar does not allow.
    InvalidFormat,
    /// Value has the wrong number of digits/characters.
    InvalidLength,
    /// Check digits do not verify.
    InvalidChecksum,
    /// A lookup answered, but its payload disagrees with the record.
    Mismatch,
    /// The lookup service answered: no such entry.
    NotFound,
    /// The lookup service could not be reached or answered abnormally.
    LookupUnavailable,
}

impl FailReason {
    /// Get a human-readable label for the failure category.
    pub fn label(&self) -> &'static str {
        match self {
            FailReason::MissingField => "Missing Field",
            FailReason::EmptyValue => "Empty Value",
            FailReason::InvalidFormat => "Invalid Format",
            FailReason::InvalidLength => "Invalid Length",
            FailReason::InvalidChecksum => "Invalid Checksum",
            FailReason::Mismatch => "Mismatch",
            FailReason::NotFound => "Not Found",
            FailReason::LookupUnavailable => "Lookup Unavailable",
        }
    }

    /// Transient reasons are eligible for retry by the engine.
    pub fn is_transient(&self) -> bool {
        matches!(self, FailReason::LookupUnavailable)
    }
}

/// Result of applying one validator to one field in one record.
///
/// Every bound rule produces exactly one outcome per row. A rule that does
/// not apply (optional field left empty) yields an explicit `Skipped`, never
/// an omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The value satisfies the rule.
    Pass,
    /// The rule did not apply to this record. Counts as a pass.
    Skipped,
    /// The value violates the rule.
    Fail {
        reason: FailReason,
        severity: Severity,
    },
}

impl ValidationOutcome {
    /// Shorthand for a failure outcome.
    pub fn fail(reason: FailReason, severity: Severity) -> Self {
        ValidationOutcome::Fail { reason, severity }
    }

    /// Whether this outcome is a failure of any severity.
    pub fn is_fail(&self) -> bool {
        matches!(self, ValidationOutcome::Fail { .. })
    }

    /// Whether this outcome is a failure at or above the given severity.
    pub fn fails_at(&self, threshold: Severity) -> bool {
        matches!(self, ValidationOutcome::Fail { severity, .. } if *severity >= threshold)
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<FailReason> {
        match self {
            ValidationOutcome::Fail { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// The failure severity, if any.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            ValidationOutcome::Fail { severity, .. } => Some(*severity),
            _ => None,
        }
    }
}
