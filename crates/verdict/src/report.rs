//! Row results and report aggregation.

use serde::{Deserialize, Serialize};

use crate::outcome::{Severity, ValidationOutcome};
use crate::rule::ExecutionPlan;

/// One rule's outcome for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Identifier of the rule that produced this outcome.
    pub rule_id: String,
    /// The rule's primary field.
    pub field: String,
    /// The outcome.
    pub outcome: ValidationOutcome,
}

/// The full outcome sequence for one record, plus derived validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    /// Original zero-based row index.
    pub row_index: usize,
    /// One outcome per bound rule, in plan order.
    pub outcomes: Vec<RuleOutcome>,
    /// True iff no failure at or above the configured severity threshold.
    pub is_valid: bool,
}

impl RowResult {
    /// Build a row result, deriving validity from the threshold.
    pub fn new(row_index: usize, outcomes: Vec<RuleOutcome>, threshold: Severity) -> Self {
        let is_valid = !outcomes.iter().any(|o| o.outcome.fails_at(threshold));
        Self {
            row_index,
            outcomes,
            is_valid,
        }
    }

    /// Iterate over the failure outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_fail())
    }
}

/// Per-rule failure tally, split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTally {
    /// Identifier of the tallied rule.
    pub rule_id: String,
    /// The rule's primary field.
    pub field: String,
    /// Total failures of any severity.
    pub failures: usize,
    /// Error-severity failures.
    pub errors: usize,
    /// Warning-severity failures.
    pub warnings: usize,
    /// Info-severity failures.
    pub infos: usize,
}

/// The aggregated view of one validation run.
///
/// Built exactly once per run and read-only afterward. The counters are a
/// pure function of `rows`: refolding the rows in any order reproduces
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportModel {
    /// Total records processed.
    pub total_rows: usize,
    /// Records with no failure at or above the threshold.
    pub valid_rows: usize,
    /// Records with at least one such failure.
    pub invalid_rows: usize,
    /// Per-rule failure tallies, in plan order.
    pub rule_totals: Vec<RuleTally>,
    /// All row results, sorted by original row index.
    pub rows: Vec<RowResult>,
}

impl ReportModel {
    /// Pure reduction of row results into the report model.
    ///
    /// Counts are independent of the order `rows` arrives in (producers
    /// may evaluate out of order); the detail sequence is re-sorted by row
    /// index so consumers always see original row order.
    pub fn aggregate(mut rows: Vec<RowResult>, plan: &ExecutionPlan) -> Self {
        rows.sort_by_key(|r| r.row_index);

        let total_rows = rows.len();
        let valid_rows = rows.iter().filter(|r| r.is_valid).count();
        let invalid_rows = total_rows - valid_rows;

        let mut rule_totals: Vec<RuleTally> = plan
            .rule_ids()
            .map(|(rule_id, field)| RuleTally {
                rule_id: rule_id.to_string(),
                field: field.to_string(),
                ..RuleTally::default()
            })
            .collect();

        for row in &rows {
            for outcome in row.failures() {
                let Some(tally) = rule_totals.iter_mut().find(|t| t.rule_id == outcome.rule_id)
                else {
                    continue;
                };
                tally.failures += 1;
                match outcome.outcome.severity() {
                    Some(Severity::Error) => tally.errors += 1,
                    Some(Severity::Warning) => tally.warnings += 1,
                    Some(Severity::Info) => tally.infos += 1,
                    None => {}
                }
            }
        }

        Self {
            total_rows,
            valid_rows,
            invalid_rows,
            rule_totals,
            rows,
        }
    }

    /// Total failures across all rules.
    pub fn total_failures(&self) -> usize {
        self.rule_totals.iter().map(|t| t.failures).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FailReason;
    use crate::registry::Registry;
    use crate::rule::{Rule, RuleSet};

    fn sample_plan() -> ExecutionPlan {
        let headers = vec!["doc".to_string(), "mail".to_string()];
        let rules = RuleSet::new(vec![
            Rule::new("doc", "doc", "cpf"),
            Rule::new("mail", "mail", "email"),
        ]);
        ExecutionPlan::bind(&headers, &rules, &Registry::with_builtin()).unwrap()
    }

    fn row(index: usize, doc: ValidationOutcome, mail: ValidationOutcome) -> RowResult {
        RowResult::new(
            index,
            vec![
                RuleOutcome {
                    rule_id: "doc".to_string(),
                    field: "doc".to_string(),
                    outcome: doc,
                },
                RuleOutcome {
                    rule_id: "mail".to_string(),
                    field: "mail".to_string(),
                    outcome: mail,
                },
            ],
            Severity::Error,
        )
    }

    fn fail_error(reason: FailReason) -> ValidationOutcome {
        ValidationOutcome::fail(reason, Severity::Error)
    }

    #[test]
    fn test_aggregate_counts() {
        let rows = vec![
            row(0, ValidationOutcome::Pass, fail_error(FailReason::InvalidFormat)),
            row(1, ValidationOutcome::Pass, ValidationOutcome::Pass),
            row(2, ValidationOutcome::Pass, fail_error(FailReason::MissingField)),
        ];

        let model = ReportModel::aggregate(rows, &sample_plan());

        assert_eq!(model.total_rows, 3);
        assert_eq!(model.valid_rows, 1);
        assert_eq!(model.invalid_rows, 2);
        assert_eq!(model.rule_totals[0].failures, 0);
        assert_eq!(model.rule_totals[1].failures, 2);
        assert_eq!(model.rule_totals[1].errors, 2);
        assert_eq!(model.total_failures(), 2);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let rows = vec![
            row(0, ValidationOutcome::Pass, fail_error(FailReason::InvalidFormat)),
            row(1, ValidationOutcome::Pass, ValidationOutcome::Pass),
            row(2, fail_error(FailReason::InvalidChecksum), ValidationOutcome::Pass),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let plan = sample_plan();
        let a = ReportModel::aggregate(rows, &plan);
        let b = ReportModel::aggregate(reversed, &plan);

        assert_eq!(a, b);
        // Detail rows come back in original row order either way
        let indices: Vec<usize> = b.rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_warning_below_threshold_keeps_row_valid() {
        let lookup_warn =
            ValidationOutcome::fail(FailReason::LookupUnavailable, Severity::Warning);
        let rows = vec![row(0, ValidationOutcome::Pass, lookup_warn)];

        let model = ReportModel::aggregate(rows, &sample_plan());

        assert_eq!(model.valid_rows, 1);
        assert_eq!(model.rule_totals[1].warnings, 1);
        assert_eq!(model.rule_totals[1].failures, 1);
    }

    #[test]
    fn test_skipped_counts_as_pass() {
        let rows = vec![row(0, ValidationOutcome::Skipped, ValidationOutcome::Pass)];
        let model = ReportModel::aggregate(rows, &sample_plan());
        assert_eq!(model.valid_rows, 1);
        assert_eq!(model.total_failures(), 0);
    }
}
