//! Validation engine: applies a bound execution plan to records.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::input::Record;
use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::report::{RowResult, RuleOutcome};
use crate::rule::{BoundRule, ExecutionPlan};

/// Retry policy for transient lookup failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per rule application (first call included).
    pub attempts: u32,
    /// Delay before the first retry; doubles each retry.
    pub base_delay: Duration,
    /// Ceiling for the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Full-jitter backoff delay before the given retry (1-based).
    fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let capped = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let millis = capped.as_millis() as u64;
        if millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..=millis))
    }
}

/// Observability hook invoked around each engine step.
///
/// Hooks observe; they cannot alter outcomes. Install one to log progress,
/// count rule applications, or feed a progress bar.
pub trait EngineHook: Send + Sync {
    /// Called once per record, before its rules run.
    fn on_record(&self, _record: &Record) {}

    /// Called once per rule application, after the outcome is settled.
    fn on_outcome(&self, _record: &Record, _rule: &BoundRule, _outcome: &ValidationOutcome) {}
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Retry policy for transient lookup failures.
    pub retry: RetryPolicy,
    /// Minimum failure severity that marks a row invalid.
    pub fail_threshold: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            fail_threshold: Severity::Error,
        }
    }
}

/// Applies a fixed execution plan to records, one row result per record.
///
/// Evaluation is pure per record: no cross-row state, and the plan is
/// immutable after bind. `evaluate` can therefore run from any thread over
/// a shared `&Engine`; only the sequential drivers below are provided, and
/// callers needing parallelism map `evaluate` themselves and re-sort by row
/// index.
pub struct Engine {
    plan: ExecutionPlan,
    config: EngineConfig,
    hooks: Vec<Arc<dyn EngineHook>>,
}

impl Engine {
    /// Create an engine with default configuration.
    pub fn new(plan: ExecutionPlan) -> Self {
        Self::with_config(plan, EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(plan: ExecutionPlan, config: EngineConfig) -> Self {
        Self {
            plan,
            config,
            hooks: Vec::new(),
        }
    }

    /// Install an observability hook.
    pub fn with_hook(mut self, hook: Arc<dyn EngineHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The bound plan this engine runs.
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// The configured failure-severity threshold.
    pub fn fail_threshold(&self) -> Severity {
        self.config.fail_threshold
    }

    /// Evaluate a single record against the whole plan.
    ///
    /// Always returns one outcome per bound rule, in plan order. A record
    /// problem (missing field, malformed value) is data in the result,
    /// never an error.
    pub fn evaluate(&self, record: &Record) -> RowResult {
        for hook in &self.hooks {
            hook.on_record(record);
        }

        let mut outcomes = Vec::with_capacity(self.plan.len());
        for bound in self.plan.entries() {
            let outcome = self.apply_rule(bound, record);
            for hook in &self.hooks {
                hook.on_outcome(record, bound, &outcome);
            }
            outcomes.push(RuleOutcome {
                rule_id: bound.rule_id.clone(),
                field: bound.primary_field().to_string(),
                outcome,
            });
        }

        RowResult::new(record.row_index, outcomes, self.config.fail_threshold)
    }

    /// Lazily evaluate records against the plan.
    ///
    /// Each element derives solely from one record and the fixed plan, so
    /// the sequence can be consumed incrementally or collected at once.
    pub fn run_iter<'a, I>(&'a self, records: I) -> impl Iterator<Item = RowResult> + 'a
    where
        I: IntoIterator<Item = &'a Record>,
        I::IntoIter: 'a,
    {
        records.into_iter().map(move |r| self.evaluate(r))
    }

    /// Run the plan over every record, sequentially.
    ///
    /// The output length always equals the input length.
    pub fn run<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<RowResult> {
        records.into_iter().map(|r| self.evaluate(r)).collect()
    }

    /// Run until `cancel` is set.
    ///
    /// Stops issuing new record evaluations once the flag is observed, but
    /// the in-flight record (including its lookups) completes, so every
    /// returned row result is whole.
    pub fn run_cancellable<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
        cancel: &AtomicBool,
    ) -> Vec<RowResult> {
        let mut results = Vec::new();
        for record in records {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            results.push(self.evaluate(record));
        }
        results
    }

    /// Apply one bound rule to one record.
    fn apply_rule(&self, bound: &BoundRule, record: &Record) -> ValidationOutcome {
        let mut values = Vec::with_capacity(bound.fields.len());
        for (name, _) in &bound.fields {
            match record.get(name) {
                Some(value) => values.push(value),
                None => {
                    return self.finish_outcome(
                        bound,
                        ValidationOutcome::fail(FailReason::MissingField, Severity::Error),
                    );
                }
            }
        }

        // Blank primary value: the rule does not apply unless declared
        // required.
        let primary = values.first().copied().unwrap_or("");
        if Record::is_blank_value(primary) {
            let outcome = if bound.params.required {
                ValidationOutcome::fail(FailReason::EmptyValue, Severity::Error)
            } else {
                ValidationOutcome::Skipped
            };
            return self.finish_outcome(bound, outcome);
        }

        let mut outcome = bound.validator.validate(&values, &bound.params);

        // Bounded retry with backoff for transient lookup failures.
        let mut attempt = 1;
        while let ValidationOutcome::Fail { reason, .. } = outcome {
            if !reason.is_transient() || attempt >= self.config.retry.attempts.max(1) {
                break;
            }
            thread::sleep(self.config.retry.delay_before_retry(attempt));
            attempt += 1;
            outcome = bound.validator.validate(&values, &bound.params);
        }

        // Exhausted transient failures degrade the report, not the run.
        if let ValidationOutcome::Fail { reason, .. } = outcome {
            if reason.is_transient() {
                outcome = ValidationOutcome::fail(reason, Severity::Warning);
                return outcome;
            }
        }

        self.finish_outcome(bound, outcome)
    }

    /// Apply the rule's severity override to failure outcomes.
    fn finish_outcome(&self, bound: &BoundRule, outcome: ValidationOutcome) -> ValidationOutcome {
        match (bound.params.severity, outcome) {
            (Some(severity), ValidationOutcome::Fail { reason, .. }) => {
                ValidationOutcome::fail(reason, severity)
            }
            (_, outcome) => outcome,
        }
    }
}
