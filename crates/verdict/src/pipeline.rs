//! End-to-end pipeline facade and run summary.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{Engine, EngineConfig, EngineHook};
use crate::error::Result;
use crate::input::{Dataset, DatasetReader, ReaderConfig, SourceMetadata};
use crate::registry::Registry;
use crate::report::ReportModel;
use crate::rule::{ExecutionPlan, RuleSet};

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Dataset reader configuration.
    pub reader: ReaderConfig,
    /// Engine configuration (retry policy, failure threshold).
    pub engine: EngineConfig,
}

/// Result of validating one dataset file.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// The aggregated report model.
    pub model: ReportModel,
}

/// Wires reader, binder, engine, and aggregator for the common
/// file-in/report-out path.
pub struct Pipeline {
    registry: Registry,
    config: PipelineConfig,
    hooks: Vec<Arc<dyn EngineHook>>,
}

impl Pipeline {
    /// Create a pipeline with the built-in validators and default
    /// configuration.
    pub fn new() -> Self {
        Self::with_registry(Registry::with_builtin())
    }

    /// Create a pipeline over a custom registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            config: PipelineConfig::default(),
            hooks: Vec::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install an observability hook on the engine.
    pub fn with_hook(mut self, hook: Arc<dyn EngineHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The validator registry backing this pipeline.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate a dataset file against a rule set.
    pub fn check_file(&self, path: impl AsRef<Path>, rules: &RuleSet) -> Result<RunResult> {
        let reader = DatasetReader::with_config(self.config.reader.clone());
        let (dataset, source) = reader.read_file(path)?;
        let model = self.check_dataset(&dataset, rules)?;
        Ok(RunResult { source, model })
    }

    /// Validate an in-memory dataset against a rule set.
    ///
    /// Binding happens once, before any row is processed; binding errors
    /// are fatal and nothing is evaluated.
    pub fn check_dataset(&self, dataset: &Dataset, rules: &RuleSet) -> Result<ReportModel> {
        let plan = ExecutionPlan::bind(&dataset.headers, rules, &self.registry)?;

        let mut engine = Engine::with_config(plan, self.config.engine.clone());
        for hook in &self.hooks {
            engine = engine.with_hook(Arc::clone(hook));
        }

        let rows = engine.run(&dataset.records);
        Ok(ReportModel::aggregate(rows, engine.plan()))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts of failures by severity across a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailureCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

/// Summary of a run, for callers that only need the headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub failures_by_severity: FailureCounts,
    /// Share of rows that validated cleanly (1.0 for an empty run).
    pub data_quality_score: f64,
    /// Human-readable recommendation.
    pub recommendation: String,
}

impl RunSummary {
    /// Compute the summary from a report model.
    pub fn from_model(model: &ReportModel) -> Self {
        let mut failures_by_severity = FailureCounts::default();
        for tally in &model.rule_totals {
            failures_by_severity.error += tally.errors;
            failures_by_severity.warning += tally.warnings;
            failures_by_severity.info += tally.infos;
        }

        let data_quality_score = if model.total_rows == 0 {
            1.0
        } else {
            model.valid_rows as f64 / model.total_rows as f64
        };

        let recommendation = if model.invalid_rows > 0 {
            format!(
                "Fix {} invalid row(s) before loading this dataset.",
                model.invalid_rows
            )
        } else if failures_by_severity.warning > 0 {
            format!(
                "Review {} warning(s); rows validated but need attention.",
                failures_by_severity.warning
            )
        } else {
            "All rows validated cleanly.".to_string()
        };

        Self {
            total_rows: model.total_rows,
            valid_rows: model.valid_rows,
            invalid_rows: model.invalid_rows,
            failures_by_severity,
            data_quality_score,
            recommendation,
        }
    }
}
