//! Check command - validate a dataset file and write the report.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use verdict::validators::{
    CepLookupValidator, CnpjLookupValidator, HttpLookupClient, LookupClient, cep_webservice,
    cnpj_webservice,
};
use verdict::{
    BoundRule, DatasetReader, EngineConfig, EngineHook, Pipeline, PipelineConfig, Record,
    Registry, ReportDocument, ReportFormat, ReportModel, RetryPolicy, RuleSet, RunSummary,
    ValidationOutcome, emit_to_path,
};

use crate::cli::SeverityChoice;

/// Exit code when the dataset contains invalid rows.
const EXIT_INVALID_ROWS: i32 = 2;

/// Prints failures as the engine settles them.
struct TraceHook;

impl EngineHook for TraceHook {
    fn on_outcome(&self, record: &Record, rule: &BoundRule, outcome: &ValidationOutcome) {
        if let ValidationOutcome::Fail { reason, severity } = outcome {
            eprintln!(
                "  {} row {} [{}] {} ({})",
                "fail".red(),
                record.row_index,
                rule.rule_id,
                reason.label(),
                severity.label().dimmed()
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    rules: Option<PathBuf>,
    output: Option<PathBuf>,
    format: ReportFormat,
    offline: bool,
    fail_on: SeverityChoice,
    retries: u32,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Checking".cyan().bold(),
        file.display().to_string().white()
    );

    // Read the dataset first: rule inference needs the headers
    let (dataset, source) = DatasetReader::new().read_file(&file)?;

    if verbose {
        println!();
        println!("{}", "Source:".yellow().bold());
        println!("  format: {}  rows: {}  columns: {}", source.format, source.row_count, source.column_count);
        println!("  hash: {}", source.hash);
        println!();
    }

    let mut rule_set = match rules {
        Some(path) => RuleSet::from_json_file(path)?,
        None => RuleSet::infer(&dataset.headers),
    };

    if rule_set.is_empty() {
        return Err(
            "No rules to apply: pass --rules or use recognizable column names".into(),
        );
    }

    if offline {
        localize_lookup_rules(&mut rule_set);
    }

    let registry = build_registry(&rule_set)?;

    let config = PipelineConfig {
        engine: EngineConfig {
            retry: RetryPolicy {
                attempts: retries.max(1),
                ..RetryPolicy::default()
            },
            fail_threshold: fail_on.to_severity(),
        },
        ..PipelineConfig::default()
    };

    let mut pipeline = Pipeline::with_registry(registry).with_config(config);
    if verbose {
        pipeline = pipeline.with_hook(Arc::new(TraceHook) as Arc<dyn EngineHook>);
    }

    let model = pipeline.check_dataset(&dataset, &rule_set)?;

    // Persist the report before summarizing; a sink failure aborts cleanly
    let output_path = output.unwrap_or_else(|| {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        file.with_file_name(format!("{}.report.{}", stem, format))
    });

    let document = ReportDocument::from_model(&model);
    emit_to_path(&document, &output_path, format)?;

    print_summary(&model, &output_path);

    if model.invalid_rows > 0 {
        Ok(EXIT_INVALID_ROWS)
    } else {
        Ok(0)
    }
}

/// Rewrite referential rules to their local counterparts for offline runs.
fn localize_lookup_rules(rule_set: &mut RuleSet) {
    for rule in &mut rule_set.rules {
        match rule.validator.as_str() {
            "cep_lookup" => rule.validator = "cep".to_string(),
            "cnpj_lookup" => rule.validator = "cnpj".to_string(),
            _ => {}
        }
    }
}

/// Build the registry: built-in validators, plus lookup validators for the
/// providers the rules ask for.
fn build_registry(rule_set: &RuleSet) -> Result<Registry, Box<dyn std::error::Error>> {
    let mut registry = Registry::with_builtin();

    if rule_set.rules.iter().any(|r| r.validator == "cep_lookup") {
        let provider = named_webservice(rule_set, "cep_lookup").unwrap_or("viacep");
        let webservice = cep_webservice(provider)
            .ok_or_else(|| format!("Unsupported CEP webservice: {}", provider))?;
        let client = HttpLookupClient::for_webservice(webservice)?;
        registry.register(
            "cep_lookup",
            CepLookupValidator::new(Arc::new(client) as Arc<dyn LookupClient>),
        )?;
    }

    if rule_set.rules.iter().any(|r| r.validator == "cnpj_lookup") {
        let provider = named_webservice(rule_set, "cnpj_lookup").unwrap_or("brasilapi");
        let webservice = cnpj_webservice(provider)
            .ok_or_else(|| format!("Unsupported CNPJ webservice: {}", provider))?;
        let client = HttpLookupClient::for_webservice(webservice)?;
        registry.register(
            "cnpj_lookup",
            CnpjLookupValidator::new(Arc::new(client) as Arc<dyn LookupClient>),
        )?;
    }

    Ok(registry)
}

/// The first webservice name declared for a validator, if any.
fn named_webservice<'a>(rule_set: &'a RuleSet, validator: &str) -> Option<&'a str> {
    rule_set
        .rules
        .iter()
        .filter(|r| r.validator == validator)
        .find_map(|r| r.params.webservice.as_deref())
}

fn print_summary(model: &ReportModel, output_path: &std::path::Path) {
    let summary = RunSummary::from_model(model);

    println!(
        "Validated {} rows: {} valid, {} invalid ({} errors, {} warnings)",
        summary.total_rows.to_string().white().bold(),
        summary.valid_rows.to_string().green(),
        summary.invalid_rows.to_string().red(),
        summary.failures_by_severity.error.to_string().red(),
        summary.failures_by_severity.warning.to_string().yellow(),
    );

    for tally in &model.rule_totals {
        if tally.failures > 0 {
            println!(
                "  {:20} {:>6} failure(s)",
                tally.rule_id,
                tally.failures.to_string().red()
            );
        }
    }

    println!();
    println!(
        "{} {}",
        "Report written to".green().bold(),
        output_path.display().to_string().white()
    );
    println!(
        "Data quality score: {:.0}%",
        summary.data_quality_score * 100.0
    );
    println!("{}", summary.recommendation);
}
