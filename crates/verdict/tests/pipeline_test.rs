//! End-to-end pipeline tests: file in, report out.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use serde_json::json;
use tempfile::NamedTempFile;

use verdict::validators::{CepLookupValidator, LookupClient, LookupResult, MockLookupClient};
use verdict::{
    EngineConfig, FailReason, Pipeline, PipelineConfig, Registry, ReportDocument, ReportFormat,
    RetryPolicy, Rule, RuleSet, Severity, VerdictError, emit_to_path,
};

fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_check_file_with_inferred_rules() {
    let content = "\
customer_id,cpf,email
C1,529.982.247-25,ana@example.com
C2,529.982.247-26,bob@example.com
C3,111.444.777-35,not-an-email
";
    let file = create_test_file(content);

    let pipeline = Pipeline::new();
    let rules = RuleSet::infer(&[
        "customer_id".to_string(),
        "cpf".to_string(),
        "email".to_string(),
    ]);
    let result = pipeline.check_file(file.path(), &rules).unwrap();

    assert_eq!(result.source.row_count, 3);
    assert_eq!(result.model.total_rows, 3);
    assert_eq!(result.model.valid_rows, 1);
    assert_eq!(result.model.invalid_rows, 2);

    // Row 1 fails the checksum, row 2 fails the email grammar
    assert_eq!(
        result.model.rows[1].outcomes[0].outcome.reason(),
        Some(FailReason::InvalidChecksum)
    );
    assert_eq!(
        result.model.rows[2].outcomes[1].outcome.reason(),
        Some(FailReason::InvalidFormat)
    );
}

#[test]
fn test_every_row_produces_a_result_despite_ragged_input() {
    let content = "\
id,cpf,email
C1,529.982.247-25
C2
C3,111.444.777-35,ana@example.com
";
    let file = create_test_file(content);

    let pipeline = Pipeline::new();
    let rules = RuleSet::new(vec![
        Rule::new("cpf", "cpf", "cpf"),
        Rule::new("email", "email", "email"),
    ]);
    let result = pipeline.check_file(file.path(), &rules).unwrap();

    assert_eq!(result.model.total_rows, 3);
    for row in &result.model.rows {
        assert_eq!(row.outcomes.len(), 2, "row {}", row.row_index);
    }
    // Row 1 is missing both validated fields
    assert_eq!(
        result.model.rows[1].outcomes[0].outcome.reason(),
        Some(FailReason::MissingField)
    );
}

#[test]
fn test_rule_file_loading() {
    let rules_json = r#"{
        "rules": [
            {"id": "doc", "field": "cpf", "validator": "cpf", "params": {"required": true}},
            {"id": "mail", "field": "email", "validator": "email"}
        ]
    }"#;
    let rules_file = create_test_file(rules_json);
    let rules = RuleSet::from_json_file(rules_file.path()).unwrap();

    let content = "cpf,email\n,ana@example.com\n";
    let data_file = create_test_file(content);

    let result = Pipeline::new().check_file(data_file.path(), &rules).unwrap();

    // Required CPF left blank fails instead of skipping
    assert_eq!(
        result.model.rows[0].outcomes[0].outcome.reason(),
        Some(FailReason::EmptyValue)
    );
    assert_eq!(result.model.invalid_rows, 1);
}

#[test]
fn test_lookup_rule_end_to_end() {
    let client = Arc::new(MockLookupClient::with_entries([(
        "01310100",
        json!({"cep": "01310-100", "localidade": "São Paulo", "uf": "SP"}),
    )]));

    let mut registry = Registry::with_builtin();
    registry
        .register(
            "cep_lookup",
            CepLookupValidator::new(Arc::clone(&client) as Arc<dyn LookupClient>),
        )
        .unwrap();

    let content = "\
id,cep,city,state
C1,01310-100,São Paulo,SP
C2,01310-100,Curitiba,PR
C3,99999-999,São Paulo,SP
";
    let file = create_test_file(content);

    let rules = RuleSet::new(vec![Rule::new(
        "address",
        vec!["cep".to_string(), "city".to_string(), "state".to_string()],
        "cep_lookup",
    )]);

    let pipeline = Pipeline::with_registry(registry);
    let result = pipeline.check_file(file.path(), &rules).unwrap();

    assert_eq!(result.model.total_rows, 3);
    // Row 0 matches, row 1 disagrees with the provider, row 2 is unknown
    assert!(result.model.rows[0].is_valid);
    assert_eq!(
        result.model.rows[1].outcomes[0].outcome.reason(),
        Some(FailReason::Mismatch)
    );
    assert_eq!(
        result.model.rows[2].outcomes[0].outcome.reason(),
        Some(FailReason::NotFound)
    );
    // Mismatch is a warning, so only the NotFound row is invalid
    assert_eq!(result.model.invalid_rows, 1);
}

#[test]
fn test_persistent_lookup_outage_degrades_and_completes() {
    // Every call fails; retries are exhausted for each rule application
    let client = Arc::new(MockLookupClient::with_script(vec![
        LookupResult::Unavailable("timeout".to_string()),
        LookupResult::Unavailable("timeout".to_string()),
        LookupResult::Unavailable("timeout".to_string()),
        LookupResult::Unavailable("timeout".to_string()),
    ]));

    let mut registry = Registry::with_builtin();
    registry
        .register(
            "cep_lookup",
            CepLookupValidator::new(Arc::clone(&client) as Arc<dyn LookupClient>),
        )
        .unwrap();

    let content = "cep\n01310-100\n04538-133\n";
    let file = create_test_file(content);

    let rules = RuleSet::new(vec![Rule::new("cep", "cep", "cep_lookup")]);

    let config = PipelineConfig {
        engine: EngineConfig {
            retry: RetryPolicy {
                attempts: 2,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
            },
            fail_threshold: Severity::Error,
        },
        ..PipelineConfig::default()
    };

    let pipeline = Pipeline::with_registry(registry).with_config(config);
    let result = pipeline.check_file(file.path(), &rules).unwrap();

    // The run completes, both rows present, degraded to warnings
    assert_eq!(result.model.total_rows, 2);
    assert_eq!(result.model.valid_rows, 2);
    for row in &result.model.rows {
        assert_eq!(
            row.outcomes[0].outcome.reason(),
            Some(FailReason::LookupUnavailable)
        );
        assert_eq!(row.outcomes[0].outcome.severity(), Some(Severity::Warning));
    }
    // Two rule applications, two attempts each
    assert_eq!(client.calls(), 4);
}

#[test]
fn test_report_emission_round_trip() {
    let content = "cpf,email\n529.982.247-25,bad\n111.444.777-35,ana@example.com\n";
    let file = create_test_file(content);

    let rules = RuleSet::infer(&["cpf".to_string(), "email".to_string()]);
    let result = Pipeline::new().check_file(file.path(), &rules).unwrap();

    let generated_at = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let document = ReportDocument::from_model_at(&result.model, generated_at);

    let out = NamedTempFile::new().unwrap();
    emit_to_path(&document, out.path(), ReportFormat::Json).unwrap();

    let bytes = std::fs::read(out.path()).unwrap();
    let parsed: ReportDocument = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, document);
    // One detail row per record, in row order
    assert_eq!(parsed.details.len(), 2);
    assert_eq!(parsed.details[0].failures.len(), 1);
    assert!(parsed.details[1].failures.is_empty());
}

#[test]
fn test_emission_to_unwritable_path_is_a_clean_error() {
    let content = "cpf\n529.982.247-25\n";
    let file = create_test_file(content);

    let rules = RuleSet::infer(&["cpf".to_string()]);
    let result = Pipeline::new().check_file(file.path(), &rules).unwrap();
    let document = ReportDocument::from_model(&result.model);

    let bad_path = std::path::Path::new("/nonexistent-dir/report.json");
    let err = emit_to_path(&document, bad_path, ReportFormat::Json).unwrap_err();
    assert!(matches!(err, VerdictError::Io { .. }));
    assert!(!bad_path.exists());
}

#[test]
fn test_unreadable_dataset_is_a_clean_error() {
    let err = Pipeline::new()
        .check_file("/does/not/exist.csv", &RuleSet::infer(&["cpf".to_string()]))
        .unwrap_err();
    assert!(matches!(err, VerdictError::Io { .. }));
}
