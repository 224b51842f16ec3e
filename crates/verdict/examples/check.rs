//! Example: validate a customer dataset with Verdict.
//!
//! Usage:
//!   cargo run --example check -- <file_path>
//!
//! Rules are inferred from the column names (cpf, cnpj, email, phone, cep).

use std::env;
use std::path::Path;

use verdict::{Pipeline, ReportDocument, RuleSet, RunSummary};

fn main() -> verdict::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example check -- <file_path>");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let pipeline = Pipeline::new();

    // Peek at the headers to infer rules, then run the full pipeline
    let (dataset, source) = verdict::DatasetReader::new().read_file(path)?;
    let rules = RuleSet::infer(&dataset.headers);

    if rules.is_empty() {
        eprintln!("No recognizable columns to validate in {}", file_path);
        std::process::exit(1);
    }

    let model = pipeline.check_dataset(&dataset, &rules)?;
    let summary = RunSummary::from_model(&model);

    println!("## Source");
    println!("  File: {}", source.file);
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!();

    println!("## Summary");
    println!("  Total rows: {}", summary.total_rows);
    println!("  Valid rows: {}", summary.valid_rows);
    println!("  Invalid rows: {}", summary.invalid_rows);
    println!("  Quality score: {:.1}%", summary.data_quality_score * 100.0);
    println!();

    println!("## Failures by rule");
    for tally in &model.rule_totals {
        println!(
            "  {:20} {:>5} ({} errors, {} warnings)",
            tally.rule_id, tally.failures, tally.errors, tally.warnings
        );
    }
    println!();

    let document = ReportDocument::from_model(&model);
    let failing = document.details.iter().filter(|d| !d.failures.is_empty());
    println!("## Detail");
    for line in failing.take(20) {
        for failure in &line.failures {
            println!(
                "  row {:>4}  [{}] {} ({})",
                line.row_index,
                failure.rule_id,
                failure.reason.label(),
                failure.severity.label()
            );
        }
    }

    println!();
    println!("{}", summary.recommendation);

    Ok(())
}
