//! Rules command - list validators and inferred rules.

use colored::Colorize;
use verdict::validators::{CEP_WEBSERVICES, CNPJ_WEBSERVICES};
use verdict::{Registry, RuleSet};

pub fn run(headers: Vec<String>) -> Result<i32, Box<dyn std::error::Error>> {
    let registry = Registry::with_builtin();

    println!("{}", "Built-in validators:".cyan().bold());
    for name in registry.names() {
        println!("  {}", name);
    }
    println!("  {} (needs a CEP webservice: {})", "cep_lookup", provider_names(CEP_WEBSERVICES));
    println!(
        "  {} (needs a CNPJ webservice: {})",
        "cnpj_lookup",
        provider_names(CNPJ_WEBSERVICES)
    );

    if !headers.is_empty() {
        let inferred = RuleSet::infer(&headers);
        println!();
        println!("{}", "Inferred rules:".cyan().bold());
        if inferred.is_empty() {
            println!("  (none; no recognizable column names)");
        } else {
            for rule in &inferred.rules {
                println!(
                    "  {:20} {} -> {}",
                    rule.id,
                    rule.field.primary().white(),
                    rule.validator.green()
                );
            }
        }
    }

    Ok(0)
}

fn provider_names(webservices: &[verdict::validators::Webservice]) -> String {
    webservices
        .iter()
        .map(|w| w.name)
        .collect::<Vec<_>>()
        .join(", ")
}
