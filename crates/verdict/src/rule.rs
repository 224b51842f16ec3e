//! Rule declarations and the execution-plan binder.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::outcome::Severity;
use crate::registry::{Registry, Validator};

/// The field (or ordered tuple of fields) a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    /// A single column.
    Column(String),
    /// An ordered tuple of columns for cross-field checks. The first column
    /// is the rule's primary field.
    Columns(Vec<String>),
}

impl FieldSelector {
    /// All referenced column names, in selector order.
    pub fn columns(&self) -> &[String] {
        match self {
            FieldSelector::Column(name) => std::slice::from_ref(name),
            FieldSelector::Columns(names) => names,
        }
    }

    /// The primary column the rule reports against.
    pub fn primary(&self) -> &str {
        match self {
            FieldSelector::Column(name) => name,
            FieldSelector::Columns(names) => names.first().map(String::as_str).unwrap_or(""),
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(name: &str) -> Self {
        FieldSelector::Column(name.to_string())
    }
}

impl From<String> for FieldSelector {
    fn from(name: String) -> Self {
        FieldSelector::Column(name)
    }
}

impl From<Vec<String>> for FieldSelector {
    fn from(names: Vec<String>) -> Self {
        FieldSelector::Columns(names)
    }
}

/// Optional parameters attached to a rule declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    /// Blank values fail with `EmptyValue` instead of skipping.
    pub required: bool,
    /// Override the severity of failures produced under this rule.
    pub severity: Option<Severity>,
    /// Lookup provider name for referential validators.
    pub webservice: Option<String>,
}

/// A declared binding of field(s) to a named validator.
///
/// Declared once per dataset schema; immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier used in the report.
    pub id: String,
    /// Target field(s).
    pub field: FieldSelector,
    /// Name of the validator in the registry.
    pub validator: String,
    /// Optional parameters.
    #[serde(default)]
    pub params: RuleParams,
}

impl Rule {
    /// Create a rule with default parameters.
    pub fn new(
        id: impl Into<String>,
        field: impl Into<FieldSelector>,
        validator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            validator: validator.into(),
            params: RuleParams::default(),
        }
    }

    /// Set the rule parameters.
    pub fn with_params(mut self, params: RuleParams) -> Self {
        self.params = params;
        self
    }

    /// Mark the target field as required.
    pub fn required(mut self) -> Self {
        self.params.required = true;
        self
    }
}

/// An ordered set of rule declarations for one dataset schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set from declarations.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load declarations from a JSON rule file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| VerdictError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Propose rules by matching header names against the built-in
    /// validator suite.
    ///
    /// At most one rule per column; the column name doubles as the rule id.
    pub fn infer(headers: &[String]) -> Self {
        let mut rules = Vec::new();

        for header in headers {
            let lower = header.to_lowercase();
            let validator = if lower.contains("cpf") && lower.contains("cnpj") {
                Some("cpf_cnpj")
            } else if lower.contains("cnpj") {
                Some("cnpj")
            } else if lower.contains("cpf") {
                Some("cpf")
            } else if lower.contains("email") || lower.contains("e_mail") || lower.contains("e-mail")
            {
                Some("email")
            } else if lower.contains("phone")
                || lower.contains("celular")
                || lower.contains("fone")
                || lower.contains("tel")
            {
                Some("phone")
            } else if lower.contains("cep") || lower.contains("postal") || lower.contains("zip") {
                Some("cep")
            } else {
                None
            };

            if let Some(validator) = validator {
                rules.push(Rule::new(header.clone(), header.as_str(), validator));
            }
        }

        Self { rules }
    }

    /// Whether the set declares no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One resolved plan entry: a rule with its validator and column positions
/// fixed.
#[derive(Clone)]
pub struct BoundRule {
    /// Identifier of the declaring rule.
    pub rule_id: String,
    /// Referenced columns as (name, header position), selector order.
    pub fields: Vec<(String, usize)>,
    /// The resolved validator.
    pub validator: Arc<dyn Validator>,
    /// Parameters from the declaration.
    pub params: RuleParams,
}

impl BoundRule {
    /// The primary column the rule reports against.
    pub fn primary_field(&self) -> &str {
        self.fields.first().map(|(name, _)| name.as_str()).unwrap_or("")
    }
}

impl std::fmt::Debug for BoundRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRule")
            .field("rule_id", &self.rule_id)
            .field("fields", &self.fields)
            .field("params", &self.params)
            .finish()
    }
}

/// The ordered, resolved set of rule bindings produced once per schema
/// before any row is processed.
///
/// Entry order is declaration order, and fixes the outcome order in every
/// row result.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    entries: Vec<BoundRule>,
}

impl ExecutionPlan {
    /// Resolve rule declarations against a header schema.
    ///
    /// Fails with [`VerdictError::UnknownValidator`] when a rule names an
    /// unregistered validator, and [`VerdictError::UnboundField`] when a
    /// rule references a column absent from the schema.
    pub fn bind(headers: &[String], rules: &RuleSet, registry: &Registry) -> Result<Self> {
        let mut entries = Vec::with_capacity(rules.rules.len());

        for rule in &rules.rules {
            let validator = registry.resolve(&rule.validator)?;

            let mut fields = Vec::new();
            for column in rule.field.columns() {
                let position = headers.iter().position(|h| h == column).ok_or_else(|| {
                    VerdictError::UnboundField {
                        rule: rule.id.clone(),
                        field: column.clone(),
                    }
                })?;
                fields.push((column.clone(), position));
            }

            entries.push(BoundRule {
                rule_id: rule.id.clone(),
                fields,
                validator,
                params: rule.params.clone(),
            });
        }

        Ok(Self { entries })
    }

    /// The plan entries, in declaration order.
    pub fn entries(&self) -> &[BoundRule] {
        &self.entries
    }

    /// Number of bound rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan binds no rules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rule ids with their primary fields, in plan order.
    pub fn rule_ids(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.rule_id.as_str(), e.primary_field()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["id".to_string(), "doc".to_string(), "mail".to_string()]
    }

    #[test]
    fn test_bind_preserves_declaration_order() {
        let registry = Registry::with_builtin();
        let rules = RuleSet::new(vec![
            Rule::new("mail", "mail", "email"),
            Rule::new("doc", "doc", "cpf"),
        ]);

        let plan = ExecutionPlan::bind(&headers(), &rules, &registry).unwrap();
        let ids: Vec<&str> = plan.rule_ids().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["mail", "doc"]);
        assert_eq!(plan.entries()[0].fields[0].1, 2);
    }

    #[test]
    fn test_bind_unknown_validator() {
        let registry = Registry::with_builtin();
        let rules = RuleSet::new(vec![Rule::new("doc", "doc", "passport")]);

        let err = ExecutionPlan::bind(&headers(), &rules, &registry).unwrap_err();
        assert!(matches!(err, VerdictError::UnknownValidator(_)));
    }

    #[test]
    fn test_bind_unbound_field() {
        let registry = Registry::with_builtin();
        let rules = RuleSet::new(vec![Rule::new("cep", "postal_code", "cep")]);

        let err = ExecutionPlan::bind(&headers(), &rules, &registry).unwrap_err();
        assert!(
            matches!(err, VerdictError::UnboundField { rule, field }
                if rule == "cep" && field == "postal_code")
        );
    }

    #[test]
    fn test_bind_cross_field_selector() {
        let registry = Registry::with_builtin();
        let headers = vec![
            "cep".to_string(),
            "city".to_string(),
            "state".to_string(),
        ];
        let rules = RuleSet::new(vec![Rule::new(
            "address",
            vec!["cep".to_string(), "city".to_string(), "state".to_string()],
            "cep",
        )]);

        let plan = ExecutionPlan::bind(&headers, &rules, &registry).unwrap();
        assert_eq!(plan.entries()[0].fields.len(), 3);
        assert_eq!(plan.entries()[0].primary_field(), "cep");
    }

    #[test]
    fn test_infer_rules_from_headers() {
        let headers = vec![
            "customer_id".to_string(),
            "cpf".to_string(),
            "email_nfe".to_string(),
            "telefone".to_string(),
            "cep".to_string(),
            "notes".to_string(),
        ];

        let inferred = RuleSet::infer(&headers);
        let validators: Vec<&str> =
            inferred.rules.iter().map(|r| r.validator.as_str()).collect();
        assert_eq!(validators, vec!["cpf", "email", "phone", "cep"]);
        assert_eq!(inferred.rules[0].id, "cpf");
    }

    #[test]
    fn test_rule_set_json_round_trip() {
        let json = r#"{
            "rules": [
                {"id": "doc", "field": "cpf", "validator": "cpf", "params": {"required": true}},
                {"id": "addr", "field": ["cep", "city", "state"], "validator": "cep_lookup",
                 "params": {"webservice": "viacep"}}
            ]
        }"#;

        let set: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.rules.len(), 2);
        assert!(set.rules[0].params.required);
        assert_eq!(set.rules[1].field.columns().len(), 3);
        assert_eq!(set.rules[1].params.webservice.as_deref(), Some("viacep"));
    }
}
