//! Referential validators backed by an external lookup collaborator.
//!
//! The core never embeds a provider's protocol; it only sees the
//! [`LookupClient`] trait. The HTTP implementation targets the public
//! Brazilian registry services; a scripted in-memory client covers tests
//! and offline runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::error::{Result, VerdictError};
use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

use super::cep::sanitize_cep;
use super::cnpj::check_cnpj;
use super::sanitize_digits;

/// Outcome of one lookup call.
#[derive(Debug, Clone)]
pub enum LookupResult {
    /// The service knows the value; payload is its JSON answer.
    Found(Value),
    /// The service answered: no such entry.
    NotFound,
    /// The service could not be reached or answered abnormally.
    Unavailable(String),
}

/// A request/response collaborator that answers existence queries.
pub trait LookupClient: Send + Sync {
    /// Look up a sanitized value.
    fn lookup(&self, value: &str) -> LookupResult;
}

/// A named lookup provider with its URL template.
#[derive(Debug, Clone, Copy)]
pub struct Webservice {
    pub name: &'static str,
    /// URL with `{}` standing in for the queried value.
    pub url_template: &'static str,
}

/// CEP lookup providers.
pub const CEP_WEBSERVICES: &[Webservice] = &[
    Webservice {
        name: "viacep",
        url_template: "https://viacep.com.br/ws/{}/json/",
    },
    Webservice {
        name: "opencep",
        url_template: "https://opencep.com/v1/{}",
    },
    Webservice {
        name: "brasilapi",
        url_template: "https://brasilapi.com.br/api/cep/v2/{}",
    },
];

/// CNPJ lookup providers.
pub const CNPJ_WEBSERVICES: &[Webservice] = &[
    Webservice {
        name: "brasilapi",
        url_template: "https://brasilapi.com.br/api/cnpj/v1/{}",
    },
    Webservice {
        name: "receitaws",
        url_template: "https://receitaws.com.br/v1/cnpj/{}",
    },
];

/// Resolve a CEP provider by name.
pub fn cep_webservice(name: &str) -> Option<&'static Webservice> {
    CEP_WEBSERVICES.iter().find(|w| w.name == name)
}

/// Resolve a CNPJ provider by name.
pub fn cnpj_webservice(name: &str) -> Option<&'static Webservice> {
    CNPJ_WEBSERVICES.iter().find(|w| w.name == name)
}

/// Default per-request timeout for HTTP lookups.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of [`LookupClient`].
pub struct HttpLookupClient {
    client: reqwest::blocking::Client,
    url_template: String,
}

impl HttpLookupClient {
    /// Create a client for a URL template, with the default timeout.
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url_template, DEFAULT_TIMEOUT)
    }

    /// Create a client for a named provider.
    pub fn for_webservice(webservice: &Webservice) -> Result<Self> {
        Self::new(webservice.url_template)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerdictError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }
}

impl LookupClient for HttpLookupClient {
    fn lookup(&self, value: &str) -> LookupResult {
        let url = self.url_template.replace("{}", value);

        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) => return LookupResult::Unavailable(e.to_string()),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return LookupResult::NotFound;
        }
        if !status.is_success() {
            return LookupResult::Unavailable(format!("HTTP {}", status));
        }

        match response.json::<Value>() {
            // ViaCEP signals a miss with 200 + {"erro": true}
            Ok(body) if body.get("erro").is_some() => LookupResult::NotFound,
            Ok(body) => LookupResult::Found(body),
            Err(e) => LookupResult::Unavailable(format!("bad payload: {}", e)),
        }
    }
}

/// Referential CEP validator: format check, then existence via the lookup
/// collaborator.
///
/// Bound with a single column it checks existence only. Bound with
/// `[cep, city, state]` it additionally matches the provider's answer
/// against the record's own address fields; a disagreement is a `Mismatch`
/// warning.
pub struct CepLookupValidator {
    client: Arc<dyn LookupClient>,
}

impl CepLookupValidator {
    /// Create a validator over a lookup client.
    pub fn new(client: Arc<dyn LookupClient>) -> Self {
        Self { client }
    }
}

impl Validator for CepLookupValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };

        let cep = match sanitize_cep(value) {
            Ok(cep) => cep,
            Err(reason) => return ValidationOutcome::fail(reason, Severity::Error),
        };

        match self.client.lookup(&cep) {
            LookupResult::Found(body) => {
                // ViaCEP payload keys: localidade = city, uf = state
                let city = values.get(1).copied().unwrap_or("");
                let state = values.get(2).copied().unwrap_or("");

                if field_disagrees(&body, "localidade", city)
                    || field_disagrees(&body, "uf", state)
                {
                    return ValidationOutcome::fail(FailReason::Mismatch, Severity::Warning);
                }
                ValidationOutcome::Pass
            }
            LookupResult::NotFound => ValidationOutcome::fail(FailReason::NotFound, Severity::Error),
            LookupResult::Unavailable(_) => {
                ValidationOutcome::fail(FailReason::LookupUnavailable, Severity::Warning)
            }
        }
    }
}

/// Referential CNPJ validator: local checksum first, then registry
/// existence. Only locally-valid documents reach the wire.
pub struct CnpjLookupValidator {
    client: Arc<dyn LookupClient>,
}

impl CnpjLookupValidator {
    /// Create a validator over a lookup client.
    pub fn new(client: Arc<dyn LookupClient>) -> Self {
        Self { client }
    }
}

impl Validator for CnpjLookupValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };

        let local = check_cnpj(value);
        if local.is_fail() {
            return local;
        }

        // check_cnpj accepted it, so sanitizing cannot fail here
        let Some(digits) = sanitize_digits(value, &['.', '/', '-', ',']) else {
            return ValidationOutcome::fail(FailReason::InvalidFormat, Severity::Error);
        };

        match self.client.lookup(&digits) {
            LookupResult::Found(body) => {
                // Registry payloads echo the document; disagreement means the
                // answer belongs to someone else.
                let echoed = body
                    .get("cnpj")
                    .and_then(Value::as_str)
                    .and_then(|v| sanitize_digits(v, &['.', '/', '-', ',']));
                match echoed {
                    Some(echoed) if echoed != digits => {
                        ValidationOutcome::fail(FailReason::Mismatch, Severity::Error)
                    }
                    _ => ValidationOutcome::Pass,
                }
            }
            LookupResult::NotFound => ValidationOutcome::fail(FailReason::NotFound, Severity::Error),
            LookupResult::Unavailable(_) => {
                ValidationOutcome::fail(FailReason::LookupUnavailable, Severity::Warning)
            }
        }
    }
}

/// True when the record value is non-blank and differs from the payload
/// field, ignoring case and surrounding whitespace.
fn field_disagrees(body: &Value, key: &str, record_value: &str) -> bool {
    let record_value = record_value.trim();
    if record_value.is_empty() {
        return false;
    }
    match body.get(key).and_then(Value::as_str) {
        Some(answer) => !answer.trim().eq_ignore_ascii_case(record_value),
        None => false,
    }
}

/// In-memory lookup client for tests and offline runs.
///
/// Scripted responses, when present, are served first (one per call); after
/// the script drains, calls fall back to the entry map, then to `NotFound`.
#[derive(Default)]
pub struct MockLookupClient {
    entries: HashMap<String, Value>,
    script: Mutex<Vec<LookupResult>>,
    calls: AtomicUsize,
}

impl MockLookupClient {
    /// Create a client that answers `NotFound` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that knows the given values.
    pub fn with_entries<K>(entries: impl IntoIterator<Item = (K, Value)>) -> Self
    where
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Create a client that plays back a fixed response sequence.
    pub fn with_script(responses: Vec<LookupResult>) -> Self {
        Self {
            script: Mutex::new(responses),
            ..Self::default()
        }
    }

    /// Add a known value.
    pub fn insert(&mut self, value: impl Into<String>, payload: Value) {
        self.entries.insert(value.into(), payload);
    }

    /// How many lookups were issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LookupClient for MockLookupClient {
    fn lookup(&self, value: &str) -> LookupResult {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        if !script.is_empty() {
            return script.remove(0);
        }
        drop(script);

        match self.entries.get(value) {
            Some(payload) => LookupResult::Found(payload.clone()),
            None => LookupResult::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cep_lookup_found() {
        let client = Arc::new(MockLookupClient::with_entries([(
            "01310100",
            json!({"cep": "01310-100", "localidade": "São Paulo", "uf": "SP"}),
        )]));
        let validator = CepLookupValidator::new(client);

        let outcome = validator.validate(&["01310-100"], &RuleParams::default());
        assert_eq!(outcome, ValidationOutcome::Pass);
    }

    #[test]
    fn test_cep_lookup_not_found() {
        let validator = CepLookupValidator::new(Arc::new(MockLookupClient::new()));
        let outcome = validator.validate(&["99999-999"], &RuleParams::default());
        assert_eq!(outcome.reason(), Some(FailReason::NotFound));
    }

    #[test]
    fn test_cep_lookup_address_mismatch() {
        let client = Arc::new(MockLookupClient::with_entries([(
            "01310100",
            json!({"localidade": "São Paulo", "uf": "SP"}),
        )]));
        let validator = CepLookupValidator::new(client);

        let outcome = validator.validate(
            &["01310-100", "Rio de Janeiro", "RJ"],
            &RuleParams::default(),
        );
        assert_eq!(outcome.reason(), Some(FailReason::Mismatch));
        assert_eq!(outcome.severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_cep_lookup_blank_address_fields_skip_match() {
        let client = Arc::new(MockLookupClient::with_entries([(
            "01310100",
            json!({"localidade": "São Paulo", "uf": "SP"}),
        )]));
        let validator = CepLookupValidator::new(client);

        let outcome = validator.validate(&["01310-100", "", ""], &RuleParams::default());
        assert_eq!(outcome, ValidationOutcome::Pass);
    }

    #[test]
    fn test_cep_lookup_bad_format_stays_local() {
        let client = Arc::new(MockLookupClient::new());
        let validator = CepLookupValidator::new(Arc::clone(&client) as Arc<dyn LookupClient>);

        let outcome = validator.validate(&["013"], &RuleParams::default());
        assert_eq!(outcome.reason(), Some(FailReason::InvalidLength));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_cnpj_lookup_checks_locally_first() {
        let client = Arc::new(MockLookupClient::new());
        let validator = CnpjLookupValidator::new(Arc::clone(&client) as Arc<dyn LookupClient>);

        let outcome = validator.validate(&["11222333000182"], &RuleParams::default());
        assert_eq!(outcome.reason(), Some(FailReason::InvalidChecksum));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_cnpj_lookup_found_with_matching_echo() {
        let client = Arc::new(MockLookupClient::with_entries([(
            "11222333000181",
            json!({"cnpj": "11.222.333/0001-81", "razao_social": "Example LTDA"}),
        )]));
        let validator = CnpjLookupValidator::new(client);

        let outcome = validator.validate(&["11.222.333/0001-81"], &RuleParams::default());
        assert_eq!(outcome, ValidationOutcome::Pass);
    }

    #[test]
    fn test_unavailable_is_transient_warning() {
        let client = Arc::new(MockLookupClient::with_script(vec![
            LookupResult::Unavailable("connection refused".to_string()),
        ]));
        let validator = CepLookupValidator::new(client);

        let outcome = validator.validate(&["01310-100"], &RuleParams::default());
        assert_eq!(outcome.reason(), Some(FailReason::LookupUnavailable));
        assert_eq!(outcome.severity(), Some(Severity::Warning));
    }

    #[test]
    fn test_webservice_registry() {
        assert!(cep_webservice("viacep").is_some());
        assert!(cep_webservice("opencep").is_some());
        assert!(cnpj_webservice("brasilapi").is_some());
        assert!(cnpj_webservice("viacep").is_none());
    }
}
