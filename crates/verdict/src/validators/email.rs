//! Email address syntax validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Validates email address syntax (local@domain.tld).
///
/// Deliverability is out of scope here; a referential validator backed by a
/// lookup service can layer on top when needed.
pub struct EmailValidator;

impl Validator for EmailValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };
        check_email(value)
    }
}

/// Validate one email value.
pub fn check_email(value: &str) -> ValidationOutcome {
    let trimmed = value.trim();

    // The pattern tolerates consecutive dots; rule them out explicitly.
    if !EMAIL_PATTERN.is_match(trimmed) || trimmed.contains("..") {
        return ValidationOutcome::fail(FailReason::InvalidFormat, Severity::Error);
    }

    ValidationOutcome::Pass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        for addr in [
            "user@example.com",
            "first.last@sub.example.com.br",
            "tagged+inbox@example.io",
            "UPPER.case@Example.COM",
        ] {
            assert_eq!(check_email(addr), ValidationOutcome::Pass, "{addr}");
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for addr in [
            "",
            "plainaddress",
            "@missing-local.org",
            "user@",
            "user@domain",
            "user@domain..com",
            "user..double@domain.com",
            "user name@domain.com",
        ] {
            assert_eq!(
                check_email(addr).reason(),
                Some(FailReason::InvalidFormat),
                "{addr}"
            );
        }
    }
}
