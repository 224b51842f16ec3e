//! CEP (Brazilian postal code) format validation.

use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

/// Punctuation tolerated in formatted CEP input.
const CEP_PUNCTUATION: &[char] = &['.', '-'];

/// Validates CEP format: exactly 8 digits after stripping `.` and `-`.
///
/// Existence of the code is the job of the referential
/// [`CepLookupValidator`](super::CepLookupValidator).
pub struct CepValidator;

impl Validator for CepValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };
        check_cep(value)
    }
}

/// Validate one CEP value.
pub fn check_cep(value: &str) -> ValidationOutcome {
    match sanitize_cep(value) {
        Ok(_) => ValidationOutcome::Pass,
        Err(reason) => ValidationOutcome::fail(reason, Severity::Error),
    }
}

/// Sanitize a CEP down to its 8 digits.
pub(crate) fn sanitize_cep(value: &str) -> Result<String, FailReason> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !CEP_PUNCTUATION.contains(c))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(FailReason::InvalidFormat);
    }

    if cleaned.len() != 8 {
        return Err(FailReason::InvalidLength);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ceps() {
        assert_eq!(check_cep("01310-100"), ValidationOutcome::Pass);
        assert_eq!(check_cep("01310100"), ValidationOutcome::Pass);
        assert_eq!(check_cep("13.010-111"), ValidationOutcome::Pass);
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(check_cep("0131010").reason(), Some(FailReason::InvalidLength));
        assert_eq!(
            check_cep("013101000").reason(),
            Some(FailReason::InvalidLength)
        );
    }

    #[test]
    fn test_non_digit() {
        assert_eq!(
            check_cep("0131O-100").reason(),
            Some(FailReason::InvalidFormat)
        );
        assert_eq!(check_cep("").reason(), Some(FailReason::InvalidFormat));
    }
}
