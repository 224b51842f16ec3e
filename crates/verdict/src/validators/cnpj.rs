//! CNPJ (Cadastro Nacional da Pessoa Jurídica) document validation.

use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

use super::{all_repeated_digits, sanitize_digits};

/// Punctuation tolerated in formatted CNPJ input.
const CNPJ_PUNCTUATION: &[char] = &['.', '/', '-', ','];

/// Weights for the first CNPJ check digit.
const WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second CNPJ check digit.
const WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validates Brazilian company registry numbers (14 digits, two weighted
/// check digits).
pub struct CnpjValidator;

impl Validator for CnpjValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };
        check_cnpj(value)
    }
}

/// Validate one CNPJ value.
pub fn check_cnpj(value: &str) -> ValidationOutcome {
    let Some(digits) = sanitize_digits(value, CNPJ_PUNCTUATION) else {
        return ValidationOutcome::fail(FailReason::InvalidFormat, Severity::Error);
    };

    if digits.len() != 14 {
        return ValidationOutcome::fail(FailReason::InvalidLength, Severity::Error);
    }

    if all_repeated_digits(&digits) {
        return ValidationOutcome::fail(FailReason::InvalidChecksum, Severity::Error);
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    if check_digit(&d[..12], &WEIGHTS_FIRST) != d[12]
        || check_digit(&d[..13], &WEIGHTS_SECOND) != d[13]
    {
        return ValidationOutcome::fail(FailReason::InvalidChecksum, Severity::Error);
    }

    ValidationOutcome::Pass
}

/// Compute a CNPJ check digit: weighted sum mod 11, folded to 0 when the
/// remainder is below 2.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}
