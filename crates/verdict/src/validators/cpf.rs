//! CPF (Cadastro de Pessoas Físicas) document validation.

use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

use super::{all_repeated_digits, sanitize_digits};

/// Punctuation tolerated in formatted CPF input.
const CPF_PUNCTUATION: &[char] = &['.', '-', ','];

/// Validates Brazilian individual taxpayer numbers (11 digits, two mod-11
/// check digits).
pub struct CpfValidator;

impl Validator for CpfValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };
        check_cpf(value)
    }
}

/// Validate one CPF value.
pub fn check_cpf(value: &str) -> ValidationOutcome {
    let Some(digits) = sanitize_digits(value, CPF_PUNCTUATION) else {
        return ValidationOutcome::fail(FailReason::InvalidFormat, Severity::Error);
    };

    if digits.len() != 11 {
        return ValidationOutcome::fail(FailReason::InvalidLength, Severity::Error);
    }

    if all_repeated_digits(&digits) {
        return ValidationOutcome::fail(FailReason::InvalidChecksum, Severity::Error);
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    if check_digit(&d[..9], 10) != d[9] || check_digit(&d[..10], 11) != d[10] {
        return ValidationOutcome::fail(FailReason::InvalidChecksum, Severity::Error);
    }

    ValidationOutcome::Pass
}

/// Compute a CPF check digit: weights descend from `start_weight` to 2,
/// remainder folded as (sum * 10) % 11 % 10.
fn check_digit(digits: &[u32], start_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=start_weight).rev())
        .map(|(d, w)| d * w)
        .sum();
    (sum * 10) % 11 % 10
}

/// Validates values that may be either a CPF or a CNPJ, dispatching on the
/// sanitized digit count.
pub struct CpfCnpjValidator;

impl Validator for CpfCnpjValidator {
    fn validate(&self, values: &[&str], params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };

        match sanitize_digits(value, &['.', '/', '-', ',']) {
            Some(digits) if digits.len() == 11 => check_cpf(value),
            Some(digits) if digits.len() == 14 => {
                super::CnpjValidator.validate(values, params)
            }
            Some(_) => ValidationOutcome::fail(FailReason::InvalidLength, Severity::Error),
            None => ValidationOutcome::fail(FailReason::InvalidFormat, Severity::Error),
        }
    }
}
