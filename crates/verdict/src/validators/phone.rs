//! Brazilian phone number validation.

use crate::outcome::{FailReason, Severity, ValidationOutcome};
use crate::registry::Validator;
use crate::rule::RuleParams;

/// Validates Brazilian phone numbers.
///
/// Accepted shapes, after stripping spaces and `( ) - .` punctuation:
/// an optional `+55` country code, a two-digit area code (both digits
/// nonzero), then either an 8-digit landline (leading 2-5) or a 9-digit
/// mobile (leading 9).
pub struct PhoneValidator;

impl Validator for PhoneValidator {
    fn validate(&self, values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        let Some(value) = values.first() else {
            return ValidationOutcome::fail(FailReason::MissingField, Severity::Error);
        };
        check_phone(value)
    }
}

/// Classification of an accepted phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhoneKind {
    Landline,
    Mobile,
}

/// Validate one phone value.
pub fn check_phone(value: &str) -> ValidationOutcome {
    match parse_phone(value) {
        Ok(_) => ValidationOutcome::Pass,
        Err(reason) => ValidationOutcome::fail(reason, Severity::Error),
    }
}

/// Whether an accepted number is a mobile line. False for anything that
/// does not validate.
pub fn is_mobile(value: &str) -> bool {
    matches!(parse_phone(value), Ok(PhoneKind::Mobile))
}

pub(crate) fn parse_phone(value: &str) -> Result<PhoneKind, FailReason> {
    let mut cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-' | '.'))
        .collect();

    // Optional +55 country prefix
    if let Some(rest) = cleaned.strip_prefix("+55") {
        cleaned = rest.to_string();
    } else if cleaned.starts_with('+') {
        return Err(FailReason::InvalidFormat);
    }

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(FailReason::InvalidFormat);
    }

    // Area code (DDD): two digits, both nonzero
    if cleaned.len() < 2 {
        return Err(FailReason::InvalidLength);
    }
    let (ddd, subscriber) = cleaned.split_at(2);
    if ddd.chars().any(|c| c == '0') {
        return Err(FailReason::InvalidFormat);
    }

    let digits: Vec<char> = subscriber.chars().collect();
    match digits.len() {
        8 => match digits[0] {
            '2'..='5' => Ok(PhoneKind::Landline),
            _ => Err(FailReason::InvalidFormat),
        },
        9 => match digits[0] {
            '9' => Ok(PhoneKind::Mobile),
            _ => Err(FailReason::InvalidFormat),
        },
        _ => Err(FailReason::InvalidLength),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mobile_numbers() {
        for number in [
            "+55 11 91234-5678",
            "(11) 91234-5678",
            "11912345678",
            "+5521998765432",
        ] {
            assert_eq!(check_phone(number), ValidationOutcome::Pass, "{number}");
            assert!(is_mobile(number), "{number}");
        }
    }

    #[test]
    fn test_valid_landline_numbers() {
        for number in ["+55 11 3123-4567", "(31) 3456-7890", "1133334444"] {
            assert_eq!(check_phone(number), ValidationOutcome::Pass, "{number}");
            assert!(!is_mobile(number), "{number}");
        }
    }

    #[test]
    fn test_invalid_area_code() {
        assert_eq!(
            check_phone("(01) 91234-5678").reason(),
            Some(FailReason::InvalidFormat)
        );
        assert_eq!(
            check_phone("10912345678").reason(),
            Some(FailReason::InvalidFormat)
        );
    }

    #[test]
    fn test_wrong_subscriber_length() {
        assert_eq!(
            check_phone("11 9123-456").reason(),
            Some(FailReason::InvalidLength)
        );
        assert_eq!(
            check_phone("11 91234-56789").reason(),
            Some(FailReason::InvalidLength)
        );
    }

    #[test]
    fn test_mobile_must_lead_with_nine() {
        assert_eq!(
            check_phone("11812345678").reason(),
            Some(FailReason::InvalidFormat)
        );
    }

    #[test]
    fn test_foreign_country_code_rejected() {
        assert_eq!(
            check_phone("+1 555 123 4567").reason(),
            Some(FailReason::InvalidFormat)
        );
    }

    #[test]
    fn test_garbage_input() {
        assert_eq!(
            check_phone("call me maybe").reason(),
            Some(FailReason::InvalidFormat)
        );
        assert_eq!(check_phone("").reason(), Some(FailReason::InvalidFormat));
    }
}
