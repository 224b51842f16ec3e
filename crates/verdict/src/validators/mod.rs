//! Built-in validators for Brazilian customer data.
//!
//! Every validator implements the [`Validator`](crate::registry::Validator)
//! contract: pure, panic-free, one outcome per call. Malformed input is a
//! `Fail` outcome, never a fault.

mod cep;
mod cnpj;
mod cpf;
mod email;
mod lookup;
mod phone;

pub use cep::{CepValidator, check_cep};
pub use cnpj::{CnpjValidator, check_cnpj};
pub use cpf::{CpfCnpjValidator, CpfValidator, check_cpf};
pub use email::{EmailValidator, check_email};
pub use lookup::{
    CEP_WEBSERVICES, CNPJ_WEBSERVICES, CepLookupValidator, CnpjLookupValidator, HttpLookupClient,
    LookupClient, LookupResult, MockLookupClient, Webservice, cep_webservice, cnpj_webservice,
};
pub use phone::{PhoneValidator, check_phone, is_mobile};

/// Strip a fixed set of punctuation characters from a candidate document
/// number. Returns None when anything other than digits remains.
pub(crate) fn sanitize_digits(value: &str, punctuation: &[char]) -> Option<String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !punctuation.contains(c))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(cleaned)
}

/// Whether all digits in a sanitized document are the same (e.g.
/// "111.111.111-11"), which passes naive checksum math but is never issued.
pub(crate) fn all_repeated_digits(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}
