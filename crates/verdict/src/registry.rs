//! Validator registry: named validation functions behind one calling
//! convention.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Result, VerdictError};
use crate::outcome::ValidationOutcome;
use crate::rule::RuleParams;
use crate::validators::{
    CepValidator, CnpjValidator, CpfCnpjValidator, CpfValidator, EmailValidator, PhoneValidator,
};

/// A named validation function.
///
/// Validators are pure: given the selected field values of one record and
/// the rule parameters, they return exactly one [`ValidationOutcome`] and
/// must not panic. Malformed input is itself a `Fail` outcome, never a
/// propagated fault. Single-field rules receive exactly one value;
/// cross-field rules receive the values in selector order.
pub trait Validator: Send + Sync {
    /// Apply the validator to the selected field values of one record.
    fn validate(&self, values: &[&str], params: &RuleParams) -> ValidationOutcome;
}

impl<F> Validator for F
where
    F: Fn(&[&str], &RuleParams) -> ValidationOutcome + Send + Sync,
{
    fn validate(&self, values: &[&str], params: &RuleParams) -> ValidationOutcome {
        self(values, params)
    }
}

/// Holds named validators and resolves rule references to them.
///
/// Explicitly constructed and passed around rather than process-global, so
/// independent runs can carry different validator sets.
#[derive(Clone, Default)]
pub struct Registry {
    validators: IndexMap<String, Arc<dyn Validator>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in local validators registered.
    ///
    /// Lookup-backed validators are not included here; they need a
    /// [`LookupClient`](crate::validators::LookupClient) and are registered
    /// explicitly by the caller.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        // Registering into a fresh map cannot collide.
        let _ = registry.register("cpf", CpfValidator);
        let _ = registry.register("cnpj", CnpjValidator);
        let _ = registry.register("cpf_cnpj", CpfCnpjValidator);
        let _ = registry.register("email", EmailValidator);
        let _ = registry.register("phone", PhoneValidator);
        let _ = registry.register("cep", CepValidator);
        registry
    }

    /// Register a validator under a name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> Result<()> {
        self.register_arc(name, Arc::new(validator))
    }

    /// Register a shared validator under a name.
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        validator: Arc<dyn Validator>,
    ) -> Result<()> {
        let name = name.into();
        if self.validators.contains_key(&name) {
            return Err(VerdictError::DuplicateValidator(name));
        }
        self.validators.insert(name, validator);
        Ok(())
    }

    /// Resolve a validator by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Validator>> {
        self.validators
            .get(name)
            .cloned()
            .ok_or_else(|| VerdictError::UnknownValidator(name.to_string()))
    }

    /// Whether a validator name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered validator names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ValidationOutcome;

    fn pass_all(_values: &[&str], _params: &RuleParams) -> ValidationOutcome {
        ValidationOutcome::Pass
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = Registry::new();
        registry.register("always_pass", pass_all).unwrap();

        let validator = registry.resolve("always_pass").unwrap();
        let outcome = validator.validate(&["anything"], &RuleParams::default());
        assert_eq!(outcome, ValidationOutcome::Pass);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = Registry::new();
        registry.register("v", pass_all).unwrap();

        let err = registry.register("v", pass_all).unwrap_err();
        assert!(matches!(err, VerdictError::DuplicateValidator(name) if name == "v"));
    }

    #[test]
    fn test_unknown_validator_fails() {
        let registry = Registry::new();
        // `Arc<dyn Validator>` is not `Debug`, so `unwrap_err` can't be used here.
        let err = match registry.resolve("nope") {
            Ok(_) => panic!("expected resolve to fail for unknown validator"),
            Err(e) => e,
        };
        assert!(matches!(err, VerdictError::UnknownValidator(name) if name == "nope"));
    }

    #[test]
    fn test_builtin_set() {
        let registry = Registry::with_builtin();
        for name in ["cpf", "cnpj", "cpf_cnpj", "email", "phone", "cep"] {
            assert!(registry.contains(name), "missing builtin: {name}");
        }
    }
}
