//! Validator trait and registry
//!
//! Every check over a finished [`BindingGraph`] implements [`Validator`]. The
//! [`ValidatorRegistry`] runs them in registration order so the combined output
//! is deterministic.

use crate::diagnostic::Diagnostic;
use crate::graph::BindingGraph;
use crate::{ValidationConfig, ValidationError};
use tracing::{debug, info};

/// A check over a resolved binding graph
pub trait Validator: Send + Sync {
    /// Stable name used in configuration and logs
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Run the check
    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>>;
}

/// Ordered set of validators
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in validator
    ///
    /// Structural checks that need no resolution run first, then the graph
    /// checks in the order their diagnostics are reported.
    pub fn standard() -> Self {
        use crate::validators::{
            ComponentDependencyCycleValidator, DependencyCycleValidator,
            DuplicateBindingValidator, MapKeyValidator, MembersInjectionValidator,
            MissingBindingValidator, ModuleValidator, NullabilityValidator,
        };

        Self::new()
            .with_validator(ComponentDependencyCycleValidator::new())
            .with_validator(ModuleValidator::new())
            .with_validator(MembersInjectionValidator::new())
            .with_validator(MissingBindingValidator::new())
            .with_validator(DuplicateBindingValidator::new())
            .with_validator(MapKeyValidator::new())
            .with_validator(DependencyCycleValidator::new())
            .with_validator(NullabilityValidator::new())
    }

    /// Append a validator
    pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.register(Box::new(validator));
        self
    }

    /// Append a boxed validator
    pub fn register(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Registered validators
    pub fn validators(&self) -> &[Box<dyn Validator>] {
        &self.validators
    }

    /// Names in run order
    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator not disabled in the configuration
    pub fn validate_all(
        &self,
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let selected: Vec<&dyn Validator> = self
            .validators
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !config.is_disabled(v.name()))
            .collect();
        Self::run(&selected, graph, config)
    }

    /// Run only the named validators, in registry order
    pub fn validate_named(
        &self,
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
        names: &[&str],
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let known = self.names();
        if let Some(unknown) = names.iter().find(|n| !known.iter().any(|k| k == *n)) {
            return Err(ValidationError::Config(format!("Unknown validator: {unknown}")));
        }
        let selected: Vec<&dyn Validator> = self
            .validators
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| names.contains(&v.name()))
            .collect();
        Self::run(&selected, graph, config)
    }

    fn run(
        validators: &[&dyn Validator],
        graph: &BindingGraph<'_>,
        config: &ValidationConfig,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let mut diagnostics = Vec::new();
        for validator in validators {
            let found = validator
                .validate(graph, config)
                .map_err(|e| ValidationError::Validator {
                    validator: validator.name().to_string(),
                    message: e.to_string(),
                })?;
            debug!(validator = validator.name(), count = found.len(), "Validator finished");
            diagnostics.extend(found);
        }
        info!(
            validators = validators.len(),
            diagnostics = diagnostics.len(),
            "Validation run complete"
        );
        Ok(diagnostics)
    }
}
