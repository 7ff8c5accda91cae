//! Binding Graph Validation for Bindery
//!
//! Resolves the binding graph of a component tree and checks it for:
//! - Missing bindings, with a trace to every dependent entry point
//! - Duplicate and incompatible bindings for one key
//! - Dependency cycles not broken by a deferred request
//! - Cycles among declared component dependencies
//! - Nullability contracts between producers and consumers
//! - Members-injection and module declaration restrictions
//!
//! ```ignore
//! use bindery_validate::{GraphValidator, ValidationConfig, Reporter};
//!
//! let validator = GraphValidator::with_config(ValidationConfig::default());
//! let report = validator.validate(&tree, &catalog)?;
//! println!("{}", Reporter::to_human_readable(&report));
//! ```

pub mod config;
pub mod diagnostic;
pub mod graph;
pub mod logging;
pub mod reporter;
pub mod resolver;
pub mod trace;
pub mod validator_trait;
pub mod validators;

pub use config::{ConfigLoader, FileConfig, LoggingConfig};
pub use diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticKind};
pub use graph::{BindingGraph, ComponentGraph, EntryPointNode};
pub use reporter::{Reporter, ValidationReport, ValidationSummary};
pub use resolver::{BindingId, BindingRequest, Edge, Node, NodeId, ResolvedBindings};
pub use trace::{TraceElement, TraceElementKind};
pub use validator_trait::{Validator, ValidatorRegistry};

use bindery_domain::{ComponentTree, RequestKind, TypeCatalog};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors that stop validation from running
///
/// Problems in the graph itself are diagnostics, never errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Domain(#[from] bindery_domain::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validator '{validator}' failed: {message}")]
    Validator { validator: String, message: String },
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "error", alias = "ERROR")]
    Error,
    #[serde(alias = "warning", alias = "WARNING")]
    Warning,
    #[serde(alias = "info", alias = "INFO")]
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
            Self::Info => write!(f, "INFO"),
        }
    }
}

/// Which deferred edges break a dependency cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Only a key requesting itself through `Provider` or `Lazy` is allowed;
    /// any longer cycle is reported
    #[default]
    Strict,
    /// Any cycle with at least one deferred edge is allowed
    AnyDeferredEdge,
}

impl CyclePolicy {
    /// Whether an edge is left out of cycle detection
    pub fn exempts(self, kind: RequestKind, self_loop: bool) -> bool {
        match self {
            Self::Strict => self_loop && kind.is_deferred(),
            Self::AnyDeferredEdge => kind.is_deferred(),
        }
    }
}

/// Switches that change how the graph is judged
///
/// # Example
///
/// ```ignore
/// use bindery_validate::{CyclePolicy, Severity, ValidationConfig};
///
/// let config = ValidationConfig::default()
///     .with_nullable_validation(Severity::Warning)
///     .with_cycle_policy(CyclePolicy::AnyDeferredEdge);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Severity of nullability violations (`Error` or `Warning`)
    pub nullable_validation: Severity,
    /// Deferred-edge policy for dependency cycles
    pub cycle_policy: CyclePolicy,
    /// Validators to skip, by name
    pub disabled_validators: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            nullable_validation: Severity::Error,
            cycle_policy: CyclePolicy::Strict,
            disabled_validators: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Set the nullability severity
    pub fn with_nullable_validation(mut self, severity: Severity) -> Self {
        self.nullable_validation = severity;
        self
    }

    /// Set the cycle policy
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Skip a validator by name
    pub fn with_disabled_validator(mut self, name: impl Into<String>) -> Self {
        self.disabled_validators.push(name.into());
        self
    }

    /// Whether a validator is switched off
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_validators.iter().any(|n| n == name)
    }
}

/// Main validator: builds the graph and runs the registry over it
pub struct GraphValidator {
    config: ValidationConfig,
    registry: ValidatorRegistry,
}

impl Default for GraphValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphValidator {
    /// Validator with default configuration and every built-in check
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Validator with a custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self::with_registry(config, ValidatorRegistry::standard())
    }

    /// Validator with a custom configuration and registry
    pub fn with_registry(config: ValidationConfig, registry: ValidatorRegistry) -> Self {
        Self { config, registry }
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Registered validators
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Validate a component tree against a type catalog
    pub fn validate(&self, tree: &ComponentTree, catalog: &TypeCatalog) -> Result<ValidationReport> {
        tree.validate_structure()?;
        let graph = BindingGraph::build(tree, catalog);
        let diagnostics = self.registry.validate_all(&graph, &self.config)?;
        Ok(self.finish(diagnostics))
    }

    /// Validate running only the named validators
    ///
    /// # Available validators
    ///
    /// - "component_dependency_cycle"
    /// - "module"
    /// - "members_injection"
    /// - "missing_binding"
    /// - "duplicate_bindings"
    /// - "map_keys"
    /// - "dependency_cycle"
    /// - "nullability"
    pub fn validate_named(
        &self,
        tree: &ComponentTree,
        catalog: &TypeCatalog,
        names: &[&str],
    ) -> Result<ValidationReport> {
        tree.validate_structure()?;
        let graph = BindingGraph::build(tree, catalog);
        let diagnostics = self.registry.validate_named(&graph, &self.config, names)?;
        Ok(self.finish(diagnostics))
    }

    fn finish(&self, diagnostics: Vec<Diagnostic>) -> ValidationReport {
        let report = Reporter::create_report(diagnostics);
        info!(
            errors = report.summary.error_count,
            warnings = report.summary.warning_count,
            passed = report.summary.passed,
            "Binding graph validated"
        );
        report
    }
}
