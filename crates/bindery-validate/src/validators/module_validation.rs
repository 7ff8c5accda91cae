//! Module Validation
//!
//! An abstract module cannot be instantiated, so it may not declare
//! non-static `@Provides` methods.

use super::in_component;
use crate::ValidationConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use bindery_domain::{BindingKind, ModuleDescriptor};
use std::collections::HashSet;

/// Module Validator
pub struct ModuleValidator;

impl Default for ModuleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, graph: &BindingGraph<'_>) -> Vec<Diagnostic> {
        let tree = graph.tree();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut diagnostics = Vec::new();
        for component in tree.preorder() {
            for module in &tree.get(component).modules {
                if !seen.insert(module.name.as_str()) || !has_instance_provides(module) {
                    continue;
                }
                let message = format!(
                    "{} is abstract and has instance @Provides methods. Consider making the methods static or including a non-abstract subclass of the module instead.",
                    module.name
                );
                let diagnostic = in_component(
                    graph,
                    component,
                    Diagnostic::error(DiagnosticKind::AbstractModuleInstanceMethod, message),
                );
                diagnostics.push(diagnostic.at(&module.location));
            }
        }
        diagnostics
    }
}

fn has_instance_provides(module: &ModuleDescriptor) -> bool {
    module.is_abstract
        && module.bindings.iter().any(|b| {
            matches!(
                b.kind,
                BindingKind::Provision {
                    requires_module_instance: true,
                    ..
                }
            )
        })
}

impl crate::validator_trait::Validator for ModuleValidator {
    fn name(&self) -> &'static str {
        "module"
    }

    fn description(&self) -> &'static str {
        "Reports abstract modules with instance @Provides methods"
    }

    fn validate(
        &self,
        graph: &BindingGraph<'_>,
        _config: &ValidationConfig,
    ) -> anyhow::Result<Vec<Diagnostic>> {
        Ok(self.validate(graph))
    }
}
