//! Diagnostics
//!
//! Every problem found in a binding graph is reported as a [`Diagnostic`]: a
//! kind with a stable id, a severity, the rendered message and the structured
//! dependency trace behind it.

use crate::Severity;
use crate::trace::TraceElement;
use bindery_domain::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Category of diagnostic for grouping in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    /// A key cannot be satisfied
    Resolution,
    /// Bindings or declarations collide
    Conflict,
    /// Dependency or component-dependency cycles
    Cycle,
    /// Nullability contracts
    Nullability,
    /// Members injection restrictions
    MembersInjection,
    /// Module declaration problems
    Module,
}

impl Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => write!(f, "Resolution"),
            Self::Conflict => write!(f, "Conflict"),
            Self::Cycle => write!(f, "Cycle"),
            Self::Nullability => write!(f, "Nullability"),
            Self::MembersInjection => write!(f, "Members Injection"),
            Self::Module => write!(f, "Module"),
        }
    }
}

/// Closed taxonomy of graph problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticKind {
    MissingBinding,
    DuplicateBinding,
    IncompatibleBindings,
    DuplicateMapKey,
    DependencyCycle,
    ComponentDependencyCycle,
    NullabilityViolation,
    UnboundedTypeArgument,
    StaticFieldInjection,
    RawTypeInjection,
    AbstractModuleInstanceMethod,
}

impl DiagnosticKind {
    /// All kinds in report order
    pub const ALL: [DiagnosticKind; 11] = [
        Self::MissingBinding,
        Self::DuplicateBinding,
        Self::IncompatibleBindings,
        Self::DuplicateMapKey,
        Self::DependencyCycle,
        Self::ComponentDependencyCycle,
        Self::NullabilityViolation,
        Self::UnboundedTypeArgument,
        Self::StaticFieldInjection,
        Self::RawTypeInjection,
        Self::AbstractModuleInstanceMethod,
    ];

    /// Stable id, e.g. `BIND001`
    pub fn id(self) -> &'static str {
        match self {
            Self::MissingBinding => "BIND001",
            Self::DuplicateBinding => "BIND002",
            Self::IncompatibleBindings => "BIND003",
            Self::DuplicateMapKey => "BIND004",
            Self::DependencyCycle => "BIND005",
            Self::ComponentDependencyCycle => "BIND006",
            Self::NullabilityViolation => "BIND007",
            Self::UnboundedTypeArgument => "BIND008",
            Self::StaticFieldInjection => "BIND009",
            Self::RawTypeInjection => "BIND010",
            Self::AbstractModuleInstanceMethod => "BIND011",
        }
    }

    /// Category for grouping in reports
    pub fn category(self) -> DiagnosticCategory {
        match self {
            Self::MissingBinding => DiagnosticCategory::Resolution,
            Self::DuplicateBinding | Self::IncompatibleBindings | Self::DuplicateMapKey => {
                DiagnosticCategory::Conflict
            }
            Self::DependencyCycle | Self::ComponentDependencyCycle => DiagnosticCategory::Cycle,
            Self::NullabilityViolation => DiagnosticCategory::Nullability,
            Self::UnboundedTypeArgument | Self::StaticFieldInjection | Self::RawTypeInjection => {
                DiagnosticCategory::MembersInjection
            }
            Self::AbstractModuleInstanceMethod => DiagnosticCategory::Module,
        }
    }

    /// Suggested fix shown in human-readable reports
    pub fn suggestion(self) -> Option<&'static str> {
        match self {
            Self::MissingBinding => {
                Some("Add an @Inject constructor to the type or a module method that provides it")
            }
            Self::DuplicateBinding => Some("Remove all but one of the listed bindings"),
            Self::IncompatibleBindings => {
                Some("Use either multibinding contributions or a single unique binding for the key")
            }
            Self::DuplicateMapKey => Some("Give every map contribution a distinct map key"),
            Self::DependencyCycle => {
                Some("Break the cycle by requesting one of the keys through a Provider or Lazy")
            }
            Self::ComponentDependencyCycle => {
                Some("Remove one of the component dependencies in the cycle")
            }
            Self::NullabilityViolation => {
                Some("Annotate the requesting site as nullable or stop providing null")
            }
            Self::RawTypeInjection | Self::UnboundedTypeArgument => {
                Some("Inject members into a fully parameterized type")
            }
            Self::StaticFieldInjection | Self::AbstractModuleInstanceMethod => None,
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingBinding => "MissingBinding",
            Self::DuplicateBinding => "DuplicateBindings",
            Self::IncompatibleBindings => "IncompatibleBindings",
            Self::DuplicateMapKey => "DuplicateMapKeys",
            Self::DependencyCycle => "DependencyCycle",
            Self::ComponentDependencyCycle => "ComponentDependencyCycle",
            Self::NullabilityViolation => "Nullable",
            Self::UnboundedTypeArgument => "UnboundedTypeArgument",
            Self::StaticFieldInjection => "StaticFieldInjection",
            Self::RawTypeInjection => "RawTypeInjection",
            Self::AbstractModuleInstanceMethod => "AbstractModuleInstanceMethod",
        };
        write!(f, "{name}")
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// How bad it is
    pub severity: Severity,
    /// Headline followed by the rendered trace
    pub message: String,
    /// Component the problem was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Most specific declaration available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Structured trace, innermost request first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceElement>,
}

impl Diagnostic {
    /// Error-level diagnostic
    pub fn error<S: Into<String>>(kind: DiagnosticKind, message: S) -> Self {
        Self::new(kind, Severity::Error, message)
    }

    /// Diagnostic with an explicit severity
    pub fn new<S: Into<String>>(kind: DiagnosticKind, severity: Severity, message: S) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            component: None,
            location: None,
            trace: Vec::new(),
        }
    }

    /// Anchor to a component and its declaration
    pub fn in_component<S: Into<String>>(mut self, component: S, location: &SourceLocation) -> Self {
        self.component = Some(component.into());
        self.location = Some(location.clone());
        self
    }

    /// Anchor to a declaration outside any component
    pub fn at(mut self, location: &SourceLocation) -> Self {
        self.location = Some(location.clone());
        self
    }

    /// Attach the structured trace
    pub fn with_trace(mut self, trace: Vec<TraceElement>) -> Self {
        self.trace = trace;
        self
    }

    /// Stable id of the kind
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// First line of the message
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Whether this diagnostic fails validation
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
