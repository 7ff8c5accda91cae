//! Binding keys
//!
//! A key is the identity of a requested value: its type, an optional qualifier
//! annotation and, for multibinding contributions, a tag that keeps every
//! contribution a distinct node in the graph.

use super::TypeName;
use crate::constants::PROVIDER_TYPE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualifier annotation text without the leading `@`, e.g. `javax.inject.Named("x")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(String);

impl Qualifier {
    /// Create a qualifier from its annotation text
    pub fn new<S: Into<String>>(annotation: S) -> Self {
        let text: String = annotation.into();
        Self(text.trim_start_matches('@').to_string())
    }

    /// Annotation text without the leading `@`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Identifies one multibinding contribution, e.g. `test.Outer.CModule#c`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionId(String);

impl ContributionId {
    /// Create a contribution id
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonical identity of a requested value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// The value's type
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// Optional qualifier annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    /// Set for multibinding contributions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<ContributionId>,
}

impl Key {
    /// Unqualified key for a type
    pub fn new<T: Into<TypeName>>(type_name: T) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: None,
            contribution: None,
        }
    }

    /// Qualified key for a type
    pub fn qualified<T: Into<TypeName>, Q: Into<String>>(type_name: T, qualifier: Q) -> Self {
        Self {
            type_name: type_name.into(),
            qualifier: Some(Qualifier::new(qualifier)),
            contribution: None,
        }
    }

    /// Same key with the given qualifier
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Same key tagged as one multibinding contribution
    pub fn with_contribution(mut self, id: ContributionId) -> Self {
        self.contribution = Some(id);
        self
    }

    /// Same key with the contribution tag removed
    pub fn aggregate(&self) -> Key {
        Key {
            type_name: self.type_name.clone(),
            qualifier: self.qualifier.clone(),
            contribution: None,
        }
    }

    /// Same qualifier, different type
    pub fn with_type(&self, type_name: TypeName) -> Key {
        Key {
            type_name,
            qualifier: self.qualifier.clone(),
            contribution: None,
        }
    }

    /// Whether this key identifies a multibinding contribution
    pub fn is_contribution(&self) -> bool {
        self.contribution.is_some()
    }

    /// For `M<K, Provider<V>>` returns `M<K, V>`
    ///
    /// Map contributions are declared for the plain value type; a request for a map
    /// of providers resolves to the same contributions.
    pub fn unwrap_provider_values(&self) -> Option<Key> {
        let arguments = self.type_name.arguments();
        if arguments.len() != 2 {
            return None;
        }
        let value = arguments[1].unwrap_single(PROVIDER_TYPE)?;
        let unwrapped = self
            .type_name
            .with_arguments(vec![arguments[0].clone(), value.clone()]);
        Some(self.with_type(unwrapped))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier} ")?;
        }
        write!(f, "{}", self.type_name)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<TypeName> for Key {
    fn from(t: TypeName) -> Self {
        Key::new(t)
    }
}
