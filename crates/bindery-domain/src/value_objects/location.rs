//! Source locations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Best-effort position of a declaration, as supplied by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File containing the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 1-based line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Declaring element, e.g. `test.Outer.CComponent`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl SourceLocation {
    /// Location that only names the declaring element
    pub fn element<S: Into<String>>(element: S) -> Self {
        Self {
            element: Some(element.into()),
            ..Self::default()
        }
    }

    /// Attach a file and line
    pub fn at<P: Into<PathBuf>>(mut self, file: P, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{line}", file.display())?,
            (Some(file), None) => write!(f, "{}", file.display())?,
            _ => {}
        }
        if let Some(element) = &self.element {
            if self.file.is_some() {
                write!(f, " ")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
