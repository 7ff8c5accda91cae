//! Type names
//!
//! A structured view of the declared types that appear in keys. The canonical
//! text form has no space after commas (`java.util.Map<java.lang.String,test.C>`)
//! and is also the serialized form.

use crate::error::{Error, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Bound of a wildcard type argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WildcardBound {
    /// `? extends T`
    Extends(Box<TypeName>),
    /// `? super T`
    Super(Box<TypeName>),
}

/// A declared type with its type arguments, or a wildcard argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeName {
    /// A class or interface type, possibly parameterized
    Declared {
        /// Fully qualified name without type arguments
        name: String,
        /// Type arguments in declaration order
        arguments: Vec<TypeName>,
    },
    /// A wildcard type argument
    Wildcard {
        /// Upper or lower bound, if any
        bound: Option<WildcardBound>,
    },
}

impl TypeName {
    /// Create a non-generic declared type
    pub fn declared<S: Into<String>>(name: S) -> Self {
        Self::Declared {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Create a parameterized declared type
    pub fn generic<S: Into<String>>(name: S, arguments: Vec<TypeName>) -> Self {
        Self::Declared {
            name: name.into(),
            arguments,
        }
    }

    /// Parse the canonical text form
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }

    /// Qualified name without arguments; `?` for wildcards
    pub fn name(&self) -> &str {
        match self {
            Self::Declared { name, .. } => name,
            Self::Wildcard { .. } => "?",
        }
    }

    /// Type arguments (empty for wildcards and non-generic types)
    pub fn arguments(&self) -> &[TypeName] {
        match self {
            Self::Declared { arguments, .. } => arguments,
            Self::Wildcard { .. } => &[],
        }
    }

    /// Whether this is a wildcard
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    /// Whether a wildcard appears anywhere among the type arguments
    pub fn has_wildcard_arguments(&self) -> bool {
        self.arguments()
            .iter()
            .any(|arg| arg.is_wildcard() || arg.has_wildcard_arguments())
    }

    /// Single type argument of `name<T>`, if `self` is exactly that shape
    pub fn unwrap_single(&self, name: &str) -> Option<&TypeName> {
        match self {
            Self::Declared {
                name: own,
                arguments,
            } if own == name && arguments.len() == 1 => arguments.first(),
            _ => None,
        }
    }

    /// Replace type variables by their bound arguments
    ///
    /// Type variables are plain declared names without arguments whose name is a
    /// key of `bindings`.
    pub fn substitute(&self, bindings: &BTreeMap<String, TypeName>) -> TypeName {
        match self {
            Self::Declared { name, arguments } => {
                if arguments.is_empty() {
                    if let Some(bound) = bindings.get(name) {
                        return bound.clone();
                    }
                }
                Self::Declared {
                    name: name.clone(),
                    arguments: arguments.iter().map(|a| a.substitute(bindings)).collect(),
                }
            }
            Self::Wildcard { bound } => Self::Wildcard {
                bound: bound.as_ref().map(|b| match b {
                    WildcardBound::Extends(t) => {
                        WildcardBound::Extends(Box::new(t.substitute(bindings)))
                    }
                    WildcardBound::Super(t) => WildcardBound::Super(Box::new(t.substitute(bindings))),
                }),
            },
        }
    }

    /// Copy of this type with its arguments replaced
    pub fn with_arguments(&self, arguments: Vec<TypeName>) -> TypeName {
        Self::generic(self.name(), arguments)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared { name, arguments } if arguments.is_empty() => write!(f, "{name}"),
            Self::Declared { name, arguments } => {
                write!(f, "{name}<{}>", arguments.iter().join(","))
            }
            Self::Wildcard { bound: None } => write!(f, "?"),
            Self::Wildcard {
                bound: Some(WildcardBound::Extends(t)),
            } => write!(f, "? extends {t}"),
            Self::Wildcard {
                bound: Some(WildcardBound::Super(t)),
            } => write!(f, "? super {t}"),
        }
    }
}

impl FromStr for TypeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser { input: s, pos: 0 };
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(Error::invalid_type_name(
                s,
                format!("unexpected trailing input at offset {}", parser.pos),
            ));
        }
        Ok(parsed)
    }
}

/// Lenient conversion: text that does not parse becomes a bare declared name
impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| Self::declared(s.trim()))
    }
}

impl TryFrom<String> for TypeName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TypeName> for String {
    fn from(t: TypeName) -> Self {
        t.to_string()
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn error(&self, reason: &str) -> Error {
        Error::invalid_type_name(self.input, format!("{reason} at offset {}", self.pos))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let matched = rest.starts_with(keyword)
            && rest[keyword.len()..]
                .chars()
                .next()
                .is_some_and(char::is_whitespace);
        if matched {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        self.skip_whitespace();
        if self.peek() == Some('?') {
            self.pos += 1;
            self.skip_whitespace();
            let bound = if self.eat_keyword("extends") {
                Some(WildcardBound::Extends(Box::new(self.parse_type()?)))
            } else if self.eat_keyword("super") {
                Some(WildcardBound::Super(Box::new(self.parse_type()?)))
            } else {
                None
            };
            return Ok(TypeName::Wildcard { bound });
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',' | '?') || c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        let name = self.input[start..self.pos].to_string();

        self.skip_whitespace();
        let mut arguments = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                arguments.push(self.parse_type()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }
        Ok(TypeName::Declared { name, arguments })
    }
}
