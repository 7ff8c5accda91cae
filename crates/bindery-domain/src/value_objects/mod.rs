//! Value objects
//!
//! Immutable identities shared by every stage of the engine.

pub mod key;
pub mod location;
pub mod request;
pub mod type_name;

pub use key::{ContributionId, Key, Qualifier};
pub use location::SourceLocation;
pub use request::{DependencyRequest, RequestKind, RequestSite};
pub use type_name::{TypeName, WildcardBound};
