//! Domain constants
//!
//! Well-known type names the engine recognizes when normalizing requests.

/// Deferred provider wrapper
pub const PROVIDER_TYPE: &str = "javax.inject.Provider";

/// Deferred, memoizing wrapper
pub const LAZY_TYPE: &str = "dagger.Lazy";

/// Members injector wrapper
pub const MEMBERS_INJECTOR_TYPE: &str = "dagger.MembersInjector";

/// Aggregate type used for set multibindings
pub const SET_TYPE: &str = "java.util.Set";

/// Aggregate type used for map multibindings
pub const MAP_TYPE: &str = "java.util.Map";

/// Number of conflicting declarations listed before the remainder is collapsed
pub const DUPLICATE_DISPLAY_LIMIT: usize = 10;

/// Separator between component names in a component path annotation
pub const COMPONENT_PATH_SEPARATOR: &str = " → ";
