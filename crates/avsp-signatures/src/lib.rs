//! Filter signatures: the registry of known callables, the parser for their
//! signature notation, and the text built from parsed signatures.
//!
//! ## Key Components
//!
//! - [`Registry`]: case-insensitive map of every known filter
//! - [`parse_signature`]: signature text to ordered [`ArgSpec`] slots
//! - [`build_default_invocation`], [`build_calltip_text`], [`suggest_values`]:
//!   presets, calltips and value lists
//! - [`BuiltinLoader`], [`UserFilterLoader`]: registry sources

mod builtins;
mod format;
mod loaders;
mod registry;
mod signature;
mod split;

pub use builtins::BuiltinLoader;
pub use format::build_calltip_text;
pub use format::build_default_invocation;
pub use format::suggest_values;
pub use format::CalltipText;
pub use loaders::is_identifier;
pub use loaders::UserFilterLoader;
pub use registry::FilterCategory;
pub use registry::FilterEntry;
pub use registry::LoadError;
pub use registry::Registry;
pub use registry::RegistryLoader;
pub use signature::parse_signature;
pub use signature::ArgSpec;
pub use signature::ArgType;
