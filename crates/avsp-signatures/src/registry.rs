use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::signature::parse_signature;
use crate::signature::ArgSpec;

/// Alias chains longer than this are treated as cycles.
const MAX_ALIAS_DEPTH: usize = 8;

/// Where a filter definition came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FilterCategory {
    Core,
    Plugin,
    UserDefined,
    ScriptDefined,
    ClipProperty,
}

/// A callable known to the editor, keyed case-insensitively by `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    pub name: String,
    pub signature: String,
    pub category: FilterCategory,
    pub alias_of: Option<String>,
}

impl FilterEntry {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        category: FilterCategory,
    ) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            category,
            alias_of: None,
        }
    }

    #[must_use]
    pub fn alias(name: impl Into<String>, target: impl Into<String>, category: FilterCategory) -> Self {
        Self {
            name: name.into(),
            signature: String::new(),
            category,
            alias_of: Some(target.into()),
        }
    }

    fn key(&self) -> String {
        registry_key(&self.name)
    }
}

fn registry_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("invalid filter definition `{name}`: {reason}")]
    InvalidEntry { name: String, reason: String },
    #[error("filter source unavailable: {0}")]
    Unavailable(String),
}

/// Produces already-materialized entries for a [`Registry`].
///
/// Where the entries come from (files, an index, user overrides) is up to the
/// implementor; loading happens outside the editing thread's hot path.
pub trait RegistryLoader {
    fn load_entries(&self) -> Result<Vec<FilterEntry>, LoadError>;
}

/// Every filter name the editor knows about.
///
/// Lookups are case-insensitive. Inserting a name that already exists
/// replaces the previous entry regardless of category, so user definitions
/// shadow builtins loaded before them.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: FxHashMap<String, FilterEntry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from loaders applied in order (later ones win).
    pub fn from_loaders(loaders: &[&dyn RegistryLoader]) -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for loader in loaders {
            registry.load(*loader)?;
        }
        Ok(registry)
    }

    /// Upsert every entry a loader produces. Returns how many were loaded.
    pub fn load(&mut self, loader: &dyn RegistryLoader) -> Result<usize, LoadError> {
        let entries = loader.load_entries()?;
        let count = entries.len();
        for entry in entries {
            self.upsert(entry);
        }
        tracing::debug!(count, total = self.entries.len(), "registry entries loaded");
        Ok(count)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FilterEntry> {
        self.entries.get(&registry_key(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&registry_key(name))
    }

    /// Look up `name` and follow `alias_of` links to the entry that owns the
    /// signature. A dangling or cyclic alias resolves to the last entry seen.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&FilterEntry> {
        let mut current = self.lookup(name)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            let Some(target) = current.alias_of.as_deref() else {
                return Some(current);
            };
            match self.lookup(target) {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
        Some(current)
    }

    /// Parsed argument slots for `name`, following aliases.
    #[must_use]
    pub fn arg_specs(&self, name: &str) -> Option<Vec<ArgSpec>> {
        self.resolve(name)
            .map(|entry| parse_signature(&entry.signature))
    }

    /// Insert or replace an entry. Returns the entry it replaced, if any.
    pub fn upsert(&mut self, entry: FilterEntry) -> Option<FilterEntry> {
        let previous = self.entries.insert(entry.key(), entry);
        if let Some(previous) = &previous {
            tracing::trace!(name = %previous.name, "registry entry replaced");
        }
        previous
    }

    /// Drop every entry of `category`. Returns how many were removed.
    pub fn remove_category(&mut self, category: FilterCategory) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.category != category);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Display names of every entry, in no particular order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
