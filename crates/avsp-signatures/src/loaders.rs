use avsp_conf::FilterDefinition;
use avsp_conf::FilterKind;

use crate::registry::FilterCategory;
use crate::registry::FilterEntry;
use crate::registry::LoadError;
use crate::registry::RegistryLoader;

/// Turns `[[filters]]` settings into registry entries.
#[derive(Clone, Copy, Debug)]
pub struct UserFilterLoader<'a> {
    definitions: &'a [FilterDefinition],
}

impl<'a> UserFilterLoader<'a> {
    #[must_use]
    pub fn new(definitions: &'a [FilterDefinition]) -> Self {
        Self { definitions }
    }
}

impl RegistryLoader for UserFilterLoader<'_> {
    fn load_entries(&self) -> Result<Vec<FilterEntry>, LoadError> {
        self.definitions.iter().map(definition_to_entry).collect()
    }
}

fn definition_to_entry(definition: &FilterDefinition) -> Result<FilterEntry, LoadError> {
    if !is_identifier(&definition.name) {
        return Err(LoadError::InvalidEntry {
            name: definition.name.clone(),
            reason: "name must be a letter or underscore followed by letters, digits or underscores"
                .to_string(),
        });
    }

    let category = match definition.category {
        FilterKind::User => FilterCategory::UserDefined,
        FilterKind::Plugin => FilterCategory::Plugin,
    };

    let mut entry = FilterEntry::new(&definition.name, &definition.signature, category);
    entry.alias_of.clone_from(&definition.alias_of);
    Ok(entry)
}

/// Identifier rule shared by filter names and script variables.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
