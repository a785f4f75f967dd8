//! Layered settings for the script editor core.
//!
//! Sources, lowest to highest priority:
//!
//! 1. the user config file (`avsp.toml` in the platform config directory)
//! 2. `.avsp.toml` in the project root
//! 3. `avsp.toml` in the project root

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub highlight: HighlightSettings,
    pub calltips: CalltipSettings,
    pub filters: Vec<FilterDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct HighlightSettings {
    /// Color known filter names even when they are not followed by `(`.
    pub prefer_function_highlighting: bool,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CalltipSettings {
    /// Show `=default` on every slot instead of only the active one.
    pub show_all_defaults: bool,
}

/// A filter declared in configuration rather than discovered from a script.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
    pub name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub category: FilterKind,
    #[serde(default)]
    pub alias_of: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    User,
    Plugin,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("org", "avisynth", "avsp").and_then(|dirs| {
            Utf8PathBuf::from_path_buf(dirs.config_dir().join("avsp.toml")).ok()
        });

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!(path = %path, "adding user config source");
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        for name in [".avsp.toml", "avsp.toml"] {
            builder = builder.add_source(
                File::from(project_root.join(name).as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(filters = settings.filters.len(), "settings loaded");
        Ok(settings)
    }
}
