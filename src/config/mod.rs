//! Proxy settings.
//!
//! Overrides for the [`ProxyBuilder`](crate::ProxyBuilder) knobs that are not
//! code (rules, hooks and factories always are). Loaded from YAML files or
//! environment variables and applied with
//! [`ProxyBuilder::with_settings`](crate::ProxyBuilder::with_settings).

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "proxybuilder.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "PROXYBUILDER_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "PROXYBUILDER";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "PROXYBUILDER_LOG";

use serde::{Deserialize, Serialize};

use crate::advice::PostActionPolicy;
use crate::dispatch::CreationStrategy;
use crate::proxy::InstancePolicy;

/// Errors raised while loading [`ProxySettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Builder overrides loaded from configuration.
///
/// Policies left out of the source stay `None` and keep whatever the
/// builder was given in code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Record invocation metrics into the global registry.
    pub metrics: bool,
    /// Overload handling for the operation table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_strategy: Option<CreationStrategy>,
    /// When the underlying instance is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_policy: Option<InstancePolicy>,
    /// Whether post-actions also run after a failed call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_action_policy: Option<PostActionPolicy>,
}

impl ProxySettings {
    /// Load settings from file and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `proxybuilder.yaml` in the current directory (if it exists)
    /// 2. File given by `path` (if provided)
    /// 3. File named by `PROXYBUILDER_CONFIG` (if set)
    /// 4. `PROXYBUILDER__*` environment variables, e.g. `PROXYBUILDER__METRICS=true`
    pub fn load(path: Option<&str>) -> Result<Self, SettingsError> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(settings_path) = path {
            builder = builder.add_source(File::new(settings_path, FileFormat::Yaml).required(true));
        }

        if let Ok(settings_path) = std::env::var(CONFIG_ENV_VAR) {
            builder =
                builder.add_source(File::new(&settings_path, FileFormat::Yaml).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse settings from a YAML document. Policies left out stay `None`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
