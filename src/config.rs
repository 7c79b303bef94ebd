//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/conntree/conntree.toml`
//! 3. Local config: file passed via `--config`
//! 4. Environment variables: `CONNTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Rendering options for the tree display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix containers and connections with a kind marker
    pub show_kind: bool,
    /// Append `protocol://host:port` to connections
    pub show_endpoint: bool,
    /// Render children of collapsed containers too
    pub show_collapsed: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_kind: true,
            show_endpoint: true,
            show_collapsed: true,
        }
    }
}

/// Raw display config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_kind: Option<bool>,
    pub show_endpoint: Option<bool>,
    pub show_collapsed: Option<bool>,
}

impl DisplayConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            show_kind: overlay.show_kind.unwrap_or(self.show_kind),
            show_endpoint: overlay.show_endpoint.unwrap_or(self.show_endpoint),
            show_collapsed: overlay.show_collapsed.unwrap_or(self.show_collapsed),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_name: Option<String>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Unified configuration for conntree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the root container when a layout does not set one
    pub root_name: String,
    /// Tree rendering options
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_name: "Connections".into(),
            display: DisplayConfig::default(),
        }
    }
}

/// Get the XDG config directory for conntree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "conntree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("conntree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Merge overlay config onto self (base). Overlay wins if Some.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_path` - Optional explicit config file; it must exist
    pub fn load(local_path: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, only if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit local config
        if let Some(path) = local_path {
            debug!(path = %path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Defaults overlaid with a single file, ignoring global config and env.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply CONNTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CONNTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_bool("display.show_kind") {
            settings.display.show_kind = val;
        }
        if let Ok(val) = config.get_bool("display.show_endpoint") {
            settings.display.show_endpoint = val;
        }
        if let Ok(val) = config.get_bool("display.show_collapsed") {
            settings.display.show_collapsed = val;
        }

        Ok(settings)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
