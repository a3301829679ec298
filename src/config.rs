//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/wxmenu/wxmenu.toml`
//! 3. Local config: `<project_dir>/.wxmenu.toml`
//! 4. Environment variables: `WXMENU_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Platform caps on menu size, checked by the editing front end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of top-level buttons
    pub max_top_level: usize,
    /// Maximum number of sub buttons under one top button
    pub max_sub_buttons: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_top_level: 3,
            max_sub_buttons: 5,
        }
    }
}

/// Raw limits for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLimits {
    pub max_top_level: Option<usize>,
    pub max_sub_buttons: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub menu_file: Option<PathBuf>,
    pub pretty: Option<bool>,
    pub limits: RawLimits,
}

/// Unified configuration for wxmenu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Menu file edited when `--file` is not given (default: menu.json)
    pub menu_file: PathBuf,
    /// Write indented JSON (default: true)
    pub pretty: bool,
    /// Platform caps
    pub limits: Limits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            menu_file: PathBuf::from("menu.json"),
            pretty: true,
            limits: Limits::default(),
        }
    }
}

/// Get the XDG config directory for wxmenu.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wxmenu").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wxmenu.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".wxmenu.toml")
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

/// Expand `~` and `$VAR` in a path, leaving it unchanged when expansion fails.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            menu_file: overlay
                .menu_file
                .clone()
                .unwrap_or_else(|| self.menu_file.clone()),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            limits: Limits {
                max_top_level: overlay
                    .limits
                    .max_top_level
                    .unwrap_or(self.limits.max_top_level),
                max_sub_buttons: overlay
                    .limits
                    .max_sub_buttons
                    .unwrap_or(self.limits.max_sub_buttons),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.wxmenu.toml`
    ///
    /// A relative `menu_file` from the local config is resolved against
    /// `project_dir`.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.menu_file = raw.menu_file.map(|file| {
                    let file = expand_path(&file);
                    if file.is_relative() {
                        dir.join(file)
                    } else {
                        file
                    }
                });
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.menu_file = expand_path(&current.menu_file);
        Ok(current)
    }

    /// Apply WXMENU_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WXMENU")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("menu_file") {
            settings.menu_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get::<usize>("limits.max_top_level") {
            settings.limits.max_top_level = val;
        }
        if let Ok(val) = config.get::<usize>("limits.max_sub_buttons") {
            settings.limits.max_sub_buttons = val;
        }

        Ok(settings)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_platform_caps_apply() {
        let settings = Settings::default();
        assert_eq!(settings.limits.max_top_level, 3);
        assert_eq!(settings.limits.max_sub_buttons, 5);
        assert!(settings.pretty);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let raw: RawSettings = toml::from_str("pretty = false\n[limits]\nmax_sub_buttons = 7\n").unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert!(!merged.pretty);
        assert_eq!(merged.limits.max_sub_buttons, 7);
        assert_eq!(merged.limits.max_top_level, 3);
        assert_eq!(merged.menu_file, PathBuf::from("menu.json"));
    }

    #[test]
    fn given_unknown_key_when_parsing_then_rejected() {
        let result: Result<RawSettings, _> = toml::from_str("colour = \"red\"\n");
        assert!(result.is_err());
    }
}
