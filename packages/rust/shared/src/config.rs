//! Application configuration for the help-book extractor.
//!
//! User config lives at `~/.helpbook/helpbook.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HelpBookError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "helpbook.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".helpbook";

/// File name of the syntax-helper container shipped with the platform.
pub const DEFAULT_CONTAINER_NAME: &str = "shcntx_ru.hbk";

// ---------------------------------------------------------------------------
// Config structs (matching helpbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where to find the container.
    #[serde(default)]
    pub source: SourceConfig,

    /// Extraction policies.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Exact file name of the container inside the installation directory.
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Platform installation directory searched for the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            container_name: default_container_name(),
            install_dir: None,
        }
    }
}

fn default_container_name() -> String {
    DEFAULT_CONTAINER_NAME.into()
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Record failing catalog pages and continue instead of aborting.
    #[serde(default = "default_true")]
    pub skip_failed_pages: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skip_failed_pages: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Extract options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction options, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Continue past failing catalog pages, collecting them as failures.
    pub skip_failed_pages: bool,
    /// Read enumeration catalogs.
    pub include_enums: bool,
    /// Read type catalogs.
    pub include_types: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExtractOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            skip_failed_pages: config.extraction.skip_failed_pages,
            include_enums: true,
            include_types: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.helpbook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| HelpBookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.helpbook/helpbook.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HelpBookError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HelpBookError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HelpBookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| HelpBookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HelpBookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("container_name"));
        assert!(toml_str.contains(DEFAULT_CONTAINER_NAME));
        assert!(!toml_str.contains("install_dir"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source.container_name, DEFAULT_CONTAINER_NAME);
        assert!(parsed.extraction.skip_failed_pages);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
install_dir = "/opt/1cv8"

[extraction]
skip_failed_pages = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.install_dir.as_deref(), Some("/opt/1cv8"));
        assert_eq!(config.source.container_name, DEFAULT_CONTAINER_NAME);

        let opts = ExtractOptions::from(&config);
        assert!(!opts.skip_failed_pages);
        assert!(opts.include_enums && opts.include_types);
    }

    #[test]
    fn load_config_from_reports_path() {
        let dir = std::env::temp_dir().join("helpbook_cfg_test_missing");
        let err = load_config_from(&dir.join("nope.toml")).unwrap_err();
        assert!(matches!(err, HelpBookError::Io { .. }));
    }
}
