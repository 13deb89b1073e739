//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILCARDS_CONFIG` (environment variable)
//! 2. `~/.config/mailcards/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailcards\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::buttons::ShareAsMailPolicy;
use crate::error::{CardsError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Card rendering settings.
    pub render: RenderConfig,
    /// Structured-data extraction settings.
    pub extract: ExtractConfig,
    /// Button generation settings.
    pub buttons: ButtonsConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// UI language ("en", "es"). Falls back to the system locale.
    pub lang: Option<String>,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Card rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Icon set used for button icons: "material" or "svg".
    pub icon_set: String,
    /// Prepend the stylesheet/font head to the composed HTML.
    pub include_css_head: bool,
    /// Append a "show source" button with the card's JSON to every card.
    pub show_source: bool,
}

/// Structured-data extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// URL fragments eligible for "load cards" enrichment.
    pub allowlist: Vec<String>,
    /// Types dropped when a message yields more than one object.
    pub skip_types_when_multiple: Vec<String>,
    /// Derive a verification-code card when the subject mentions a code.
    pub derive_verification_codes: bool,
}

/// Button generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonsConfig {
    /// When to add the "share as mail" button.
    pub share_as_mail: ShareAsMailPolicy,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            lang: None,
            cache_dir: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            icon_set: "material".to_string(),
            include_css_head: true,
            show_source: false,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            allowlist: ["www.spiegel.de", "cooking.nytimes.com", "nl.nytimes.com/f/cooking"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_types_when_multiple: [
                "Organization",
                "NewsMediaOrganization",
                "WebSite",
                "BreadcrumbList",
                "WebPage",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            derive_verification_codes: true,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Read and parse the configuration file at `path`.
pub fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| CardsError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| CardsError::Config(e.to_string()))
}

/// Load configuration from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    match read_config(path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "Loaded config");
            cfg
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

/// Save configuration to `path`, or to the standard location when `None`.
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILCARDS_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mailcards").join("config.toml"))
}

/// Return the cache directory used for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailcards")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.render.icon_set, "material");
        assert!(cfg.render.include_css_head);
        assert!(!cfg.render.show_source);
        assert_eq!(cfg.extract.allowlist.len(), 3);
        assert!(cfg
            .extract
            .skip_types_when_multiple
            .contains(&"BreadcrumbList".to_string()));
        assert_eq!(cfg.buttons.share_as_mail, ShareAsMailPolicy::Always);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.buttons.share_as_mail = ShareAsMailPolicy::Types(vec!["Recipe".into()]);
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.render.icon_set, cfg.render.icon_set);
        assert_eq!(parsed.extract.allowlist, cfg.extract.allowlist);
        assert_eq!(parsed.buttons.share_as_mail, cfg.buttons.share_as_mail);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[render]
icon_set = "svg"

[buttons]
share_as_mail = "never"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.render.icon_set, "svg");
        assert_eq!(cfg.buttons.share_as_mail, ShareAsMailPolicy::Never);
        // Other fields use defaults
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.extract.derive_verification_codes);
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.extract.allowlist = vec!["example.org/recipes".into()];
        save_config(&cfg, Some(&path)).expect("save");

        let loaded = load_config_from(&path);
        assert_eq!(loaded.extract.allowlist, vec!["example.org/recipes"]);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render\nicon_set = ").expect("write");
        let cfg = load_config_from(&path);
        assert_eq!(cfg.render.icon_set, "material");
        assert!(matches!(read_config(&path), Err(CardsError::Config(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        match read_config(&path) {
            Err(CardsError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert_eq!(load_config_from(&path).general.log_level, "warn");
    }
}
