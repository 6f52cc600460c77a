//! Global configuration for eqb

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global eqb configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Definition file used when a command is not given one
    #[serde(default)]
    pub definition: Option<PathBuf>,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    /// Load config from the default location (~/.config/eqb/config.toml)
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Get default config file path
    /// Checks ~/.config/eqb/config.toml first (XDG style),
    /// then falls back to OS-specific location
    pub fn default_path() -> PathBuf {
        if let Some(xdg_path) = Self::xdg_path() {
            if xdg_path.exists() {
                return xdg_path;
            }
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eqb")
            .join("config.toml")
    }

    /// Get the XDG-style config path (~/.config/eqb/config.toml)
    pub fn xdg_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("eqb").join("config.toml"))
    }

    /// Definition file to use: the explicit one, else the configured default
    pub fn resolve_definition(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.definition.clone())
            .context("No definition file given; pass --definition or set `definition` in the config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "definition = \"/srv/search.yaml\"\npretty = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.definition, Some(PathBuf::from("/srv/search.yaml")));
        assert!(config.pretty);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_bad_toml_has_context() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pretty = maybe").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_resolve_definition_prefers_explicit() {
        let config = Config {
            definition: Some(PathBuf::from("default.yaml")),
            pretty: false,
        };

        assert_eq!(
            config.resolve_definition(Some(PathBuf::from("cli.yaml"))).unwrap(),
            PathBuf::from("cli.yaml")
        );
        assert_eq!(config.resolve_definition(None).unwrap(), PathBuf::from("default.yaml"));
        assert!(Config::default().resolve_definition(None).is_err());
    }
}
