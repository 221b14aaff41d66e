//! Configuration management for the CLI
//!
//! Configuration is read from the first file found among:
//! - the `--config` argument or `CHANNELMAP_CONFIG`
//! - `.channelmap.{yaml,json,toml}` and `channelmap.{yaml,json,toml}` in the current directory
//! - `<config_dir>/channelmap/config.{yaml,json,toml}`
//! - `~/.channelmap.{yaml,json,toml}`
//!
//! Command-line arguments override file values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog settings
    pub catalog: CatalogConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogSettings,

    /// File this configuration was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(skip)]
    catalog_from_cli: bool,
}

/// Where channels, schemas and mappings live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file (JSON or YAML)
    pub path: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output when the terminal supports it
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging settings stored in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level filter used when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// Serialization formats recognised by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Pick a format from a path's extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let mut config: Config = match FileFormat::from_path(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Configuration file paths checked in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for stem in [".channelmap", "channelmap"] {
            for ext in ["yaml", "json", "toml"] {
                paths.push(PathBuf::from(format!("{}.{}", stem, ext)));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("channelmap");
            for ext in ["yaml", "json", "toml"] {
                paths.push(dir.join(format!("config.{}", ext)));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            for ext in ["yaml", "json", "toml"] {
                paths.push(home_dir.join(format!(".channelmap.{}", ext)));
            }
        }

        paths
    }

    /// Default location for `config init`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("channelmap").join("config.yaml"))
    }

    /// Apply command-line overrides
    pub fn with_catalog_override(mut self, catalog: Option<PathBuf>) -> Self {
        if catalog.is_some() {
            self.catalog.path = catalog;
            self.catalog_from_cli = true;
        }
        self
    }

    /// Catalog path, relative paths resolved against the config file's directory
    pub fn catalog_path(&self) -> Result<PathBuf> {
        let path = self
            .catalog
            .path
            .as_ref()
            .ok_or(Error::CatalogNotConfigured)?;

        // Paths given on the command line stay relative to the working directory
        if path.is_relative() && !self.catalog_from_cli {
            if let Some(base) = self.source.as_deref().and_then(Path::parent) {
                return Ok(base.join(path));
            }
        }
        Ok(path.clone())
    }

    /// Render in the given format
    pub fn render(&self, format: FileFormat) -> Result<String> {
        match format {
            FileFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            FileFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
        }
    }

    /// Save configuration to a file, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(FileFormat::from_path(path))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
