//! File loading and argument parsing shared by the command handlers

use crate::config::{Config, FileFormat};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use channelmap_core::{decode_mappings, Catalog, InMemoryCatalog, MappingSet, TransformRule};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a JSON, YAML or TOML file into `T`, format chosen by extension
pub async fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), bytes = content.len(), "Read file");
    parse_content(path, &content)
}

/// Parse file content in the format implied by `path`
pub fn parse_content<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let invalid = |expected: &str, reason: String| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: expected.to_string(),
        reason,
    };

    match FileFormat::from_path(path) {
        FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| invalid("YAML", e.to_string())),
        FileFormat::Toml => toml::from_str(content).map_err(|e| invalid("TOML", e.to_string())),
        FileFormat::Json => serde_json::from_str(content).map_err(|e| invalid("JSON", e.to_string())),
    }
}

/// Write `value` to `path` in the format implied by its extension
pub async fn write_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = match FileFormat::from_path(path) {
        FileFormat::Yaml => serde_yaml::to_string(value)?,
        FileFormat::Toml => toml::to_string_pretty(value)
            .map_err(|e| Error::other(format!("Failed to serialize {} as TOML: {}", path.display(), e)))?,
        FileFormat::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            text
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Read a mapping set file.
///
/// Entries that do not decode are printed as a validation report and fail the
/// command the way a validator error does.
pub async fn read_mapping_set(path: &Path, output: &mut OutputWriter) -> Result<MappingSet> {
    let raw: Vec<Value> = read_file(path).await?;
    match decode_mappings(&raw) {
        Ok(mappings) => Ok(mappings),
        Err(report) => {
            output.validation_report(&report)?;
            Err(Error::ValidationFailed {
                errors: report.errors().count(),
                warnings: 0,
            })
        }
    }
}

/// Load the configured catalog into an in-memory store
pub async fn load_catalog(config: &Config) -> Result<(PathBuf, InMemoryCatalog)> {
    let path = config.catalog_path()?;
    let catalog: Catalog = read_file(&path).await?;
    debug!(
        path = %path.display(),
        channels = catalog.channels.len(),
        "Loaded catalog"
    );
    Ok((path, InMemoryCatalog::from_catalog(catalog)?))
}

/// Write the store's contents back to the catalog file
pub async fn save_catalog(path: &Path, catalog: &InMemoryCatalog) -> Result<()> {
    write_file(path, &catalog.to_catalog()?).await
}

/// Interpret a command-line value: JSON when it parses, otherwise the literal string
pub fn parse_value_arg(text: &str, force_string: bool) -> Value {
    if force_string {
        return Value::String(text.to_string());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Parse a `--rule` argument: inline JSON, the stored text form, or `@path`
pub async fn parse_rule_arg(arg: &str) -> Result<Option<TransformRule>> {
    let descriptor: Value = match arg.strip_prefix('@') {
        Some(path) => read_file(Path::new(path)).await?,
        None => match serde_json::from_str(arg) {
            Ok(value) => value,
            // `None`, `null` and similar stored spellings
            Err(_) => Value::String(arg.to_string()),
        },
    };

    Ok(TransformRule::from_json(&descriptor)?)
}
