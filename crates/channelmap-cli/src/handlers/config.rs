//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, FileFormat};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde_json::json;

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output).await,
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output).await,
        ConfigAction::Path => handle_config_path(config, output).await,
    }
}

impl From<ConfigFormat> for FileFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Toml => FileFormat::Toml,
            ConfigFormat::Json => FileFormat::Json,
            ConfigFormat::Yaml => FileFormat::Yaml,
        }
    }
}

/// Handle config init subcommand
async fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    let mut config = Config::default();
    config.catalog.path = Some("catalog.yaml".into());
    config.save(&path)?;

    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Set catalog.path to the catalog file holding your channels and mappings.")?;
    Ok(())
}

/// Handle config show subcommand
async fn handle_config_show(
    args: ConfigShowArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let content = config.render(args.format.into())?;
    output.writeln(content.trim_end())
}

/// Handle config path subcommand
async fn handle_config_path(config: &Config, output: &mut OutputWriter) -> Result<()> {
    let candidates = Config::default_config_paths();

    if output.format() != crate::cli::OutputFormat::Human {
        return output.data(&json!({
            "loaded": config.source,
            "search_paths": candidates,
        }));
    }

    match &config.source {
        Some(path) => output.writeln(&format!("Loaded: {}", path.display()))?,
        None => output.writeln("Loaded: (defaults, no config file found)")?,
    }

    output.section("Search Paths")?;
    for path in candidates {
        let marker = if path.exists() { "✓" } else { " " };
        output.writeln(&format!("  {} {}", marker, path.display()))?;
    }
    Ok(())
}
