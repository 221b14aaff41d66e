//! Mapping set command handlers

use crate::cli::{MappingsAction, MappingsArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::handlers::utils::{load_catalog, read_mapping_set, save_catalog};
use crate::handlers::validate::check_outcome;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use channelmap_core::{MappingService, MappingStore};
use std::path::Path;
use tracing::{info, instrument};

/// Handle the mappings command
pub async fn handle_mappings(
    args: MappingsArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        MappingsAction::Show { channel } => handle_show(&channel, config, output).await,
        MappingsAction::Save {
            channel,
            file,
            dry_run,
        } => handle_save(&channel, &file, dry_run, config, output).await,
    }
}

#[instrument(skip(config, output))]
async fn handle_show(channel: &str, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let (_, catalog) = load_catalog(config).await?;
    let mappings = catalog.fetch_mappings(channel)?;
    output.mapping_set(&mappings)
}

#[instrument(skip(file, config, output), fields(file = %file.display()))]
async fn handle_save(
    channel: &str,
    file: &Path,
    dry_run: bool,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("save_mappings", channel);

    let (catalog_path, catalog) = load_catalog(config).await?;
    let mappings = read_mapping_set(file, output).await?;
    let service = MappingService::new(&catalog, &catalog);

    // Same checks save_mappings runs, reported in full
    let report = service.validate_set(channel, &mappings)?;
    let outcome = check_outcome(&report, 0, false);
    // Machine formats print a single document: the report on failure, the saved set otherwise
    if output.format() == OutputFormat::Human || outcome.is_err() {
        output.validation_report(&report)?;
    }
    outcome?;

    if dry_run {
        output.success(&format!(
            "✓ {} mapping(s) would be saved for channel {} (dry run)",
            mappings.len(),
            channel
        ))?;
        return Ok(());
    }

    let saved = service.save_mappings(channel, mappings)?;
    save_catalog(&catalog_path, &catalog).await?;
    info!(
        catalog = %catalog_path.display(),
        mappings = saved.len(),
        "Catalog updated"
    );

    output.success(&format!(
        "✓ Saved {} mapping(s) for channel {}",
        saved.len(),
        channel
    ))?;
    output.mapping_set(&saved)
}
