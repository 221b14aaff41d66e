//! Preview command handler

use crate::cli::PreviewArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::{load_catalog, read_file, read_mapping_set, write_file};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use channelmap_core::{MappingService, PreviewReport, PreviewRequest};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Handle the preview command
#[instrument(skip(config, output), fields(channel = %args.channel, input = %args.input.display()))]
pub async fn handle_preview(
    args: PreviewArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("preview_command", &args.channel);

    let (catalog_path, catalog) = load_catalog(config).await?;
    output.detail(&format!("Catalog: {}", catalog_path.display()))?;
    let document: Value = read_file(&args.input).await?;
    debug!(document = %redaction::redacted(&document), "Loaded input document");

    let service = MappingService::new(&catalog, &catalog);
    let spinner = output.spinner("Applying mappings...");

    let report = match &args.mappings {
        Some(path) => {
            let mappings = read_mapping_set(path, output).await?;
            // Unknown channels fail the same way as a stored preview
            let channel = catalog.channel(&args.channel)?;
            output.info(&format!(
                "Previewing {} unsaved mapping(s) for {}",
                mappings.len(),
                channel.code
            ))?;
            service.preview_with(&mappings, &document)
        }
        None => service.preview(&PreviewRequest::new(args.channel.clone(), document))?,
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    info!(
        fields = report.output.len(),
        errors = report.errors.len(),
        type_warnings = report.type_warnings.len(),
        "Preview complete"
    );

    if let Some(path) = &args.save_to {
        write_file(path, &report.output).await?;
        output.info(&format!("Mapped document saved to {}", path.display()))?;
    }

    output.preview_report(&report)?;
    failures(&report)
}

/// Per-field failures turn into a non-zero exit once the report is printed
pub(crate) fn failures(report: &PreviewReport) -> Result<()> {
    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(Error::MappingFailures {
            failed: report.errors.len(),
        })
    }
}
