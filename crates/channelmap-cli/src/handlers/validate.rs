//! Validation command handler

use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::{load_catalog, read_file};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use channelmap_core::mapping::check_types;
use channelmap_core::{MappingService, MappingStore, ValidationReport};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(channel = %args.channel, strict = args.strict))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.channel);

    let (_, catalog) = load_catalog(config).await?;
    let service = MappingService::new(&catalog, &catalog);

    output.info(&format!("Validating mappings for channel {}", args.channel))?;
    let report = service.validate_mappings(&args.channel)?;

    let type_warnings = match &args.input {
        Some(path) => {
            let document: Value = read_file(path).await?;
            let mappings = catalog.fetch_mappings(&args.channel)?;
            check_types(&mappings, &document)
        }
        None => Vec::new(),
    };

    if output.format() == OutputFormat::Human {
        output.validation_report(&report)?;
        if !type_warnings.is_empty() {
            output.section("Input Type Check")?;
            for warning in &type_warnings {
                output.warning(&warning.to_string())?;
            }
        } else if args.input.is_some() {
            output.success("✓ Input matches the declared field types")?;
        }
    } else {
        output.data(&json!({
            "issues": report.issues,
            "type_warnings": type_warnings,
        }))?;
    }

    check_outcome(&report, type_warnings.len(), args.strict)
}

/// Decide the exit status; `strict` also fails on warnings and type mismatches
pub(crate) fn check_outcome(report: &ValidationReport, type_warnings: usize, strict: bool) -> Result<()> {
    let errors = report.errors().count();
    let warnings = report.warnings().count() + type_warnings;

    if errors > 0 || (strict && warnings > 0) {
        warn!(errors, warnings, "Mapping set failed validation");
        return Err(Error::ValidationFailed { errors, warnings });
    }

    info!(warnings, "Mapping set is valid");
    Ok(())
}
