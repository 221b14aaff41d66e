//! Rule testing command handler

use crate::cli::{OutputFormat, TestRuleArgs};
use crate::error::{Error, Result};
use crate::handlers::preview::failures;
use crate::handlers::utils::{parse_rule_arg, parse_value_arg};
use crate::output::{format_value_compact, OutputWriter};
use channelmap_core::service::TEST_FIELD;
use channelmap_core::transform::built_in;
use channelmap_core::{InMemoryCatalog, MappingService, TransformRule};
use serde_json::json;
use tracing::{debug, instrument};

/// Handle the test-rule command
#[instrument(skip(output), fields(preset = ?args.preset))]
pub async fn handle_test_rule(args: TestRuleArgs, output: &mut OutputWriter) -> Result<()> {
    let rule = resolve_rule(&args).await?;
    let value = parse_value_arg(&args.value, args.string);
    debug!(rule = ?rule, "Testing rule");

    // Rule tests need no stored channel data
    let catalog = InMemoryCatalog::new();
    let service = MappingService::new(&catalog, &catalog);
    let report = service.test_rule(rule.clone(), value.clone());

    if output.format() == OutputFormat::Human {
        let rule_text = rule
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "identity".to_string());
        output.info(&format!("Rule: {}", rule_text))?;

        match report.output.get(TEST_FIELD) {
            Some(result) => output.success(&format!(
                "✓ {} → {}",
                format_value_compact(&value),
                format_value_compact(result)
            ))?,
            None => {
                for failure in &report.errors {
                    output.error(&format!("✗ {} ({})", failure.error, failure.error.kind()))?;
                }
            }
        }
    } else {
        output.data(&json!({
            "rule": TransformRule::to_json(rule.as_ref()),
            "input": value,
            "output": report.output.get(TEST_FIELD),
            "errors": report.errors,
        }))?;
    }

    failures(&report)
}

async fn resolve_rule(args: &TestRuleArgs) -> Result<Option<TransformRule>> {
    match (&args.rule, &args.preset) {
        (Some(rule), _) => parse_rule_arg(rule).await,
        (None, Some(name)) => built_in::preset(name).map(Some).ok_or_else(|| {
            Error::invalid_args(format!(
                "Unknown preset '{}'. Available: {}",
                name,
                built_in::PRESET_NAMES.join(", ")
            ))
        }),
        (None, None) => Err(Error::invalid_args("Pass --rule or --preset")),
    }
}
