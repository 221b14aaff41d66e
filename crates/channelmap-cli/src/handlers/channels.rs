//! Channel listing command handler

use crate::cli::{ChannelsArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::handlers::utils::load_catalog;
use crate::output::OutputWriter;
use channelmap_core::{Channel, ChannelField, ChannelSchemaSource, InternalField};
use serde::Serialize;

/// One row of the channel listing
#[derive(Debug, Serialize)]
struct ChannelSummary<'a> {
    id: &'a str,
    code: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    mappings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [ChannelField]>,
}

impl<'a> ChannelSummary<'a> {
    fn new(channel: &'a Channel, with_fields: bool) -> Self {
        Self {
            id: &channel.id,
            code: &channel.code,
            name: &channel.name,
            status: channel.status.as_deref(),
            mappings: channel.mappings.len(),
            fields: with_fields.then_some(channel.fields.as_slice()),
        }
    }
}

/// Handle the channels command
pub async fn handle_channels(
    args: ChannelsArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let (_, catalog) = load_catalog(config).await?;
    let channels = catalog.channels()?;

    if output.format() != OutputFormat::Human {
        let summaries: Vec<ChannelSummary<'_>> = channels
            .iter()
            .map(|channel| ChannelSummary::new(channel, args.fields))
            .collect();
        return output.data(&summaries);
    }

    if channels.is_empty() {
        return output.info("The catalog has no channels");
    }

    let rows = channels
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.code.clone(),
                c.name.clone(),
                c.status.clone().unwrap_or_else(|| "-".to_string()),
                c.fields.len().to_string(),
                c.mappings.len().to_string(),
            ]
        })
        .collect();
    output.table(&["ID", "Code", "Name", "Status", "Fields", "Mappings"], rows)?;

    if args.fields {
        for channel in &channels {
            output.section(&format!("{} ({})", channel.name, channel.code))?;
            if channel.fields.is_empty() {
                output.info("No API schema declared")?;
                continue;
            }
            output.table(&["Field", "Type", "Required", "Description"], field_rows(&channel.fields))?;
        }

        let internal = catalog.internal_schema()?;
        output.section("Internal Schema")?;
        output.table(&["Field", "Type", "Description"], internal_rows(internal.fields()))?;
    }

    Ok(())
}

fn field_rows(fields: &[ChannelField]) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                f.field_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
                if f.required { "yes" } else { "no" }.to_string(),
                f.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

fn internal_rows(fields: &[InternalField]) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                f.field_type.to_string(),
                f.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}
