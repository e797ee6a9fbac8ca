//! Channel listing command.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use serde_json::Value;

use cp_api::DataQuery;
use cp_core::config::ConfigHandle;
use cp_core::error::CpResult;

use super::{create_client, print_response, split_csv};
use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    mask: String,
    of: Option<String>,
    offset: Option<i64>,
    limit: Option<i64>,
    format: OutputFormat,
) -> CpResult<()> {
    let client = create_client(&config).await?;

    let query = DataQuery {
        of: of.as_deref().map(|raw| Value::from(split_csv(raw))),
        offset,
        limit,
        ..DataQuery::new(mask)
    };
    let response = client.list_channels(&query).await?;

    match (format, response.value()) {
        (OutputFormat::Text, Ok(Value::Array(channels))) if response.is_success() => {
            print_channels(&channels);
            Ok(())
        }
        _ => print_response(&response, format),
    }
}

fn print_channels(channels: &[Value]) {
    if channels.is_empty() {
        println!("{}", style("No channels found.").dim());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Channel"]);

    for (i, channel) in channels.iter().enumerate() {
        let name = match channel {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("channel")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| channel.to_string()),
            other => other.to_string(),
        };
        table.add_row(vec![(i + 1).to_string(), name]);
    }

    println!("{table}");
    println!("{} channels", channels.len());
}
