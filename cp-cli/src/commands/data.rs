//! Data commands: publish, retrieve and remove published entries.

use chrono::{TimeZone, Utc};
use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use serde_json::Value;

use cp_api::{DataEntry, DataQuery, DataRemoval};
use cp_core::config::ConfigHandle;
use cp_core::error::CpResult;

use super::{create_client, parse_value, print_response, render_value, split_csv, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DataAction {
    /// Publish a value, optionally on a channel.
    Publish {
        /// Value to publish; parsed as JSON when possible.
        value: String,
        /// Channel name.
        #[arg(long)]
        channel: Option<String>,
        /// Timestamp of the entry.
        #[arg(long)]
        at: Option<String>,
        /// Lifetime in seconds.
        #[arg(long)]
        ttl: Option<u64>,
        /// Publish on behalf of this plug id.
        #[arg(long)]
        of: Option<String>,
    },
    /// Retrieve published data matching a channel mask.
    Get {
        /// Channel mask.
        mask: String,
        /// Timestamp or object id.
        #[arg(long)]
        before: Option<String>,
        /// Timestamp or object id.
        #[arg(long)]
        after: Option<String>,
        /// Timestamps (comma separated).
        #[arg(long)]
        at: Option<String>,
        /// Publisher plug ids (comma separated).
        #[arg(long)]
        of: Option<String>,
        #[arg(long)]
        offset: Option<i64>,
        #[arg(short = 'n', long)]
        limit: Option<i64>,
    },
    /// Remove published data. At least one of the selectors is required.
    Remove {
        /// Channel mask.
        mask: String,
        /// Object ids (comma separated).
        #[arg(long)]
        ids: Option<String>,
        #[arg(long)]
        before: Option<String>,
        #[arg(long)]
        after: Option<String>,
        /// Timestamps (comma separated).
        #[arg(long)]
        at: Option<String>,
        /// Publisher plug ids (comma separated).
        #[arg(long)]
        of: Option<String>,
    },
}

pub async fn run(config: ConfigHandle, action: DataAction, format: OutputFormat) -> CpResult<()> {
    let client = create_client(&config).await?;

    match action {
        DataAction::Publish { value, channel, at, ttl, of } => {
            let entry = DataEntry {
                at: at.as_deref().map(parse_value),
                of,
                ttl,
                ..DataEntry::new(parse_value(&value))
            };
            let response = client.publish_data(&entry, channel.as_deref()).await?;
            print_response(&response, format)
        }
        DataAction::Get { mask, before, after, at, of, offset, limit } => {
            let query = DataQuery {
                before: before.as_deref().map(parse_value),
                after: after.as_deref().map(parse_value),
                at: at.as_deref().map(list_value),
                of: of.as_deref().map(list_value),
                offset,
                limit,
                ..DataQuery::new(mask)
            };
            let response = client.retrieve_data(&query).await?;
            match (format, response.value()) {
                (OutputFormat::Text, Ok(Value::Array(entries))) if response.is_success() => {
                    print_entries(&entries);
                    Ok(())
                }
                _ => print_response(&response, format),
            }
        }
        DataAction::Remove { mask, ids, before, after, at, of } => {
            let removal = DataRemoval {
                channel_mask: mask,
                id: ids.as_deref().map(list_value),
                before: before.as_deref().map(parse_value),
                after: after.as_deref().map(parse_value),
                at: at.as_deref().map(list_value),
                of: of.as_deref().map(list_value),
            };
            let response = client.remove_data(&removal).await?;
            print_response(&response, format)
        }
    }
}

/// A comma-separated argument as a JSON list.
fn list_value(raw: &str) -> Value {
    Value::from(split_csv(raw))
}

fn print_entries(entries: &[Value]) {
    if entries.is_empty() {
        println!("{}", style("No data found.").dim());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Id", "Channel", "At", "Of", "Data"]);

    for entry in entries {
        let field = |name: &str| entry.get(name).map(render_value).unwrap_or_default();
        table.add_row(vec![
            field("id"),
            field("channel"),
            entry.get("at").map(format_timestamp).unwrap_or_default(),
            field("of"),
            truncate(&entry.get("data").map(compact).unwrap_or_default(), 60),
        ]);
    }

    println!("{table}");
    println!("{} entries", entries.len());
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a numeric timestamp (seconds since the epoch) as a UTC date.
fn format_timestamp(value: &Value) -> String {
    value
        .as_i64()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| compact(value))
}
