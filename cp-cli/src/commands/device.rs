//! Device, property and location commands.

use clap::Subcommand;

use cp_api::{DeviceLocation, DeviceUpdate};
use cp_core::config::ConfigHandle;
use cp_core::error::CpResult;

use super::{create_client, parse_value, print_response};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Show device information and properties.
    Get {
        /// Plug id (defaults to the configured identity).
        plug_id: Option<String>,
    },
    /// Modify device information.
    Set {
        /// Plug id (defaults to the configured identity).
        #[arg(long)]
        plug_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// ok, disabled or reactivate.
        #[arg(long)]
        status: Option<String>,
        /// Permission filter as JSON.
        #[arg(long)]
        perm: Option<String>,
        /// Properties as a JSON object.
        #[arg(long)]
        props: Option<String>,
        /// Property links as JSON.
        #[arg(long)]
        prop_links: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PropAction {
    /// Read one property, or all of them.
    Get {
        /// Property name (all properties when omitted).
        name: Option<String>,
        #[arg(long)]
        plug_id: Option<String>,
    },
    /// Write a property. The value is parsed as JSON when possible.
    Set {
        name: String,
        value: String,
        #[arg(long)]
        plug_id: Option<String>,
    },
    /// Write several properties from a JSON object.
    SetAll {
        /// JSON object mapping names to values; null removes a property.
        values: String,
        #[arg(long)]
        plug_id: Option<String>,
    },
    /// Remove a property.
    Remove {
        name: String,
        #[arg(long)]
        plug_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LocationAction {
    /// Show the device location.
    Get {
        plug_id: Option<String>,
    },
    /// Set the device location.
    Set {
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        altitude: Option<f64>,
        /// Accuracy radius in meters.
        #[arg(long)]
        accuracy: Option<f64>,
        /// Fix time (timestamp or date string).
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long)]
        plug_id: Option<String>,
    },
}

pub async fn run_device(
    config: ConfigHandle,
    action: DeviceAction,
    format: OutputFormat,
) -> CpResult<()> {
    let client = create_client(&config).await?;

    let response = match action {
        DeviceAction::Get { plug_id } => client.get_device(plug_id.as_deref()).await?,
        DeviceAction::Set { plug_id, name, status, perm, props, prop_links } => {
            let update = DeviceUpdate {
                id: plug_id,
                perm: perm.as_deref().map(parse_value),
                name,
                status,
                props: props.as_deref().map(parse_value),
                prop_links: prop_links.as_deref().map(parse_value),
            };
            client.set_device(&update).await?
        }
    };

    print_response(&response, format)
}

pub async fn run_prop(config: ConfigHandle, action: PropAction, format: OutputFormat) -> CpResult<()> {
    let client = create_client(&config).await?;

    let response = match action {
        PropAction::Get { name, plug_id } => {
            client
                .get_device_prop(plug_id.as_deref(), name.as_deref())
                .await?
        }
        PropAction::Set { name, value, plug_id } => {
            client
                .set_device_prop(plug_id.as_deref(), Some(&name), &parse_value(&value))
                .await?
        }
        PropAction::SetAll { values, plug_id } => {
            client
                .set_device_prop(plug_id.as_deref(), None, &parse_value(&values))
                .await?
        }
        PropAction::Remove { name, plug_id } => {
            client.remove_device_prop(plug_id.as_deref(), &name).await?
        }
    };

    print_response(&response, format)
}

pub async fn run_location(
    config: ConfigHandle,
    action: LocationAction,
    format: OutputFormat,
) -> CpResult<()> {
    let client = create_client(&config).await?;

    let response = match action {
        LocationAction::Get { plug_id } => client.get_device_location(plug_id.as_deref()).await?,
        LocationAction::Set { longitude, latitude, altitude, accuracy, timestamp, plug_id } => {
            let location = DeviceLocation {
                id: plug_id,
                altitude,
                accuracy,
                timestamp: timestamp.as_deref().map(parse_value),
                ..DeviceLocation::new(longitude, latitude)
            };
            client.set_device_location(&location).await?
        }
    };

    print_response(&response, format)
}
