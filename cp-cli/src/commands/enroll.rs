//! Enrollment and control commands.

use clap::Subcommand;
use console::style;
use serde_json::Value;
use tracing::info;

use cp_api::{ControlDevice, EnrollController, EnrollProduct, EnrollPrototype, Outcome, RestClient};
use cp_core::config::ConfigHandle;
use cp_core::error::CpResult;

use super::{create_client, parse_value, print_response, save_identity};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum EnrollAction {
    /// Enroll a production device of a given model.
    Product {
        /// Plug id of the model.
        #[arg(long)]
        model: String,
        /// Hardware id (serial number) of the device.
        #[arg(long)]
        hwid: String,
        /// Connection password for the new device.
        #[arg(long = "device-pass")]
        device_pass: String,
        /// Initial properties as a JSON object.
        #[arg(long)]
        props: Option<String>,
        /// Switch to the issued identity and save it to the config file.
        #[arg(long)]
        save: bool,
    },
    /// Create a prototype device (needs a master credential).
    Prototype {
        #[arg(long)]
        name: String,
        #[arg(long)]
        hwid: Option<String>,
        #[arg(long = "device-pass")]
        device_pass: Option<String>,
        /// Permission filter as JSON.
        #[arg(long)]
        perm: Option<String>,
        /// Initial properties as a JSON object.
        #[arg(long)]
        props: Option<String>,
    },
    /// Enroll a controller for a production device.
    Controller {
        /// Plug id of the controlled device's model.
        #[arg(long)]
        model: String,
        /// Hardware id of the device to control.
        #[arg(long)]
        ctrl: String,
        /// Password of the device to control.
        #[arg(long = "ctrl-pass")]
        ctrl_pass: String,
        /// Hardware id of this controller.
        #[arg(long)]
        hwid: String,
        /// Name of this controller.
        #[arg(long)]
        name: String,
        /// Switch to the issued identity and save it to the config file.
        #[arg(long)]
        save: bool,
    },
}

pub async fn run(config: ConfigHandle, action: EnrollAction, format: OutputFormat) -> CpResult<()> {
    let mut client = create_client(&config).await?;

    match action {
        EnrollAction::Product { model, hwid, device_pass, props, save } => {
            let params = EnrollProduct {
                model,
                hwid,
                pass: device_pass,
                props: props.as_deref().map(parse_value),
                prop_links: None,
            };
            let outcome = client.enroll_product(&params).await?;
            finish_enrollment(&config, &mut client, outcome, save, format).await
        }
        EnrollAction::Prototype { name, hwid, device_pass, perm, props } => {
            let params = EnrollPrototype {
                name,
                pass: device_pass,
                hwid,
                perm: perm.as_deref().map(parse_value),
                props: props.as_deref().map(parse_value),
                prop_links: None,
            };
            let response = client.enroll_prototype(&params).await?;
            print_response(&response, format)
        }
        EnrollAction::Controller { model, ctrl, ctrl_pass, hwid, name, save } => {
            let params = EnrollController {
                model,
                ctrl,
                pass: ctrl_pass,
                hwid,
                name,
            };
            let outcome = client.enroll_controller(&params).await?;
            finish_enrollment(&config, &mut client, outcome, save, format).await
        }
    }
}

pub async fn run_control(
    config: ConfigHandle,
    params: ControlDevice,
    save: bool,
    format: OutputFormat,
) -> CpResult<()> {
    let mut client = create_client(&config).await?;
    let outcome = client.control_device(&params).await?;
    finish_enrollment(&config, &mut client, outcome, save, format).await
}

pub async fn run_uncontrol(
    config: ConfigHandle,
    controller: Option<String>,
    plug_ids: Vec<String>,
    format: OutputFormat,
) -> CpResult<()> {
    let client = create_client(&config).await?;
    let controlled = if plug_ids.is_empty() {
        None
    } else {
        Some(Value::from(plug_ids))
    };
    let response = client
        .uncontrol_device(controller.as_deref(), controlled.as_ref())
        .await?;
    print_response(&response, format)
}

pub async fn run_unenroll(
    config: ConfigHandle,
    plug_ids: Vec<String>,
    format: OutputFormat,
) -> CpResult<()> {
    let client = create_client(&config).await?;
    let ids = match plug_ids.len() {
        0 => None,
        1 => plug_ids.into_iter().next().map(Value::String),
        _ => Some(Value::from(plug_ids)),
    };
    let response = client.unenroll(ids.as_ref()).await?;
    print_response(&response, format)
}

/// Print the outcome of an identity-issuing operation and optionally persist
/// the issued credential.
async fn finish_enrollment(
    config: &ConfigHandle,
    client: &mut RestClient,
    outcome: Outcome,
    save: bool,
    format: OutputFormat,
) -> CpResult<()> {
    let issued = outcome.new_identity().cloned();
    let response = client.adopt(outcome);
    print_response(&response, format)?;

    match issued {
        Some(creds) => {
            info!(id = %creds.id, "new identity issued");
            if matches!(format, OutputFormat::Text) {
                println!("  Issued plug id: {}", style(&creds.id).cyan().bold());
            }
            if save {
                save_identity(config, &creds).await?;
            }
        }
        None if save => {
            println!(
                "  {} No identity was issued; configuration left unchanged.",
                style("WARN").yellow()
            );
        }
        None => {}
    }
    Ok(())
}
