//! CloudPlugs CLI - Command-line interface for the CloudPlugs IoT platform.
//!
//! Wraps every REST operation of the client library so devices can be
//! enrolled, inspected and fed with data from scripts or a terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use cp_core::config::{AppConfig, ConfigHandle};
use cp_core::error::CpResult;
use cp_core::logging;

/// CloudPlugs - IoT platform client.
#[derive(Parser)]
#[command(
    name = "cloudplugs",
    version,
    about = "CloudPlugs IoT platform CLI",
    long_about = "A command-line interface for the CloudPlugs REST API.\n\
                   Enroll devices, manage their properties and location, and publish or query data."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Plug id or account email to authenticate with (overrides config).
    #[arg(long, global = true)]
    id: Option<String>,

    /// Password or connection token (overrides config).
    #[arg(long, global = true)]
    pass: Option<String>,

    /// Treat the password as an account master password.
    #[arg(long, global = true)]
    master: bool,

    /// REST base URL (overrides config).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides config).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or modify device information.
    Device {
        #[command(subcommand)]
        action: commands::device::DeviceAction,
    },
    /// Read, write or remove device properties.
    Prop {
        #[command(subcommand)]
        action: commands::device::PropAction,
    },
    /// Read or set the device location.
    Location {
        #[command(subcommand)]
        action: commands::device::LocationAction,
    },
    /// Enroll products, prototypes and controllers.
    Enroll {
        #[command(subcommand)]
        action: commands::enroll::EnrollAction,
    },
    /// Obtain control of a device.
    Control {
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
        hwid: Option<String>,
        /// Name of this controller.
        #[arg(long)]
        name: Option<String>,
        /// Switch to the issued controller identity and save it to the config file.
        #[arg(long)]
        save: bool,
    },
    /// Give up control of devices.
    Uncontrol {
        /// Controller plug id (defaults to the configured identity).
        #[arg(long)]
        controller: Option<String>,
        /// Controlled plug ids to release (all when omitted).
        plug_ids: Vec<String>,
    },
    /// Remove devices from the platform.
    Unenroll {
        /// Plug ids to remove (defaults to the configured identity).
        plug_ids: Vec<String>,
    },
    /// Publish, retrieve and remove data.
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// List channels holding published data.
    Channels {
        /// Channel mask, e.g. "sensors/+".
        #[arg(default_value = "#")]
        mask: String,
        /// Restrict to data published by these plug ids (comma separated).
        #[arg(long)]
        of: Option<String>,
        #[arg(long)]
        offset: Option<i64>,
        #[arg(short = 'n', long)]
        limit: Option<i64>,
    },
    /// View and modify the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> CpResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_handle = match cli.config.as_deref() {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let config = if path.exists() {
                AppConfig::load_from_file(&path)?
            } else {
                AppConfig::default()
            };
            ConfigHandle::with_path(config, path)
        }
        None => ConfigHandle::new(AppConfig::load_default()?),
    };

    // Initialize logging
    let (log_level, log_dir, json_output) = {
        let cfg = config_handle.read().await;
        let level = if cli.verbose {
            "debug".to_string()
        } else {
            cfg.logging.level.clone()
        };
        let dir = cfg
            .effective_log_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("logs"));
        (level, dir, cfg.logging.json_output)
    };
    let _guard = logging::init_logging(&log_level, &log_dir, json_output)?;

    let overrides = commands::Overrides {
        id: cli.id,
        pass: cli.pass,
        master: cli.master,
        base_url: cli.base_url,
        timeout: cli.timeout,
    };
    overrides.apply(&config_handle).await;

    info!("CloudPlugs CLI v{}", cp_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Device { action } => {
            commands::device::run_device(config_handle, action, cli.format).await
        }
        Commands::Prop { action } => {
            commands::device::run_prop(config_handle, action, cli.format).await
        }
        Commands::Location { action } => {
            commands::device::run_location(config_handle, action, cli.format).await
        }
        Commands::Enroll { action } => {
            commands::enroll::run(config_handle, action, cli.format).await
        }
        Commands::Control { model, ctrl, ctrl_pass, hwid, name, save } => {
            let params = cp_api::ControlDevice { model, ctrl, pass: ctrl_pass, hwid, name };
            commands::enroll::run_control(config_handle, params, save, cli.format).await
        }
        Commands::Uncontrol { controller, plug_ids } => {
            commands::enroll::run_uncontrol(config_handle, controller, plug_ids, cli.format).await
        }
        Commands::Unenroll { plug_ids } => {
            commands::enroll::run_unenroll(config_handle, plug_ids, cli.format).await
        }
        Commands::Data { action } => {
            commands::data::run(config_handle, action, cli.format).await
        }
        Commands::Channels { mask, of, offset, limit } => {
            commands::channels::run(config_handle, mask, of, offset, limit, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, action, cli.format).await
        }
    }
}
