//! Configuration commands.

use clap::Subcommand;
use console::style;

use cp_core::config::{AppConfig, ConfigHandle};
use cp_core::error::{CpError, CpResult};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Get a value by key path.
    Get {
        /// Key path, e.g. "client.base_url".
        key: String,
    },
    /// Set a value by key path and save the file.
    Set {
        /// Key path, e.g. "client.timeout_secs".
        key: String,
        /// New value.
        value: String,
    },
}

const MASKED: &str = "********";

/// Resolve a dot-separated key path to a value from the config.
fn get_setting_value(cfg: &AppConfig, key: &str) -> Option<String> {
    match key {
        "client.base_url" => Some(cfg.client.base_url.clone()),
        "client.timeout_secs" | "client.timeout" => Some(cfg.client.timeout_secs.to_string()),
        "client.auth_id" => Some(cfg.client.auth_id.clone()),
        "client.auth_pass" => Some(mask(&cfg.client.auth_pass)),
        "client.is_master" => Some(cfg.client.is_master.to_string()),
        "client.enable_ssl" => Some(
            cfg.client
                .enable_ssl
                .map(|b| b.to_string())
                .unwrap_or_default(),
        ),
        "client.ca_cert_path" => Some(cfg.client.ca_cert_path.clone()),
        "logging.level" | "log.level" => Some(cfg.logging.level.clone()),
        "logging.directory" => Some(cfg.logging.directory.clone()),
        "logging.json_output" => Some(cfg.logging.json_output.to_string()),
        _ => None,
    }
}

/// Apply a value to a dot-separated key path on the config.
fn set_setting_value(cfg: &mut AppConfig, key: &str, value: &str) -> Result<(), String> {
    match key {
        "client.base_url" => {
            cfg.client.base_url = AppConfig::sanitize_base_url(value);
        }
        "client.timeout_secs" | "client.timeout" => {
            cfg.client.timeout_secs = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "client.auth_id" => {
            cfg.client.auth_id = value.to_string();
        }
        "client.auth_pass" => {
            cfg.client.auth_pass = value.to_string();
        }
        "client.is_master" => {
            cfg.client.is_master = value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "client.enable_ssl" => {
            cfg.client.enable_ssl = if value.is_empty() {
                None
            } else {
                Some(value.parse().map_err(|_| "expected true/false".to_string())?)
            };
        }
        "client.ca_cert_path" => {
            cfg.client.ca_cert_path = value.to_string();
        }
        "logging.level" | "log.level" => {
            let v = value.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&v.as_str()) {
                return Err("expected one of: trace, debug, info, warn, error".to_string());
            }
            cfg.logging.level = v;
        }
        "logging.directory" => {
            cfg.logging.directory = value.to_string();
        }
        "logging.json_output" => {
            cfg.logging.json_output = value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        _ => {
            return Err(format!("unknown setting key: {key}"));
        }
    }
    Ok(())
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        MASKED.to_string()
    }
}

fn print_config_text(cfg: &AppConfig) {
    println!("{}", style("Client").bold().underlined());
    println!("  client.base_url        {}", cfg.client.base_url);
    println!("  client.timeout_secs    {}", cfg.client.timeout_secs);
    println!("  client.auth_id         {}", cfg.client.auth_id);
    println!("  client.auth_pass       {}", mask(&cfg.client.auth_pass));
    println!("  client.is_master       {}", cfg.client.is_master);
    println!(
        "  client.enable_ssl      {}",
        cfg.client
            .enable_ssl
            .map(|b| b.to_string())
            .unwrap_or_else(|| "(from base_url)".to_string())
    );
    println!("  client.ca_cert_path    {}", cfg.client.ca_cert_path);

    println!();
    println!("{}", style("Logging").bold().underlined());
    println!("  logging.level          {}", cfg.logging.level);
    println!("  logging.directory      {}", cfg.logging.directory);
    println!("  logging.json_output    {}", cfg.logging.json_output);
}

fn config_json(cfg: &AppConfig) -> serde_json::Value {
    serde_json::json!({
        "client": {
            "base_url": cfg.client.base_url,
            "timeout_secs": cfg.client.timeout_secs,
            "auth_id": cfg.client.auth_id,
            "auth_pass": mask(&cfg.client.auth_pass),
            "is_master": cfg.client.is_master,
            "enable_ssl": cfg.client.enable_ssl,
            "ca_cert_path": cfg.client.ca_cert_path,
        },
        "logging": {
            "level": cfg.logging.level,
            "directory": cfg.logging.directory,
            "json_output": cfg.logging.json_output,
        },
    })
}

pub async fn run(config: ConfigHandle, action: ConfigAction, format: OutputFormat) -> CpResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&config_json(&cfg)).unwrap_or_default());
                }
                OutputFormat::Text => print_config_text(&cfg),
            }
        }
        ConfigAction::Path => {
            let path = config.path()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "path": path })),
                OutputFormat::Text => println!("{}", path.display()),
            }
        }
        ConfigAction::Get { key } => {
            let cfg = config.read().await;
            match get_setting_value(&cfg, &key) {
                Some(value) => match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::json!({ "key": key, "value": value }));
                    }
                    OutputFormat::Text => println!("{key} = {value}"),
                },
                None => {
                    return Err(CpError::Config(format!("unknown setting key: {key}")));
                }
            }
        }
        ConfigAction::Set { key, value } => {
            {
                let mut cfg = config.write().await;
                set_setting_value(&mut cfg, &key, &value).map_err(CpError::Config)?;
            }
            config.save().await?;
            println!(
                "  {} {} updated in {}",
                style("OK").green(),
                key,
                config.path()?.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set_roundtrip() {
        let mut cfg = AppConfig::default();
        set_setting_value(&mut cfg, "client.timeout_secs", "15").unwrap();
        set_setting_value(&mut cfg, "client.base_url", "localhost:9000/iot").unwrap();
        set_setting_value(&mut cfg, "client.enable_ssl", "false").unwrap();
        assert_eq!(get_setting_value(&cfg, "client.timeout_secs").as_deref(), Some("15"));
        assert_eq!(
            get_setting_value(&cfg, "client.base_url").as_deref(),
            Some("https://localhost:9000/iot/")
        );
        assert_eq!(cfg.client.enable_ssl, Some(false));
    }

    #[test]
    fn test_password_is_masked() {
        let mut cfg = AppConfig::default();
        assert_eq!(get_setting_value(&cfg, "client.auth_pass").as_deref(), Some(""));
        set_setting_value(&mut cfg, "client.auth_pass", "secret").unwrap();
        assert_eq!(get_setting_value(&cfg, "client.auth_pass").as_deref(), Some(MASKED));
        assert_eq!(config_json(&cfg)["client"]["auth_pass"], MASKED);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = AppConfig::default();
        assert!(set_setting_value(&mut cfg, "client.timeout_secs", "soon").is_err());
        assert!(set_setting_value(&mut cfg, "logging.level", "loud").is_err());
        assert!(set_setting_value(&mut cfg, "nope", "1").is_err());
        assert!(get_setting_value(&cfg, "nope").is_none());
    }
}
