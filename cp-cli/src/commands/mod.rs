//! CLI command implementations.

pub mod channels;
pub mod config;
pub mod data;
pub mod device;
pub mod enroll;

use console::style;
use serde_json::Value;

use cp_api::{Credentials, Response, RestClient};
use cp_core::config::{AppConfig, ConfigHandle};
use cp_core::error::{CpError, CpResult};

use crate::OutputFormat;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub id: Option<String>,
    pub pass: Option<String>,
    pub master: bool,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
}

impl Overrides {
    /// Write the overrides into the in-memory configuration.
    pub async fn apply(self, config: &ConfigHandle) {
        let mut cfg = config.write().await;
        if let Some(id) = self.id {
            cfg.client.auth_id = id;
        }
        if let Some(pass) = self.pass {
            cfg.client.auth_pass = pass;
        }
        if self.master {
            cfg.client.is_master = true;
        }
        if let Some(url) = self.base_url {
            cfg.client.base_url = AppConfig::sanitize_base_url(&url);
        }
        if let Some(timeout) = self.timeout {
            cfg.client.timeout_secs = timeout;
        }
    }
}

/// Helper to create a REST client from config.
pub async fn create_client(config: &ConfigHandle) -> CpResult<RestClient> {
    let client_config = config.read().await.client.clone();
    RestClient::new(&client_config)
}

/// Store an adopted identity in the configuration file.
pub async fn save_identity(config: &ConfigHandle, creds: &Credentials) -> CpResult<()> {
    {
        let mut cfg = config.write().await;
        cfg.client.auth_id = creds.id.clone();
        cfg.client.auth_pass = creds.secret.clone();
        cfg.client.is_master = creds.master;
    }
    config.save().await?;
    println!(
        "  {} Identity {} saved to {}",
        style("OK").green(),
        style(&creds.id).cyan(),
        config.path()?.display()
    );
    Ok(())
}

/// Parse a command-line argument as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Print a response body and turn an HTTP error status into an error.
pub fn print_response(response: &Response, format: OutputFormat) -> CpResult<()> {
    let body = response.value().unwrap_or_else(|_| Value::String(response.body.clone()));

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": response.status,
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Text => {
            let status = format!("HTTP {} {}", response.status, response.status_text());
            if response.is_success() {
                println!("{}", style(status).green().bold());
            } else {
                println!("{}", style(status).red().bold());
            }
            if !response.body.is_empty() {
                println!("{}", render_value(&body));
            }
        }
    }

    check_status(response)
}

/// Error out on non-2xx statuses so the process exit code reflects them.
pub fn check_status(response: &Response) -> CpResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(CpError::Http(format!(
            "server answered {} {}",
            response.status,
            response.status_text()
        )))
    }
}

/// Human-readable rendering of a JSON value.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

/// Split a comma-separated list, dropping empty items.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate a string to a maximum length, appending an ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), serde_json::json!(42));
        assert_eq!(parse_value(r#"{"a":true}"#), serde_json::json!({"a": true}));
        assert_eq!(parse_value("hello"), serde_json::json!("hello"));
        assert_eq!(parse_value(r#""quoted""#), serde_json::json!("quoted"));
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer string", 8), "a lon...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(&Response::new(201, "")).is_ok());
        let err = check_status(&Response::new(404, "")).unwrap_err();
        assert_eq!(err.kind(), cp_core::ErrorKind::Http);
    }

    #[tokio::test]
    async fn test_overrides_apply() {
        let handle = ConfigHandle::new(AppConfig::default());
        Overrides {
            id: Some("owner@example.com".into()),
            pass: Some("pw".into()),
            master: true,
            base_url: Some("localhost:8080/iot".into()),
            timeout: Some(5),
        }
        .apply(&handle)
        .await;

        let cfg = handle.read().await;
        assert_eq!(cfg.client.auth_id, "owner@example.com");
        assert!(cfg.client.is_master);
        assert_eq!(cfg.client.base_url, "https://localhost:8080/iot/");
        assert_eq!(cfg.client.timeout_secs, 5);
    }
}
