//! Per-user directories for configuration and logs.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{CpError, CpResult};

/// OS-specific directory lookups, namespaced under the application name.
pub struct Platform;

impl Platform {
    /// Where log files live by default (`~/.local/share/CloudPlugs` on Linux,
    /// `%APPDATA%\CloudPlugs` on Windows).
    pub fn data_dir() -> CpResult<PathBuf> {
        namespaced(dirs::data_dir(), "data")
    }

    /// Where `config.toml` lives by default (`~/.config/CloudPlugs` on Linux,
    /// `~/Library/Application Support/CloudPlugs` on macOS).
    pub fn config_dir() -> CpResult<PathBuf> {
        namespaced(dirs::config_dir(), "config")
    }
}

fn namespaced(base: Option<PathBuf>, kind: &str) -> CpResult<PathBuf> {
    base.map(|dir| dir.join(APP_NAME))
        .ok_or_else(|| CpError::Config(format!("could not determine {kind} directory")))
}
