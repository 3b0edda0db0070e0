//! Loader configuration.
//!
//! The loader config is a small JSON file naming the herd endpoint, the
//! credentials, the action to run, and the rows file. CLI flags and the
//! interactive prompt can override the action and rows file for one run.
//!
//! # Location
//!
//! The config path is resolved in priority order:
//! 1. `--config` CLI flag
//! 2. `HERDCL_CONFIG` environment variable
//! 3. `<config dir>/herdcl/config.json`
//!
//! `HERDCL_PASSWORD` overrides the password stored in the file.
use crate::action::Action;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "HERDCL_CONFIG";
pub const PASSWORD_ENV: &str = "HERDCL_PASSWORD";
const CONFIG_DIR_NAME: &str = "herdcl";
const CONFIG_FILE_NAME: &str = "config.json";

/// Options handed to the controller when a run is prepared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub gui_enabled: bool,
}

/// Contents of the loader config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub base_url: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub action: String,
    pub rows_file: PathBuf,
}

/// Per-run overrides from the CLI or the interactive prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub action: Option<String>,
    pub rows_file: Option<PathBuf>,
    pub password: Option<String>,
}

/// Resolve the config path from the flag, the environment, and the platform config dir.
pub fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf> {
    resolve_config_path_from(flag, std::env::var_os(CONFIG_ENV), dirs::config_dir())
}

fn resolve_config_path_from(
    flag: Option<&Path>,
    env_value: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    config_dir
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            anyhow!("no config path: pass --config or set {CONFIG_ENV}")
        })
}

/// Load a loader config and resolve `rows_file` against the config directory.
pub fn load_config(path: &Path) -> Result<LoaderConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let mut config: LoaderConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse loader config JSON {}", path.display()))?;
    if config.rows_file.is_relative() {
        if let Some(parent) = path.parent() {
            config.rows_file = parent.join(&config.rows_file);
        }
    }
    Ok(config)
}

/// Overrides sourced from the process environment.
pub fn env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        password: std::env::var(PASSWORD_ENV)
            .ok()
            .filter(|value| !value.is_empty()),
        ..ConfigOverrides::default()
    }
}

/// Apply overrides; later sources win over the file.
pub fn apply_overrides(config: &mut LoaderConfig, overrides: &ConfigOverrides) {
    if let Some(action) = &overrides.action {
        config.action = action.clone();
    }
    if let Some(rows_file) = &overrides.rows_file {
        config.rows_file = rows_file.clone();
    }
    if let Some(password) = &overrides.password {
        config.password = Some(password.clone());
    }
}

/// Validate the endpoint, the username, and the action name.
pub fn validate_config(config: &LoaderConfig) -> Result<()> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        return Err(anyhow!("base_url must be non-empty"));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(anyhow!(
            "base_url must start with http:// or https:// (got {base_url:?})"
        ));
    }
    if config.username.trim().is_empty() {
        return Err(anyhow!("username must be non-empty"));
    }
    config.action.parse::<Action>()?;
    if config.rows_file.as_os_str().is_empty() {
        return Err(anyhow!("rows_file must be non-empty"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
