//! Configuration commands.

use std::path::Path;

use crate::config::WakeshiftConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the effective configuration as TOML.
pub fn dump(config: &WakeshiftConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::config(format!("failed to serialize config: {e}")))?;
    println!("# config.toml ({})", path.display());
    println!("{toml_str}");
    Ok(())
}

/// Validates every section, resolving secret references.
pub fn validate(config: &WakeshiftConfig) -> ClientResult<()> {
    config.validate()?;
    if config.google.is_some() {
        println!("Google settings are valid.");
    }
    if config.oura.is_some() {
        println!("Oura settings are valid.");
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Prints the configuration file path and the token directory.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    println!("tokens: {}", wakeshift_providers::data_dir().display());
    Ok(())
}
