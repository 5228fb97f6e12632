//! Gateway config loader (strict parsing).
//!
//! The YAML file is optional; credentials never live in it and are read from
//! the environment variables it names.

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use tsgate_core::error::{Result, TsGateError};

pub use schema::{Backend, Credentials, DatastoreSection, GatewayConfig, IngestSection, ServerSection};

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "TSGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tsgate.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TsGateError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TsGateError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `$TSGATE_CONFIG` (or `tsgate.yaml`); a missing default file means defaults.
pub fn load() -> Result<GatewayConfig> {
    let explicit = std::env::var(CONFIG_PATH_ENV).ok();
    let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound && explicit.is_none() => {
            tracing::info!(path, "no config file, using defaults");
            Ok(GatewayConfig::default())
        }
        Err(e) => Err(TsGateError::Config(format!("read config {path} failed: {e}"))),
    }
}
