//! Service config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use hitcount_core::error::{HitcountError, Result};

pub use schema::{HelloSection, MetricsSection, ServiceConfig, ServiceSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HITCOUNT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "hitcount.yaml";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HitcountError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| HitcountError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for this process.
///
/// An explicit `HITCOUNT_CONFIG` must exist. Without it, `hitcount.yaml` is
/// read when present and built-in defaults are used otherwise.
pub fn load() -> Result<ServiceConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => load_from_file(&path),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH),
        Err(_) => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using built-in defaults");
            let cfg = ServiceConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
