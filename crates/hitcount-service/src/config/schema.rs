use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;

use hitcount_core::error::{HitcountError, Result};
use hitcount_core::metrics::exposition::is_valid_identifier;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub hello: HelloSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            service: ServiceSection::default(),
            metrics: MetricsSection::default(),
            hello: HelloSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HitcountError::UnsupportedVersion);
        }

        self.service.validate()?;
        self.metrics.validate()?;
        self.hello.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Time between entering draining and closing the listener.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.shutdown_grace_ms > 60000 {
            return Err(HitcountError::BadRequest(
                "service.shutdown_grace_ms must be between 0 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            HitcountError::BadRequest(format!(
                "service.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_shutdown_grace_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Counter bumped once per business request.
    #[serde(default = "default_request_counter")]
    pub request_counter: String,

    /// Labels attached to the request counter.
    #[serde(default)]
    pub const_labels: BTreeMap<String, String>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            request_counter: default_request_counter(),
            const_labels: BTreeMap::new(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_identifier(&self.request_counter) {
            return Err(HitcountError::BadRequest(format!(
                "metrics.request_counter is not a valid metric name: {:?}",
                self.request_counter
            )));
        }
        if let Some(k) = self.const_labels.keys().find(|k| !is_valid_identifier(k)) {
            return Err(HitcountError::BadRequest(format!(
                "metrics.const_labels key is not a valid label name: {k:?}"
            )));
        }
        Ok(())
    }
}

fn default_request_counter() -> String {
    "app_requests_total".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelloSection {
    #[serde(default = "default_name")]
    pub default_name: String,
}

impl Default for HelloSection {
    fn default() -> Self {
        Self {
            default_name: default_name(),
        }
    }
}

impl HelloSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_name.is_empty() {
            return Err(HitcountError::BadRequest(
                "hello.default_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_name() -> String {
    "world".into()
}
