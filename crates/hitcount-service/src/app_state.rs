//! Shared application state for the hitcount service.
//!
//! The registry is created here, once per process, and reaches handlers only
//! through axum's `State` extractor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hitcount_core::error::Result;
use hitcount_core::{CounterHandle, Registry};

use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<Registry>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    requests: CounterHandle,
    draining: AtomicBool,
}

impl AppState {
    /// Build application state with a fresh registry.
    /// Returns Result so main can refuse to start half-initialized.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build application state on top of an existing registry, registering
    /// the request counter into it.
    pub fn with_registry(cfg: ServiceConfig, registry: Arc<Registry>) -> Result<Self> {
        let labels: Vec<(&str, &str)> = cfg
            .metrics
            .const_labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let requests = registry
            .register_with_labels(&cfg.metrics.request_counter, &labels)
            .map_err(|e| {
                tracing::error!(metric = %cfg.metrics.request_counter, error = %e, "request counter registration failed");
                e
            })?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                requests,
                draining: AtomicBool::new(false),
            }),
            registry,
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Counter for business requests. Never bumped by ops endpoints.
    pub fn requests(&self) -> &CounterHandle {
        &self.inner.requests
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
