//! Shared application state for the tsgate gateway.
//!
//! The datastore is constructed once and injected here; handlers reach it only
//! through [`TimeseriesService`].

use std::sync::Arc;

use tsgate_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::ServiceMetrics;
use crate::services::TimeseriesService;
use crate::store::{self, Datastore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    service: TimeseriesService,
    metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Build state with the backend named in the config.
    /// Missing credentials for the hosted backend are reported as an error.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = store::build(&cfg.datastore)?;
        tracing::info!(
            backend = store.name(),
            timeout_ms = cfg.datastore.timeout_ms,
            retries = cfg.datastore.retries,
            "datastore ready"
        );
        Ok(Self::with_store(cfg, store))
    }

    /// Build state around an already constructed datastore.
    pub fn with_store(cfg: GatewayConfig, store: Arc<dyn Datastore>) -> Self {
        let metrics = Arc::new(ServiceMetrics::default());
        let service = TimeseriesService::new(
            store,
            Arc::clone(&metrics),
            cfg.ingest.timestamp_policy,
        );

        Self {
            inner: Arc::new(AppStateInner { cfg, service, metrics }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn service(&self) -> &TimeseriesService {
        &self.inner.service
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }
}
