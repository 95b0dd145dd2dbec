//! Shared application state.
//!
//! The registry is owned here and injected into the handler layer; there
//! is no global registry, so tests can build as many isolated states as
//! they need, each with its own metrics and demo source.

use std::sync::Arc;

use scrapelab_core::{Registry, Result};

use crate::config::ServerConfig;
use crate::metrics;
use crate::sim::{DemoSource, RngSource};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    source: Arc<dyn DemoSource>,
}

impl AppState {
    /// Build application state with the production RNG source.
    /// Installs the metric set; definition errors fail startup.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_source(cfg, Arc::new(RngSource))
    }

    /// Build application state with an injected demo source (tests).
    pub fn with_source(cfg: ServerConfig, source: Arc<dyn DemoSource>) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        metrics::install(&registry)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                source,
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn source(&self) -> &Arc<dyn DemoSource> {
        &self.inner.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScriptedSource;

    #[test]
    fn states_are_isolated() {
        let a = AppState::new(ServerConfig::default()).unwrap();
        let b = AppState::new(ServerConfig::default()).unwrap();

        a.registry().inc_counter(crate::metrics::ORDERS, &["completed", "credit_card"]);
        assert_eq!(
            b.registry()
                .counter_value(crate::metrics::ORDERS, &["completed", "credit_card"]),
            None
        );
    }

    #[test]
    fn scripted_source_is_injectable() {
        let state =
            AppState::with_source(ServerConfig::default(), Arc::new(ScriptedSource::new([])))
                .unwrap();
        assert_eq!(state.source().pick(&["only"]), "only");
    }
}
