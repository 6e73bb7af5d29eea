// src/lib.rs
// Public library surface for integration tests and the shuttle binary.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{CmsConfig, SiteConfig};
pub use crate::content::{ArticleViewModel, ContentService, Origin};
pub use crate::error::{ContentError, RetrievalError, ValidationError};

use tracing::{info, warn};

/// Build the full application router from process configuration.
///
/// `/metrics` is merged in when `METRICS_ENABLED=1`.
pub fn app() -> anyhow::Result<axum::Router> {
    let cms = CmsConfig::load()?;
    if cms.is_configured() {
        info!(
            project = cms.project_id().unwrap_or_default(),
            dataset = cms.dataset().unwrap_or_default(),
            api_version = %cms.api_version,
            "cms configured"
        );
    } else {
        warn!("cms not configured; serving built-in articles");
    }

    let state = AppState::from_config(cms, SiteConfig::from_env())?;
    let mut router = api::router(state);
    if config::env_flag(config::site::ENV_METRICS_ENABLED) {
        router = router.merge(metrics::Metrics::init()?.router());
    }
    Ok(router)
}
