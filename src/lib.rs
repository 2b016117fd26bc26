// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analytics;
pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod scheduler;
pub mod settings;
pub mod trends;

pub use crate::api::{create_router, AppState};
pub use crate::error::ApiError;

use axum::Router;
use tracing::info;

use crate::config::StudioConfig;

/// Build the full router from a given config (plus `/metrics` when enabled).
pub fn app_with_config(cfg: &StudioConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)?;
    let mut router = api::create_router(state);
    if cfg.metrics.enabled {
        let m = crate::metrics::Metrics::init()?;
        router = router.merge(m.router());
    }
    Ok(router)
}

/// Build the app the same way the binary does: `.env`, then config from
/// `$STUDIO_CONFIG_PATH` / `config/studio.toml` / defaults.
pub async fn app() -> anyhow::Result<Router> {
    let _ = dotenvy::dotenv();
    let cfg = StudioConfig::load_default()?;
    info!(
        provider = %cfg.generation.text_provider,
        metrics = cfg.metrics.enabled,
        "studio config loaded"
    );
    app_with_config(&cfg)
}
