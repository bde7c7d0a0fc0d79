//! BlendingWaves
//!
//! Marketing site server: renders a static catalog into HTML pages, serves
//! static assets, and carries the liquid displacement effect used as the
//! hero animation.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod pages;

use std::time::Instant;
use thiserror::Error;
use tracing::info;

use crate::config::Settings;
use crate::domain::{Catalog, CatalogError};
use crate::engine::{EffectLayers, EffectParams};
use crate::pages::{PageError, PageRenderer};

/// Startup errors; any of these aborts the process
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Templates unavailable: {0}")]
    Pages(#[from] PageError),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Application state shared across all handlers
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub settings: Settings,
    pub catalog: Catalog,
    pub pages: PageRenderer,
    pub layers: EffectLayers,
    pub effect: EffectParams,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings, catalog: Catalog, pages: PageRenderer, layers: EffectLayers) -> Self {
        let effect = EffectParams::from(&settings.effect);
        AppState {
            settings,
            catalog,
            pages,
            layers,
            effect,
            started_at: Instant::now(),
        }
    }

    /// Load the catalog, templates and effect layers
    ///
    /// Catalog and template failures are fatal. Missing effect layers are
    /// logged and only disable preview renders.
    pub async fn build(settings: Settings) -> Result<Self, StartupError> {
        let catalog = Catalog::load(&settings.content.catalog_path)?;
        let pages = PageRenderer::load(&settings.content.templates_path)?;

        // Spawn blocking task for image decoding
        let top = settings.effect.top_image.clone();
        let bottom = settings.effect.bottom_image.clone();
        let layers = tokio::task::spawn_blocking(move || {
            EffectLayers::load(top.as_deref(), bottom.as_deref())
        })
        .await?;

        info!(
            items = catalog.len(),
            layers = layers.loaded_count(),
            "Application state ready"
        );

        Ok(AppState::new(settings, catalog, pages, layers))
    }
}
