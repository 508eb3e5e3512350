//! Core crate for the European carbon dashboard.
//!
//! A [`Dataset`] is loaded once and shared read-only. Each connected page gets
//! a [`DashboardSession`] whose [`SelectionState`] is moved by hover and timer
//! events through the [`InteractionRouter`]; the [`ViewProjector`] turns the
//! dataset and that state into plotly figure descriptions.

pub mod config;
pub mod dataset;
pub mod metrics;
pub mod projection;
pub mod selection;
pub mod server;
mod session;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use thiserror::Error;

pub use config::{
    load_dashboard_config_from_env, DashboardConfig, DashboardConfigError,
    DashboardConfigMetadata, TickSource,
};
pub use dataset::{CountryRecord, Dataset, DatasetError, LookupError};
pub use metrics::SessionMetrics;
pub use projection::{
    displayed_pct, DashboardViews, DonutFigures, DonutMetric, DonutView, ResolvedSelection,
    ViewProjector,
};
pub use selection::{InteractionEvent, InteractionRouter, SelectionState, Transition};
pub use session::DashboardSession;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] DashboardConfigError),
    #[error("default country is unusable: {0}")]
    DefaultCountry(#[from] LookupError),
}

/// Process-wide, read-only state shared by every session.
#[derive(Debug)]
pub struct DashboardContext {
    config: Arc<DashboardConfig>,
    dataset: Arc<Dataset>,
    router: InteractionRouter,
    projector: ViewProjector,
    next_session: AtomicU64,
}

impl DashboardContext {
    /// Fails when the config is invalid or its default country is missing from
    /// the dataset; either would surface on the first render otherwise.
    pub fn new(config: DashboardConfig, dataset: Dataset) -> Result<Self, ContextError> {
        config.validate()?;
        dataset.lookup(config.default_country())?;

        let config = Arc::new(config);
        let dataset = Arc::new(dataset);
        Ok(Self {
            router: InteractionRouter::new(Arc::clone(&dataset), config.max_ticks()),
            projector: ViewProjector::new(Arc::clone(&dataset), Arc::clone(&config)),
            config,
            dataset,
            next_session: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    pub fn projector(&self) -> &ViewProjector {
        &self.projector
    }

    pub fn open_session(self: &Arc<Self>) -> DashboardSession {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        DashboardSession::new(id, Arc::clone(self))
    }
}
