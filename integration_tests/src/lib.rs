//! Fixtures shared by the cross-crate test suite.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use carbon_core::{DashboardConfig, DashboardContext, DashboardSession, Dataset};
use carbon_proto::{ClientEvent, DashboardFrame};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture_dataset() -> Result<Dataset> {
    let path = fixtures_dir().join("carbon.csv");
    Dataset::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn fixture_config() -> Result<DashboardConfig> {
    let path = fixtures_dir().join("test_dashboard_config.json");
    DashboardConfig::from_file(&path).with_context(|| format!("loading {}", path.display()))
}

pub fn fixture_context() -> Result<Arc<DashboardContext>> {
    Ok(Arc::new(DashboardContext::new(
        fixture_config()?,
        fixture_dataset()?,
    )?))
}

/// Feed `events` one at a time and collect every frame the session emits,
/// starting with the initial one.
pub fn replay(session: &mut DashboardSession, events: &[ClientEvent]) -> Result<Vec<DashboardFrame>> {
    let mut frames = vec![session.initial_frame()?];
    for event in events {
        if let Some(frame) = session.handle(event.clone().into())? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

pub fn labels(frame: &DashboardFrame) -> (Option<&str>, Option<&str>) {
    (
        frame.low_carbon.annotation_text(),
        frame.renewable.annotation_text(),
    )
}
