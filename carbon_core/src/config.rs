use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use carbon_proto::ColorScale;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_DASHBOARD_CONFIG: &str = include_str!("data/dashboard_config.json");

pub const CONFIG_PATH_ENV: &str = "CARBON_DASHBOARD_CONFIG_PATH";

/// Where timer ticks driving the donut fill originate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSource {
    /// The session task runs its own interval.
    #[default]
    Server,
    /// The page sends `tick` messages on the configured interval.
    Client,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    title: String,
    subtitle: String,
    default_country: String,
    max_ticks: u32,
    tick_interval_ms: u64,
    tick_source: TickSource,
    animate_progress: bool,
    bind: SocketAddr,
    dataset_path: PathBuf,
    palette: PaletteConfig,
    map: MapConfig,
    donut: DonutConfig,
}

impl DashboardConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_DASHBOARD_CONFIG)
            .expect("builtin dashboard config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, DashboardConfigError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DashboardConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| DashboardConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        DashboardConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), DashboardConfigError> {
        let invalid = |field: &'static str, reason: &'static str| {
            Err(DashboardConfigError::Invalid { field, reason })
        };

        if self.default_country.trim().is_empty() {
            return invalid("default_country", "must name a country");
        }
        if self.max_ticks == 0 {
            return invalid("max_ticks", "must be at least 1");
        }
        if self.tick_interval_ms == 0 {
            return invalid("tick_interval_ms", "must be at least 1");
        }
        if self.map.lon_range[0] >= self.map.lon_range[1] {
            return invalid("map.lon_range", "lower bound must be below upper bound");
        }
        if self.map.lat_range[0] >= self.map.lat_range[1] {
            return invalid("map.lat_range", "lower bound must be below upper bound");
        }
        if !(0.0..1.0).contains(&self.donut.hole) {
            return invalid("donut.hole", "must lie in [0, 1)");
        }
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    pub fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn tick_source(&self) -> TickSource {
        self.tick_source
    }

    pub fn animate_progress(&self) -> bool {
        self.animate_progress
    }

    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn palette(&self) -> &PaletteConfig {
        &self.palette
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    pub fn donut(&self) -> &DonutConfig {
        &self.donut
    }

    pub fn set_bind(&mut self, bind: SocketAddr) {
        self.bind = bind;
    }

    pub fn set_dataset_path(&mut self, path: PathBuf) {
        self.dataset_path = path;
    }

    pub fn set_tick_source(&mut self, source: TickSource) {
        self.tick_source = source;
    }

    pub fn set_animate_progress(&mut self, animate: bool) {
        self.animate_progress = animate;
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "European Carbon Intensity Dashboard".to_string(),
            subtitle: "Interactive visualization of carbon intensity, low-carbon, and renewable energy data across Europe.".to_string(),
            default_country: "Belgium".to_string(),
            max_ticks: 20,
            tick_interval_ms: 50,
            tick_source: TickSource::Server,
            animate_progress: true,
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8050),
            dataset_path: PathBuf::from("data/carbon.csv"),
            palette: PaletteConfig::default(),
            map: MapConfig::default(),
            donut: DonutConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardConfigError {
    #[error("failed to parse dashboard config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read dashboard config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid dashboard config: `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub background: String,
    pub text: String,
    /// Low-carbon donut fill.
    pub primary: String,
    /// Renewable donut fill.
    pub secondary: String,
    /// Unfilled remainder of both donuts.
    pub track: String,
    pub font_family: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            background: "#8B94A3".to_string(),
            text: "#2c3e50".to_string(),
            primary: "#06BA63".to_string(),
            secondary: "#E8CE4D".to_string(),
            track: "#e0e0e0".to_string(),
            font_family: "Roboto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub title: String,
    pub lon_range: [f64; 2],
    pub lat_range: [f64; 2],
    /// `[lon, lat]`.
    pub center: [f64; 2],
    pub projection: String,
    pub color_scale: ColorScale,
    pub show_scale: bool,
    pub title_font_size: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "Carbon Intensity Across Europe".to_string(),
            lon_range: [-10.0, 25.0],
            lat_range: [35.0, 60.0],
            center: [5.0, 50.0],
            projection: "mercator".to_string(),
            color_scale: ColorScale::Stops(vec![
                (0.0, "darkgreen".to_string()),
                (1.0, "lightgreen".to_string()),
            ]),
            show_scale: false,
            title_font_size: 22,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DonutConfig {
    pub hole: f64,
    pub label_font_size: u32,
    pub title_font_size: u32,
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            hole: 0.7,
            label_font_size: 24,
            title_font_size: 18,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfigMetadata {
    path: Option<PathBuf>,
}

impl DashboardConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Resolve the config from `CARBON_DASHBOARD_CONFIG_PATH`, the crate's data
/// directory, or the builtin copy, in that order.
///
/// A file named by the environment variable must load; only the crate's own
/// copy falls back to the builtin.
pub fn load_dashboard_config_from_env(
) -> Result<(DashboardConfig, DashboardConfigMetadata), DashboardConfigError> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
        let config = DashboardConfig::from_file(&path)?;
        tracing::info!(
            target: "carbon_dashboard::config",
            path = %path.display(),
            "dashboard_config.loaded=env"
        );
        return Ok((config, DashboardConfigMetadata::new(Some(path))));
    }

    let default_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/data/dashboard_config.json");
    match DashboardConfig::from_file(&default_path) {
        Ok(config) => {
            tracing::info!(
                target: "carbon_dashboard::config",
                path = %default_path.display(),
                "dashboard_config.loaded=file"
            );
            return Ok((config, DashboardConfigMetadata::new(Some(default_path))));
        }
        Err(err) => {
            tracing::warn!(
                target: "carbon_dashboard::config",
                path = %default_path.display(),
                error = %err,
                "dashboard_config.load_failed"
            );
        }
    }

    let config = DashboardConfig::builtin();
    tracing::info!(
        target: "carbon_dashboard::config",
        "dashboard_config.loaded=builtin"
    );
    Ok((config, DashboardConfigMetadata::new(None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses_and_validates() {
        let config = DashboardConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.default_country(), "Belgium");
        assert_eq!(config.max_ticks(), 20);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.bind().port(), 8050);
        assert!(config.bind().ip().is_unspecified());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config = DashboardConfig::from_json_str(
            r#"{ "default_country": "France", "map": { "color_scale": "Viridis" } }"#,
        )
        .unwrap();
        assert_eq!(config.default_country(), "France");
        assert_eq!(config.max_ticks(), 20);
        assert_eq!(config.map().lon_range, [-10.0, 25.0]);
        assert_eq!(
            config.map().color_scale,
            ColorScale::Named("Viridis".to_string())
        );
        assert_eq!(config.tick_source(), TickSource::Server);
    }

    #[test]
    fn tick_source_is_snake_case() {
        let config = DashboardConfig::from_json_str(r#"{ "tick_source": "client" }"#).unwrap();
        assert_eq!(config.tick_source(), TickSource::Client);
    }

    #[test]
    fn zero_max_ticks_is_rejected() {
        let err = DashboardConfig::from_json_str(r#"{ "max_ticks": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            DashboardConfigError::Invalid {
                field: "max_ticks",
                ..
            }
        ));
    }

    #[test]
    fn inverted_viewport_is_rejected() {
        let err =
            DashboardConfig::from_json_str(r#"{ "map": { "lat_range": [60, 35] } }"#).unwrap_err();
        assert!(matches!(
            err,
            DashboardConfigError::Invalid {
                field: "map.lat_range",
                ..
            }
        ));
    }

    #[test]
    fn blank_default_country_is_rejected() {
        let err = DashboardConfig::from_json_str(r#"{ "default_country": "  " }"#).unwrap_err();
        assert!(matches!(
            err,
            DashboardConfigError::Invalid {
                field: "default_country",
                ..
            }
        ));
    }
}
