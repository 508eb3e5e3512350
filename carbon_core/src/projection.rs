//! Pure mapping from dataset + selection to the three dashboard figures.

use std::sync::Arc;

use carbon_proto::{
    Annotation, AxisRange, ChoroplethTrace, ColorBar, Figure, Font, GeoCenter, GeoLayout,
    GeoProjection, HoverLabel, Layout, Margin, PieMarker, PieTrace, SelectionSummary, Title,
    TitleText, Trace,
};

use crate::{
    config::DashboardConfig,
    dataset::{Dataset, LookupError},
    selection::SelectionState,
};

const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// The country actually rendered, after substituting the default when nothing
/// is hovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub country: String,
    pub progress_ticks: u32,
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonutMetric {
    LowCarbon,
    Renewable,
}

impl DonutMetric {
    fn title(self, country: &str) -> String {
        match self {
            DonutMetric::LowCarbon => format!("Low Carbon Energy in {country}"),
            DonutMetric::Renewable => format!("Renewable Energy in {country}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutView {
    pub metric: DonutMetric,
    pub country: String,
    pub full_pct: f64,
    pub displayed_pct: f64,
    /// `[displayed, 100 - displayed]`.
    pub values: [f64; 2],
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutFigures {
    pub selection: ResolvedSelection,
    pub low_carbon: Figure,
    pub renewable: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub selection: ResolvedSelection,
    pub map: Figure,
    pub low_carbon: Figure,
    pub renewable: Figure,
}

/// Share of `full_pct` shown after `ticks` of `max_ticks`.
pub fn displayed_pct(full_pct: f64, ticks: u32, max_ticks: u32) -> f64 {
    if max_ticks == 0 || ticks >= max_ticks {
        return full_pct;
    }
    let progress = f64::from(ticks) / f64::from(max_ticks);
    (full_pct * progress).clamp(0.0, full_pct)
}

pub fn format_pct(value: f64) -> String {
    format!("{value:.1}%")
}

#[derive(Debug, Clone)]
pub struct ViewProjector {
    dataset: Arc<Dataset>,
    config: Arc<DashboardConfig>,
}

impl ViewProjector {
    pub fn new(dataset: Arc<Dataset>, config: Arc<DashboardConfig>) -> Self {
        Self { dataset, config }
    }

    pub fn resolve(&self, state: &SelectionState) -> ResolvedSelection {
        match state.active_country() {
            Some(country) => ResolvedSelection {
                country: country.to_string(),
                progress_ticks: state.progress_ticks(),
                is_fallback: false,
            },
            None => ResolvedSelection {
                country: self.config.default_country().to_string(),
                progress_ticks: self.config.max_ticks(),
                is_fallback: true,
            },
        }
    }

    pub fn summary(&self, selection: &ResolvedSelection) -> SelectionSummary {
        SelectionSummary {
            country: selection.country.clone(),
            progress_ticks: selection.progress_ticks,
            max_ticks: self.config.max_ticks(),
            fallback: selection.is_fallback,
        }
    }

    pub fn donut(
        &self,
        metric: DonutMetric,
        selection: &ResolvedSelection,
    ) -> Result<DonutView, LookupError> {
        let record = self.dataset.lookup(&selection.country)?;
        let full_pct = match metric {
            DonutMetric::LowCarbon => record.low_carbon_pct,
            DonutMetric::Renewable => record.renewable_pct,
        };
        let displayed = if self.config.animate_progress() {
            displayed_pct(full_pct, selection.progress_ticks, self.config.max_ticks())
        } else {
            full_pct
        };

        Ok(DonutView {
            metric,
            country: record.country.clone(),
            full_pct,
            displayed_pct: displayed,
            values: [displayed, 100.0 - displayed],
            label: format_pct(displayed),
        })
    }

    pub fn donut_figure(&self, view: &DonutView) -> Figure {
        let palette = self.config.palette();
        let donut = self.config.donut();
        let fill = match view.metric {
            DonutMetric::LowCarbon => &palette.primary,
            DonutMetric::Renewable => &palette.secondary,
        };

        Figure {
            data: vec![Trace::Pie(PieTrace {
                values: view.values.to_vec(),
                hole: donut.hole,
                textinfo: "none".to_string(),
                marker: PieMarker {
                    colors: vec![fill.clone(), palette.track.clone()],
                },
                showlegend: false,
                sort: false,
            })],
            layout: Layout {
                title: Some(self.title(view.metric.title(&view.country), donut.title_font_size)),
                annotations: vec![Annotation {
                    text: view.label.clone(),
                    x: 0.5,
                    y: 0.5,
                    font: Font {
                        size: donut.label_font_size,
                        family: palette.font_family.clone(),
                        color: Some(fill.clone()),
                    },
                    showarrow: false,
                }],
                showlegend: Some(false),
                paper_bgcolor: Some(TRANSPARENT.to_string()),
                plot_bgcolor: Some(TRANSPARENT.to_string()),
                margin: Some(Margin {
                    l: 0,
                    r: 0,
                    t: 30,
                    b: 0,
                }),
                ..Layout::default()
            },
        }
    }

    pub fn map_figure(&self) -> Figure {
        let map = self.config.map();
        let palette = self.config.palette();

        let mut locations = Vec::with_capacity(self.dataset.len());
        let mut z = Vec::with_capacity(self.dataset.len());
        let mut customdata = Vec::with_capacity(self.dataset.len());
        for record in self.dataset.iter() {
            locations.push(record.country.clone());
            z.push(record.carbon_intensity);
            customdata.push([record.low_carbon_pct, record.renewable_pct]);
        }

        Figure {
            data: vec![Trace::Choropleth(ChoroplethTrace {
                locations,
                locationmode: "country names".to_string(),
                z,
                customdata,
                hovertemplate: "<b>%{location}</b><br>carbon-intensity: %{z}<br>low-carbon: %{customdata[0]:.1f}%<br>renewable: %{customdata[1]:.1f}%<extra></extra>".to_string(),
                colorscale: map.color_scale.clone(),
                showscale: map.show_scale,
                colorbar: map.show_scale.then(|| ColorBar {
                    title: TitleText {
                        text: "carbon-intensity".to_string(),
                    },
                }),
            })],
            layout: Layout {
                title: Some(self.title(map.title.clone(), map.title_font_size)),
                geo: Some(GeoLayout {
                    showframe: false,
                    showcoastlines: true,
                    projection: GeoProjection {
                        kind: map.projection.clone(),
                    },
                    lonaxis: AxisRange {
                        range: map.lon_range,
                    },
                    lataxis: AxisRange {
                        range: map.lat_range,
                    },
                    center: GeoCenter {
                        lon: map.center[0],
                        lat: map.center[1],
                    },
                }),
                hoverlabel: Some(HoverLabel {
                    bgcolor: "white".to_string(),
                    font: Font {
                        size: 14,
                        family: palette.font_family.clone(),
                        color: None,
                    },
                }),
                paper_bgcolor: Some(TRANSPARENT.to_string()),
                plot_bgcolor: Some(TRANSPARENT.to_string()),
                margin: Some(Margin {
                    l: 0,
                    r: 0,
                    t: 50,
                    b: 0,
                }),
                hovermode: Some("closest".to_string()),
                ..Layout::default()
            },
        }
    }

    /// Both donuts for the current state, without the (static) map.
    pub fn project_donuts(&self, state: &SelectionState) -> Result<DonutFigures, LookupError> {
        let selection = self.resolve(state);
        let low_carbon = self.donut(DonutMetric::LowCarbon, &selection)?;
        let renewable = self.donut(DonutMetric::Renewable, &selection)?;

        Ok(DonutFigures {
            low_carbon: self.donut_figure(&low_carbon),
            renewable: self.donut_figure(&renewable),
            selection,
        })
    }

    pub fn project(&self, state: &SelectionState) -> Result<DashboardViews, LookupError> {
        let donuts = self.project_donuts(state)?;
        Ok(DashboardViews {
            selection: donuts.selection,
            map: self.map_figure(),
            low_carbon: donuts.low_carbon,
            renewable: donuts.renewable,
        })
    }

    fn title(&self, text: String, size: u32) -> Title {
        let palette = self.config.palette();
        Title {
            text,
            font: Font {
                size,
                family: palette.font_family.clone(),
                color: Some(palette.text.clone()),
            },
            x: 0.5,
            xanchor: "center".to_string(),
        }
    }
}
