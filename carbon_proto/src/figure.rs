//! Plotly-compatible figure descriptions.
//!
//! The structures mirror the subset of the plotly.js figure schema the
//! dashboard emits. Field names follow plotly's JSON keys so a frame can be
//! handed to `Plotly.react` without translation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Values of the first pie trace, if the figure carries one.
    pub fn pie_values(&self) -> Option<&[f64]> {
        self.data.iter().find_map(|trace| match trace {
            Trace::Pie(pie) => Some(pie.values.as_slice()),
            _ => None,
        })
    }

    /// The choropleth trace, if the figure carries one.
    pub fn choropleth(&self) -> Option<&ChoroplethTrace> {
        self.data.iter().find_map(|trace| match trace {
            Trace::Choropleth(map) => Some(map),
            _ => None,
        })
    }

    /// Text of the first layout annotation (the donut centre label).
    pub fn annotation_text(&self) -> Option<&str> {
        self.layout
            .annotations
            .first()
            .map(|annotation| annotation.text.as_str())
    }

    pub fn title_text(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|title| title.text.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choropleth(ChoroplethTrace),
    Pie(PieTrace),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoroplethTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    pub z: Vec<f64>,
    /// `[low_carbon, renewable]` per location, referenced by the hover template.
    pub customdata: Vec<[f64; 2]>,
    pub hovertemplate: String,
    pub colorscale: ColorScale,
    pub showscale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
}

/// Either a named plotly scale (`"Viridis"`) or explicit `[position, colour]` stops.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ColorScale {
    Named(String),
    Stops(Vec<(f64, String)>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorBar {
    pub title: TitleText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieTrace {
    pub values: Vec<f64>,
    pub hole: f64,
    pub textinfo: String,
    pub marker: PieMarker,
    pub showlegend: bool,
    pub sort: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieMarker {
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoverlabel: Option<HoverLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub text: String,
    pub font: Font,
    pub x: f64,
    pub xanchor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Font {
    pub size: u32,
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoLayout {
    pub showframe: bool,
    pub showcoastlines: bool,
    pub projection: GeoProjection,
    pub lonaxis: AxisRange,
    pub lataxis: AxisRange,
    pub center: GeoCenter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoProjection {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AxisRange {
    pub range: [f64; 2],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoCenter {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoverLabel {
    pub bgcolor: String,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub showarrow: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}
