//! Wire types exchanged between the dashboard server and the browser page.

mod figure;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use figure::{
    Annotation, AxisRange, ChoroplethTrace, ColorBar, ColorScale, Figure, Font, GeoCenter,
    GeoLayout, GeoProjection, HoverLabel, Layout, Margin, PieMarker, PieTrace, Title, TitleText,
    Trace,
};

/// A single interaction reported by the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Country under the pointer, or `None` once the pointer left the map.
    Hover {
        #[serde(default)]
        country: Option<String>,
    },
    Tick,
}

impl ClientEvent {
    pub fn hover(country: impl Into<String>) -> Self {
        ClientEvent::Hover {
            country: Some(country.into()),
        }
    }

    pub fn leave() -> Self {
        ClientEvent::Hover { country: None }
    }
}

/// One text frame from the page: either a lone event or a batch of events that
/// fired together. Batches are applied in order, so the last entry wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ClientMessage {
    Batch(Vec<ClientEvent>),
    Single(ClientEvent),
}

impl ClientMessage {
    pub fn into_events(self) -> Vec<ClientEvent> {
        match self {
            ClientMessage::Batch(events) => events,
            ClientMessage::Single(event) => vec![event],
        }
    }
}

/// Which country the donuts describe and how far their fill has progressed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionSummary {
    pub country: String,
    pub progress_ticks: u32,
    pub max_ticks: u32,
    /// Set when no country is hovered and the default country is shown.
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardFrame {
    pub sequence: u64,
    pub selection: SelectionSummary,
    /// Only present on the first frame of a session; the map never changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Figure>,
    pub low_carbon: Figure,
    pub renewable: Figure,
}

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("client message batch is empty")]
    EmptyBatch,
}

pub fn decode_client_message(data: &str) -> Result<ClientMessage, ProtoError> {
    let message: ClientMessage = serde_json::from_str(data)?;
    if let ClientMessage::Batch(events) = &message {
        if events.is_empty() {
            return Err(ProtoError::EmptyBatch);
        }
    }
    Ok(message)
}

pub fn encode_client_message(message: &ClientMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

pub fn encode_frame_json(frame: &DashboardFrame) -> serde_json::Result<String> {
    serde_json::to_string(frame)
}

pub fn decode_frame_json(data: &str) -> serde_json::Result<DashboardFrame> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_hover() {
        let message = decode_client_message(r#"{"type":"hover","country":"Belgium"}"#).unwrap();
        assert_eq!(message, ClientMessage::Single(ClientEvent::hover("Belgium")));
    }

    #[test]
    fn hover_without_country_means_pointer_left() {
        let explicit = decode_client_message(r#"{"type":"hover","country":null}"#).unwrap();
        let omitted = decode_client_message(r#"{"type":"hover"}"#).unwrap();
        assert_eq!(explicit, ClientMessage::Single(ClientEvent::leave()));
        assert_eq!(omitted, explicit);
    }

    #[test]
    fn batch_preserves_arrival_order() {
        let message =
            decode_client_message(r#"[{"type":"tick"},{"type":"hover","country":"France"}]"#)
                .unwrap();
        assert_eq!(
            message.into_events(),
            vec![ClientEvent::Tick, ClientEvent::hover("France")]
        );
    }

    #[test]
    fn rejects_empty_batch_and_unknown_type() {
        assert!(matches!(
            decode_client_message("[]"),
            Err(ProtoError::EmptyBatch)
        ));
        assert!(matches!(
            decode_client_message(r#"{"type":"click"}"#),
            Err(ProtoError::Malformed(_))
        ));
    }

    #[test]
    fn pie_trace_serializes_with_plotly_type_tag() {
        let figure = Figure {
            data: vec![Trace::Pie(PieTrace {
                values: vec![22.5, 77.5],
                hole: 0.7,
                textinfo: "none".to_string(),
                marker: PieMarker {
                    colors: vec!["#06BA63".to_string(), "#e0e0e0".to_string()],
                },
                showlegend: false,
                sort: false,
            })],
            layout: Layout::default(),
        };
        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"][0]["type"], "pie");
        assert_eq!(json["data"][0]["marker"]["colors"][1], "#e0e0e0");
        assert!(json["layout"].get("annotations").is_none());
        assert_eq!(figure.pie_values(), Some(&[22.5, 77.5][..]));
    }

    #[test]
    fn color_scale_accepts_name_or_stops() {
        let named: ColorScale = serde_json::from_str(r#""Viridis""#).unwrap();
        let stops: ColorScale =
            serde_json::from_str(r#"[[0, "darkgreen"], [1, "lightgreen"]]"#).unwrap();
        assert_eq!(named, ColorScale::Named("Viridis".to_string()));
        assert_eq!(
            stops,
            ColorScale::Stops(vec![
                (0.0, "darkgreen".to_string()),
                (1.0, "lightgreen".to_string())
            ])
        );
    }
}
