use serde::{Deserialize, Serialize};

/// A detected obstruction in image pixel coordinates.
///
/// Produced by a `DetectionProvider` (or supplied directly by the client)
/// and treated as read-only by the engine: it is echoed back in responses
/// exactly as received.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DetectedObject {
    /// Raw detector-reported type label (`window`, `eaves`, `wall_left`, ...).
    #[serde(rename = "type")]
    pub object_type: String,
    /// Optional human-readable description from the detector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
