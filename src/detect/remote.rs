//! Vision worker detection client.
//!
//! The worker receives a data-URI photo plus an analysis prompt and replies
//! with `{"objects": [...]}` (older deployments used `{"detections": [...]}`).
//! Coordinates come back in the original image dimensions, so no rescaling
//! happens here.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use url::Url;

use crate::detect::provider::DetectionProvider;
use crate::detect::result::DetectedObject;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DETECTION_PROMPT: &str = "Analyze this wall photo and identify all objects. \
For each object detected, provide: type (window/door/corner/soffit/vent/downpipe/boundary/other), \
bounding box coordinates {x, y, width, height} in pixels, and a descriptive label. \
Return ONLY valid JSON with format: \
{\"objects\": [{\"type\": \"window\", \"label\": \"Front window\", \"x\": 100, \"y\": 200, \"width\": 150, \"height\": 200}]}";

/// HTTP client for the external vision worker.
pub struct RemoteDetector {
    agent: ureq::Agent,
    worker_url: String,
}

impl RemoteDetector {
    pub fn new(worker_url: &str) -> Result<Self> {
        Url::parse(worker_url).context("parse detection worker url")?;
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Ok(Self {
            agent,
            worker_url: worker_url.to_string(),
        })
    }
}

impl DetectionProvider for RemoteDetector {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn detect(
        &self,
        image: &str,
        image_width: Option<f64>,
        image_height: Option<f64>,
    ) -> Vec<DetectedObject> {
        let payload = json!({
            "image": to_data_uri(image),
            "imageWidth": image_width,
            "imageHeight": image_height,
            "prompt": DETECTION_PROMPT,
        });

        let response = match self.agent.post(&self.worker_url).send_json(payload) {
            Ok(response) => response,
            Err(err) => {
                log::warn!("detection worker request failed: {}", err);
                return Vec::new();
            }
        };
        let body: Value = match response.into_json() {
            Ok(body) => body,
            Err(err) => {
                log::warn!("detection worker returned invalid json: {}", err);
                return Vec::new();
            }
        };
        parse_detections(&body)
    }
}

fn to_data_uri(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

fn parse_detections(body: &Value) -> Vec<DetectedObject> {
    let objects = body.get("objects").or_else(|| body.get("detections"));
    let Some(objects) = objects.and_then(Value::as_array) else {
        log::warn!("unexpected detection worker response shape");
        return Vec::new();
    };
    objects
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(obj) => Some(obj),
            Err(err) => {
                log::debug!("skipping malformed detection entry: {}", err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_base64_becomes_a_jpeg_data_uri() {
        assert_eq!(to_data_uri("abc123"), "data:image/jpeg;base64,abc123");
        assert_eq!(to_data_uri("data:image/png;base64,xyz"), "data:image/png;base64,xyz");
    }

    #[test]
    fn parses_objects_array() {
        let body = json!({
            "objects": [
                {"type": "window", "label": "Front window", "x": 100.0, "y": 200.0, "width": 150.0, "height": 200.0}
            ]
        });
        let detections = parse_detections(&body);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].object_type, "window");
        assert_eq!(detections[0].label.as_deref(), Some("Front window"));
    }

    #[test]
    fn falls_back_to_detections_array() {
        let body = json!({
            "detections": [
                {"type": "door", "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0, "confidence": 0.7}
            ]
        });
        let detections = parse_detections(&body);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].confidence, Some(0.7));
    }

    #[test]
    fn unexpected_shapes_degrade_to_empty() {
        assert!(parse_detections(&json!({"result": "ok"})).is_empty());
        assert!(parse_detections(&json!({"objects": "not-an-array"})).is_empty());
        assert!(parse_detections(&json!(null)).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let body = json!({
            "objects": [
                {"type": "window", "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0},
                {"x": 1.0},
            ]
        });
        assert_eq!(parse_detections(&body).len(), 1);
    }
}
