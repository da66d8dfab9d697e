//! Clearance zone geometry.
//!
//! `compute_zones` is the core of the crate: a pure function from detected
//! obstructions, a rule set, a pixel calibration, and a marked installation
//! point to pixel-space exclusion rectangles. It holds no state and performs
//! no I/O; identical inputs always produce identical output.
//!
//! The defining behavior is the directional bias: an obstruction's exclusion
//! rectangle grows by the full clearance distance on the sides facing the
//! installation point and by a reduced share on the sides facing away.
//! Clearance matters on the path between the installation and the
//! obstruction; the far side is already behind it.

use serde::{Deserialize, Serialize};

use crate::detect::DetectedObject;
use crate::rules::{resolve_clearance_mm, ClearanceRuleSet};

/// Expansion share for edges facing away from the reference point.
const AWAY_FACTOR: f64 = 0.3;

/// Pixel location the user marked as the proposed installation position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReferencePoint {
    pub x: f64,
    pub y: f64,
}

/// A pixel-space exclusion rectangle derived from one detected obstruction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClearanceZone {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Human-readable requirement, e.g. `"300mm clearance from window"`.
    pub reason: String,
    /// Detector-reported type of the source obstruction.
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Zones bucketed by severity. Only `prohibited` is populated today;
/// `restricted` and `safe` are reserved tiers kept in the wire format.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ZoneCollection {
    pub prohibited: Vec<ClearanceZone>,
    pub restricted: Vec<ClearanceZone>,
    pub safe: Vec<ClearanceZone>,
}

impl ZoneCollection {
    pub fn is_empty(&self) -> bool {
        self.prohibited.is_empty() && self.restricted.is_empty() && self.safe.is_empty()
    }
}

/// Compute exclusion rectangles for every detected obstruction with a
/// resolvable clearance rule.
///
/// Objects whose type resolves to no rule are skipped, as are zones whose
/// clamped width or height collapses to zero. Output order follows input
/// order; overlapping zones are not merged. Without a reference point there
/// is nothing to anchor clearances to and the result is empty.
pub fn compute_zones(
    detections: &[DetectedObject],
    rules: &ClearanceRuleSet,
    px_per_mm: f64,
    position: Option<ReferencePoint>,
    image_width: Option<f64>,
    image_height: Option<f64>,
) -> ZoneCollection {
    let mut zones = ZoneCollection::default();

    let Some(position) = position else {
        return zones;
    };

    for obj in detections {
        let Some(clearance_mm) = resolve_clearance_mm(&obj.object_type, rules) else {
            continue;
        };
        let clearance_px = f64::from(clearance_mm) * px_per_mm;

        let (min_x, min_y, max_x, max_y) = if obj.object_type == "corner" {
            // A corner has no facing side; the hazard surrounds it.
            (
                obj.x - clearance_px,
                obj.y - clearance_px,
                obj.x + obj.width + clearance_px,
                obj.y + obj.height + clearance_px,
            )
        } else {
            // Each edge expands fully when the reference point lies strictly
            // beyond it, and by the reduced share otherwise. Horizontal and
            // vertical are independent, so a diagonal reference point expands
            // two adjacent edges fully.
            let left = position.x < obj.x;
            let right = position.x > obj.x + obj.width;
            let above = position.y < obj.y;
            let below = position.y > obj.y + obj.height;

            (
                obj.x - clearance_px * expansion(left),
                obj.y - clearance_px * expansion(above),
                obj.x + obj.width + clearance_px * expansion(right),
                obj.y + obj.height + clearance_px * expansion(below),
            )
        };

        let (min_x, max_x) = clamp_axis(min_x, max_x, image_width);
        let (min_y, max_y) = clamp_axis(min_y, max_y, image_height);

        let width = max_x - min_x;
        let height = max_y - min_y;
        if width <= 0.0 || height <= 0.0 {
            continue;
        }

        zones.prohibited.push(ClearanceZone {
            x: min_x,
            y: min_y,
            width,
            height,
            reason: format!("{}mm clearance from {}", clearance_mm, obj.object_type),
            object_type: obj.object_type.clone(),
            confidence: obj.confidence,
        });
    }

    zones
}

fn expansion(facing: bool) -> f64 {
    if facing {
        1.0
    } else {
        AWAY_FACTOR
    }
}

fn clamp_axis(min: f64, max: f64, bound: Option<f64>) -> (f64, f64) {
    match bound {
        Some(bound) => (min.max(0.0), max.min(bound)),
        None => (min, max),
    }
}
