//! Clearance zone engine.
//!
//! This crate computes safety clearance zones around detected obstructions
//! (windows, doors, corners, vents, wall segments) for flue, boiler, and
//! radiator installations. Given a photo, a pixel-to-millimetre calibration
//! factor, an installation brand, and a marked installation point, it turns
//! detected bounding boxes into pixel-space exclusion rectangles.
//!
//! # Architecture
//!
//! The geometry core is pure and total:
//!
//! 1. **Rule table**: static brand x mode x obstruction clearance distances.
//! 2. **Resolver**: folds raw detector labels onto canonical rule keys;
//!    unrecognized labels resolve to nothing rather than erroring.
//! 3. **Geometry engine**: expands each obstruction's bounding box toward the
//!    marked installation point (directional bias), clamps to image bounds,
//!    and drops degenerate rectangles.
//!
//! Everything around the core is I/O glue: obstruction detection is delegated
//! to an external vision worker and degrades to "no obstructions found" on any
//! failure, and the transport layer is a small HTTP/JSON server with CORS that
//! validates requests before the engine ever sees them.
//!
//! # Module Structure
//!
//! - `rules`: clearance rule tables and obstruction-type resolution
//! - `zones`: the clearance-zone geometry engine
//! - `detect`: detection providers (remote vision worker, test stub)
//! - `api`: HTTP transport (routing, validation, CORS)
//! - `report`: bug-report formatting and email dispatch
//! - `config`: daemon configuration

pub mod api;
pub mod config;
pub mod detect;
pub mod report;
pub mod rules;
pub mod zones;

pub use detect::{DetectedObject, DetectionProvider, RemoteDetector, StubDetector};
pub use rules::{
    canonical_key, resolve_clearance_mm, rules_for, ClearanceRuleSet, InstallationMode,
    DEFAULT_BRAND,
};
pub use zones::{compute_zones, ClearanceZone, ReferencePoint, ZoneCollection};
