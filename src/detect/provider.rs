use crate::detect::result::DetectedObject;

/// Obstruction detection provider.
///
/// Implementations must degrade to an empty list on any internal failure: an
/// unreachable or misbehaving detector means "no obstructions found", never a
/// failed request. Failures are logged by the implementation, not surfaced.
pub trait DetectionProvider: Send + Sync {
    /// Provider identifier.
    fn name(&self) -> &'static str;

    /// Detect obstructions in a photo supplied as a base64 string or data
    /// URI. Image dimensions, when known, are forwarded so the detector can
    /// report coordinates in the original pixel space.
    fn detect(
        &self,
        image: &str,
        image_width: Option<f64>,
        image_height: Option<f64>,
    ) -> Vec<DetectedObject>;
}
