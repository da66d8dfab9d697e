use crate::detect::provider::DetectionProvider;
use crate::detect::result::DetectedObject;

/// Stub provider for testing. Replays a fixed detection list.
pub struct StubDetector {
    detections: Vec<DetectedObject>,
}

impl StubDetector {
    pub fn new(detections: Vec<DetectedObject>) -> Self {
        Self { detections }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DetectionProvider for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(
        &self,
        _image: &str,
        _image_width: Option<f64>,
        _image_height: Option<f64>,
    ) -> Vec<DetectedObject> {
        self.detections.clone()
    }
}
