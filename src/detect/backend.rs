use anyhow::Result;

use crate::{Frame, RawDetection};

/// Output of one inference call over a single encoded image.
#[derive(Clone, Debug)]
pub struct DetectedFrame {
    /// Dimensions of the decoded frame; the coordinate space for every
    /// bounding box in `detections`.
    pub frame: Frame,
    /// Flat detection list, in the order the model emitted it.
    pub detections: Vec<RawDetection>,
}

/// Detector backend trait: the seam to the external detection model.
///
/// The advisory kernel never inspects model internals. A backend consumes
/// an encoded image and a confidence floor and returns the flat detection
/// list plus frame dimensions; decoding and inference are the backend's
/// business. Backend failures surface to the caller unmodified; the kernel
/// performs no retries.
pub trait DetectorBackend: Send {
    /// Backend identifier, used for registry lookup and health reporting.
    fn name(&self) -> &'static str;

    /// Run detection on an encoded image, dropping detections below
    /// `min_confidence`.
    fn detect(&mut self, image: &[u8], min_confidence: f32) -> Result<DetectedFrame>;

    /// Optional warm-up hook (model loading, first-inference latency).
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
