use anyhow::Result;

use crate::detect::backend::{DetectedFrame, DetectorBackend};
use crate::{Frame, RawDetection};

/// Stub backend for tests and demos. Replays a fixed detection list,
/// ignoring the image payload.
pub struct StubBackend {
    frame: Frame,
    detections: Vec<RawDetection>,
}

impl StubBackend {
    pub fn new(frame: Frame, detections: Vec<RawDetection>) -> Self {
        Self { frame, detections }
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _image: &[u8], min_confidence: f32) -> Result<DetectedFrame> {
        let detections = self
            .detections
            .iter()
            .filter(|det| det.confidence >= min_confidence)
            .cloned()
            .collect();
        Ok(DetectedFrame {
            frame: self.frame,
            detections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundingBox;

    fn raw(label: &str, confidence: f32) -> RawDetection {
        RawDetection {
            label: label.to_string(),
            confidence,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap(),
        }
    }

    #[test]
    fn stub_applies_the_confidence_floor() {
        let frame = Frame::new(640, 480).unwrap();
        let mut backend = StubBackend::new(frame, vec![raw("person", 0.9), raw("car", 0.2)]);

        let result = backend.detect(b"ignored", 0.4).unwrap();
        assert_eq!(result.frame, frame);
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].label, "person");
    }

    #[test]
    fn stub_replays_identically_across_calls() {
        let frame = Frame::new(640, 480).unwrap();
        let mut backend = StubBackend::new(frame, vec![raw("person", 0.9)]);

        let first = backend.detect(b"frame1", 0.4).unwrap();
        let second = backend.detect(b"frame2", 0.4).unwrap();
        assert_eq!(first.detections, second.detections);
    }
}
