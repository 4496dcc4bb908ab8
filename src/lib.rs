//! Wayfinder advisory kernel
//!
//! This crate turns raw per-frame object detections (class labels,
//! confidences, bounding boxes) into a prioritized, spatially-aware
//! natural-language advisory for a visually-impaired navigation aid.
//!
//! # Pipeline
//!
//! raw detections -> geometry enrichment -> importance filtering ->
//! advisory composition (default flow) or query intent matching (query
//! flow) -> advisory string.
//!
//! Every stage is a pure function over a single frame: no cross-frame
//! state, no tracking, no retries. The detection model itself is an opaque
//! collaborator behind the `detect` seam and is never reimplemented here.
//!
//! # Module Structure
//!
//! - `geometry`: position and distance classification for bounding boxes
//! - `priority`: navigation priority table and importance filter
//! - `advisory`: voice-message composition
//! - `query`: keyword-driven intent matching over spoken queries
//! - `pipeline`: `Advisor` entry points (`process_frame`, `process_query`)
//! - `detect`: detector backend trait, registry, and stub backend
//! - `api`: HTTP host for `wayfinderd`
//! - `config`: service configuration

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod advisory;
pub mod api;
pub mod config;
pub mod detect;
pub mod geometry;
pub mod pipeline;
pub mod priority;
pub mod query;

pub use advisory::{compose, PATH_CLEAR};
pub use detect::{BackendRegistry, DetectedFrame, DetectorBackend, StubBackend};
pub use geometry::{classify_distance, classify_position};
pub use pipeline::{Advisor, FrameAdvisory, QueryAdvisory};
pub use priority::{filter_important, PriorityTable, MAX_RANKED};

// -------------------- Geometry Preconditions --------------------

/// Precondition violation on frame or bounding-box geometry.
///
/// A zero-sized frame or an inverted box is a programmer error: the kernel
/// fails fast at construction instead of clamping or guessing, so invalid
/// geometry is unrepresentable downstream.
#[derive(Clone, Debug)]
pub struct InvalidGeometry {
    message: String,
}

impl InvalidGeometry {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid geometry: {}", self.message)
    }
}

impl std::error::Error for InvalidGeometry {}

// -------------------- Frame --------------------

/// Pixel dimensions of the source frame.
///
/// All positions and areas are relative to one frame. Dimensions are
/// validated at construction, so classification never divides by zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Result<Self, InvalidGeometry> {
        if width == 0 || height == 0 {
            return Err(InvalidGeometry::new(format!(
                "frame dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }
}

// -------------------- Bounding Boxes --------------------

/// Axis-aligned bounding box in frame pixel coordinates.
///
/// Corners must satisfy `x1 < x2` and `y1 < y2`; this is enforced at
/// construction and on deserialization. On the wire the box is the
/// `[x1, y1, x2, y2]` array the host API exchanges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, InvalidGeometry> {
        // The negated comparisons also reject NaN corners.
        if !(x1 < x2) || !(y1 < y2) {
            return Err(InvalidGeometry::new(format!(
                "bounding box corners must satisfy x1 < x2 and y1 < y2, got ({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn x1(&self) -> f32 {
        self.x1
    }

    pub fn y1(&self) -> f32 {
        self.y1
    }

    pub fn x2(&self) -> f32 {
        self.x2
    }

    pub fn y2(&self) -> f32 {
        self.y2
    }

    /// Box midpoint as `[x_center, y_center]`.
    pub fn center(&self) -> [f32; 2] {
        [(self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0]
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }
}

impl TryFrom<[f32; 4]> for BoundingBox {
    type Error = InvalidGeometry;

    fn try_from(corners: [f32; 4]) -> Result<Self, Self::Error> {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

// -------------------- Detections --------------------

/// One object instance reported by the external detection model.
///
/// Produced once per detected object per frame and discarded at the end of
/// the request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Class label as the model names it ("person", "car", ...).
    #[serde(rename = "class")]
    pub label: String,
    /// Model confidence in 0..=1.
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Coarse horizontal placement of a detection within the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        };
        f.write_str(word)
    }
}

/// Coarse distance band estimated from bounding-box area.
///
/// This is a heuristic proxy from 2-D box size, not metric distance. The
/// serialized form doubles as the spoken phrase the composer embeds in
/// advisories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    #[serde(rename = "very close")]
    VeryClose,
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "medium distance")]
    Medium,
    #[serde(rename = "far")]
    Far,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Distance::VeryClose => "very close",
            Distance::Close => "close",
            Distance::Medium => "medium distance",
            Distance::Far => "far",
        };
        f.write_str(phrase)
    }
}

/// A raw detection enriched with derived geometry.
///
/// `priority` is attached only by the importance filter, and only for
/// labels present in the priority table. Derived per request, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDetection {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Box midpoint as `[x_center, y_center]`.
    pub center: [f32; 2],
    pub position: Position,
    pub distance: Distance,
    pub bbox_area: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

// -------------------- Tests --------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_zero_dimensions() {
        assert!(Frame::new(0, 480).is_err());
        assert!(Frame::new(640, 0).is_err());
        let frame = Frame::new(640, 480).unwrap();
        assert_eq!(frame.area(), 640.0 * 480.0);
    }

    #[test]
    fn bounding_box_rejects_inverted_corners() {
        assert!(BoundingBox::new(10.0, 10.0, 10.0, 20.0).is_err());
        assert!(BoundingBox::new(10.0, 30.0, 20.0, 20.0).is_err());
        assert!(BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn bounding_box_center_and_area() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 60.0).unwrap();
        assert_eq!(bbox.center(), [20.0, 40.0]);
        assert_eq!(bbox.area(), 800.0);
    }

    #[test]
    fn bounding_box_wire_shape_is_an_array() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let parsed: BoundingBox = serde_json::from_str("[1.0,2.0,3.0,4.0]").unwrap();
        assert_eq!(parsed, bbox);

        // Malformed corners fail at the deserialization boundary.
        assert!(serde_json::from_str::<BoundingBox>("[3.0,2.0,1.0,4.0]").is_err());
    }

    #[test]
    fn raw_detection_uses_class_field_on_the_wire() {
        let det: RawDetection = serde_json::from_str(
            r#"{"class":"person","confidence":0.9,"bbox":[0.0,0.0,10.0,10.0]}"#,
        )
        .unwrap();
        assert_eq!(det.label, "person");

        let json = serde_json::to_value(&det).unwrap();
        assert!(json.get("class").is_some());
        assert!(json.get("label").is_none());
    }

    #[test]
    fn distance_phrases_match_the_spoken_form() {
        assert_eq!(Distance::VeryClose.to_string(), "very close");
        assert_eq!(Distance::Medium.to_string(), "medium distance");
        assert_eq!(
            serde_json::to_string(&Distance::Medium).unwrap(),
            r#""medium distance""#
        );
    }
}
