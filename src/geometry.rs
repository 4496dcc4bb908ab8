//! Position and distance classification for bounding boxes.
//!
//! Both classifiers are pure functions of (box, frame) with no hidden
//! state: identical inputs always yield identical bands. Callers guarantee
//! a positive frame area by constructing a [`Frame`](crate::Frame).

use crate::{Distance, Position};

/// Fraction of the frame width left of which a detection is "left".
const LEFT_BAND: f32 = 0.33;
/// Fraction of the frame width right of which a detection is "right".
const RIGHT_BAND: f32 = 0.67;

/// Area ratio above which an object is treated as very close.
const VERY_CLOSE_RATIO: f32 = 0.30;
const CLOSE_RATIO: f32 = 0.15;
const MEDIUM_RATIO: f32 = 0.05;

/// Classify the horizontal placement of a box center within the frame.
///
/// Centers exactly on a band threshold fall to `Center`.
pub fn classify_position(x_center: f32, frame_width: u32) -> Position {
    let width = frame_width as f32;
    if x_center < width * LEFT_BAND {
        Position::Left
    } else if x_center > width * RIGHT_BAND {
        Position::Right
    } else {
        Position::Center
    }
}

/// Estimate a coarse distance band from the box-to-frame area ratio.
///
/// Band boundaries are exclusive on the lower side: a ratio of exactly
/// 0.30 is `Close`, 0.15 is `Medium`, 0.05 is `Far`.
pub fn classify_distance(bbox_area: f32, frame_area: f32) -> Distance {
    let ratio = bbox_area / frame_area;
    if ratio > VERY_CLOSE_RATIO {
        Distance::VeryClose
    } else if ratio > CLOSE_RATIO {
        Distance::Close
    } else if ratio > MEDIUM_RATIO {
        Distance::Medium
    } else {
        Distance::Far
    }
}
