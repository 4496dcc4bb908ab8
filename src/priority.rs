//! Navigation priority table and importance filter.
//!
//! The table encodes which object classes matter to a pedestrian and how
//! much, on a 1-10 weight scale. It is built once at startup and passed by
//! reference into filtering; nothing mutates it afterwards, so unlimited
//! concurrent readers are safe.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

use crate::EnrichedDetection;

/// Maximum number of ranked detections reported per frame.
pub const MAX_RANKED: usize = 5;

const MIN_WEIGHT: u8 = 1;
const MAX_WEIGHT: u8 = 10;

/// Default hazard weights for pedestrian navigation.
///
/// "stairs" is not part of the standard COCO vocabulary; the entry only
/// fires with a custom-trained backend that emits the label.
const NAVIGATION_WEIGHTS: &[(&str, u8)] = &[
    ("person", 10),
    ("stairs", 10),
    ("car", 9),
    ("truck", 9),
    ("bus", 9),
    ("bicycle", 8),
    ("motorcycle", 8),
    ("traffic light", 8),
    ("stop sign", 8),
    ("chair", 7),
    ("bench", 7),
    ("couch", 7),
    ("dog", 7),
    ("door", 6),
    ("cat", 6),
    ("table", 5),
];

/// Immutable mapping from class label to navigation priority weight.
pub struct PriorityTable {
    weights: HashMap<String, u8>,
}

impl PriorityTable {
    /// The built-in table of navigation hazards.
    pub fn navigation_defaults() -> Self {
        Self {
            weights: NAVIGATION_WEIGHTS
                .iter()
                .map(|(label, weight)| (label.to_string(), *weight))
                .collect(),
        }
    }

    /// Build a table from caller-supplied entries, validating the 1-10
    /// weight range.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, u8)>) -> Result<Self> {
        let mut weights = HashMap::new();
        for (label, weight) in entries {
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
                return Err(anyhow!(
                    "priority weight for '{}' must be in {}..={}, got {}",
                    label,
                    MIN_WEIGHT,
                    MAX_WEIGHT,
                    weight
                ));
            }
            weights.insert(label, weight);
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, label: &str) -> Option<u8> {
        self.weights.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.weights.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::navigation_defaults()
    }
}

/// Select and rank the detections that matter for navigation.
///
/// Labels absent from the table are dropped from the ranked list (they stay
/// visible to the query matcher's raw scan). Ranking is priority weight
/// descending, then box area descending; the sort is stable, so detections
/// with identical keys keep their input order. At most [`MAX_RANKED`]
/// entries are returned. Inputs are copied before the weight is attached,
/// so the caller's list is never mutated.
pub fn filter_important(
    table: &PriorityTable,
    detections: &[EnrichedDetection],
) -> Vec<EnrichedDetection> {
    let mut important: Vec<EnrichedDetection> = detections
        .iter()
        .filter_map(|det| {
            table.weight(&det.label).map(|weight| {
                let mut ranked = det.clone();
                ranked.priority = Some(weight);
                ranked
            })
        })
        .collect();

    important.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.bbox_area.total_cmp(&a.bbox_area))
    });
    important.truncate(MAX_RANKED);
    important
}
