//! Advisor entry points: the detection-to-advisory pipeline.

use serde::{Deserialize, Serialize};

use crate::advisory::compose;
use crate::geometry::{classify_distance, classify_position};
use crate::priority::{filter_important, PriorityTable};
use crate::query;
use crate::{EnrichedDetection, Frame, RawDetection};

/// Result of the default flow: the spoken advisory plus the ranked
/// detections it was derived from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameAdvisory {
    pub advisory: String,
    pub ranked: Vec<EnrichedDetection>,
}

/// Result of the query flow: the answer plus the enriched detection set
/// the matcher scanned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryAdvisory {
    pub advisory: String,
    pub detections: Vec<EnrichedDetection>,
}

/// Stateless advisory pipeline over single frames.
///
/// Owns the injected [`PriorityTable`]; everything else is computed per
/// call. Geometry preconditions are discharged when the caller constructs
/// [`Frame`] and [`BoundingBox`](crate::BoundingBox) values, so the
/// processing methods themselves cannot fail.
pub struct Advisor {
    priorities: PriorityTable,
}

impl Advisor {
    pub fn new(priorities: PriorityTable) -> Self {
        Self { priorities }
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Attach derived geometry (center, area, position, distance) to each
    /// raw detection. Priority is left unset; the importance filter
    /// attaches it for qualifying labels.
    pub fn enrich(&self, detections: &[RawDetection], frame: Frame) -> Vec<EnrichedDetection> {
        detections
            .iter()
            .map(|det| {
                let center = det.bbox.center();
                let bbox_area = det.bbox.area();
                EnrichedDetection {
                    label: det.label.clone(),
                    confidence: det.confidence,
                    bbox: det.bbox,
                    center,
                    position: classify_position(center[0], frame.width()),
                    distance: classify_distance(bbox_area, frame.area()),
                    bbox_area,
                    priority: None,
                }
            })
            .collect()
    }

    /// Default flow: enrich, rank, and speak the frame.
    pub fn process_frame(&self, detections: &[RawDetection], frame: Frame) -> FrameAdvisory {
        let enriched = self.enrich(detections, frame);
        let ranked = filter_important(&self.priorities, &enriched);
        let advisory = compose(&ranked);
        FrameAdvisory { advisory, ranked }
    }

    /// Query flow: enrich the full set and answer the spoken query.
    pub fn process_query(
        &self,
        detections: &[RawDetection],
        frame: Frame,
        query_text: &str,
    ) -> QueryAdvisory {
        let enriched = self.enrich(detections, frame);
        let advisory = query::answer(&self.priorities, &enriched, query_text);
        QueryAdvisory {
            advisory,
            detections: enriched,
        }
    }
}

impl Default for Advisor {
    fn default() -> Self {
        Self::new(PriorityTable::navigation_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Distance, Position};

    fn raw(label: &str, bbox: BoundingBox) -> RawDetection {
        RawDetection {
            label: label.to_string(),
            confidence: 0.9,
            bbox,
        }
    }

    #[test]
    fn enrich_derives_geometry() {
        let advisor = Advisor::default();
        let frame = Frame::new(640, 480).unwrap();
        // 200x150 box centered at (100, 75): left third, ~9.8% of the frame.
        let detections = vec![raw("person", BoundingBox::new(0.0, 0.0, 200.0, 150.0).unwrap())];

        let enriched = advisor.enrich(&detections, frame);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].center, [100.0, 75.0]);
        assert_eq!(enriched[0].bbox_area, 30_000.0);
        assert_eq!(enriched[0].position, Position::Left);
        assert_eq!(enriched[0].distance, Distance::Medium);
        assert_eq!(enriched[0].priority, None);
    }

    #[test]
    fn process_frame_ranks_and_speaks() {
        let advisor = Advisor::default();
        let frame = Frame::new(600, 400).unwrap();
        let detections = vec![
            // Unknown label: enriched, never ranked.
            raw("kite", BoundingBox::new(250.0, 0.0, 350.0, 50.0).unwrap()),
            // Center, 300x200 = 25% of the frame: close.
            raw("person", BoundingBox::new(150.0, 100.0, 450.0, 300.0).unwrap()),
            // Right edge, small: far.
            raw("car", BoundingBox::new(550.0, 0.0, 600.0, 40.0).unwrap()),
        ];

        let result = advisor.process_frame(&detections, frame);
        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.ranked[0].label, "person");
        assert_eq!(result.ranked[0].priority, Some(10));
        assert_eq!(
            result.advisory,
            "Person close ahead. Car far on your right."
        );
    }

    #[test]
    fn empty_frame_is_a_clear_path() {
        let advisor = Advisor::default();
        let frame = Frame::new(640, 480).unwrap();
        let result = advisor.process_frame(&[], frame);
        assert_eq!(result.advisory, "Path is clear.");
        assert!(result.ranked.is_empty());
    }

    #[test]
    fn process_query_scans_the_unfiltered_set() {
        let advisor = Advisor::default();
        let frame = Frame::new(640, 480).unwrap();
        // "kite" is not in the priority table but must still be visible
        // to the front-rule scan.
        let detections = vec![raw("kite", BoundingBox::new(300.0, 200.0, 340.0, 240.0).unwrap())];

        let result = advisor.process_query(&detections, frame, "what's ahead?");
        assert_eq!(result.advisory, "Kite far ahead.");
        assert_eq!(result.detections.len(), 1);
    }

    #[test]
    fn processing_is_deterministic() {
        let advisor = Advisor::default();
        let frame = Frame::new(640, 480).unwrap();
        let detections = vec![
            raw("person", BoundingBox::new(10.0, 10.0, 200.0, 400.0).unwrap()),
            raw("car", BoundingBox::new(400.0, 100.0, 640.0, 300.0).unwrap()),
        ];

        let first = advisor.process_frame(&detections, frame);
        let second = advisor.process_frame(&detections, frame);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
