//! Keyword-driven intent matching for ad-hoc spoken queries.
//!
//! The matcher is deliberately a fixed-order substring scan, not a parser
//! or a scoring system: the first rule whose keywords appear in the
//! lower-cased query wins, which keeps answers reproducible when a query
//! mentions several keyword sets ("person" outranks "front").

use crate::advisory::{capitalize_first, compose};
use crate::priority::{filter_important, PriorityTable};
use crate::{EnrichedDetection, Position};

const NO_PEOPLE: &str = "No people detected nearby.";
const PATH_AHEAD_CLEAR: &str = "Path ahead is clear.";
const NO_OBSTACLES: &str = "No obstacles detected.";

/// Answer a spoken query over the full (unfiltered) detection set.
///
/// Rules, in priority order:
/// 1. "person"/"people" - people count plus where the first person is.
/// 2. "front"/"ahead" - the first center-positioned detection.
/// 3. "obstacle" - importance-filtered count plus the top-ranked item.
/// 4. default - the same ranked advisory as the non-query flow.
pub fn answer(table: &PriorityTable, detections: &[EnrichedDetection], query: &str) -> String {
    let query = query.to_lowercase();

    if query.contains("person") || query.contains("people") {
        let people: Vec<&EnrichedDetection> = detections
            .iter()
            .filter(|det| det.label == "person")
            .collect();
        return match people.first() {
            Some(first) => {
                let count = people.len();
                let noun = if count == 1 { "person" } else { "people" };
                format!(
                    "Yes, {} {} detected. {} on your {}.",
                    count,
                    noun,
                    capitalize_first(&first.distance.to_string()),
                    first.position
                )
            }
            None => NO_PEOPLE.to_string(),
        };
    }

    if query.contains("front") || query.contains("ahead") {
        return match detections
            .iter()
            .find(|det| det.position == Position::Center)
        {
            Some(det) => capitalize_first(&format!("{} {} ahead.", det.label, det.distance)),
            None => PATH_AHEAD_CLEAR.to_string(),
        };
    }

    if query.contains("obstacle") {
        let ranked = filter_important(table, detections);
        return match ranked.first() {
            Some(top) => {
                let count = ranked.len();
                let noun = if count == 1 { "obstacle" } else { "obstacles" };
                format!(
                    "{} {} detected. Main: {} on your {}.",
                    count, noun, top.label, top.position
                )
            }
            None => NO_OBSTACLES.to_string(),
        };
    }

    compose(&filter_important(table, detections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Distance};

    fn det(label: &str, position: Position, distance: Distance, bbox_area: f32) -> EnrichedDetection {
        EnrichedDetection {
            label: label.to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap(),
            center: [5.0, 5.0],
            position,
            distance,
            bbox_area,
            priority: None,
        }
    }

    fn table() -> PriorityTable {
        PriorityTable::navigation_defaults()
    }

    #[test]
    fn person_query_reports_count_and_placement() {
        let detections = vec![det("person", Position::Left, Distance::Medium, 100.0)];
        assert_eq!(
            answer(&table(), &detections, "Is there a person nearby?"),
            "Yes, 1 person detected. Medium distance on your left."
        );
    }

    #[test]
    fn person_query_pluralizes() {
        let detections = vec![
            det("person", Position::Center, Distance::Close, 100.0),
            det("person", Position::Right, Distance::Far, 50.0),
        ];
        assert_eq!(
            answer(&table(), &detections, "any people around?"),
            "Yes, 2 people detected. Close on your center."
        );
    }

    #[test]
    fn person_query_with_no_people() {
        let detections = vec![det("car", Position::Center, Distance::Close, 100.0)];
        assert_eq!(
            answer(&table(), &detections, "is anyone, any person there?"),
            NO_PEOPLE
        );
    }

    #[test]
    fn front_query_reports_first_center_detection() {
        let detections = vec![
            det("bench", Position::Left, Distance::Far, 10.0),
            det("car", Position::Center, Distance::Close, 100.0),
            det("dog", Position::Center, Distance::Far, 20.0),
        ];
        assert_eq!(answer(&table(), &detections, "what's in front?"), "Car close ahead.");
    }

    #[test]
    fn front_query_with_clear_center() {
        let detections = vec![det("car", Position::Left, Distance::Close, 100.0)];
        assert_eq!(
            answer(&table(), &detections, "What's in front?"),
            PATH_AHEAD_CLEAR
        );
    }

    #[test]
    fn obstacle_query_counts_ranked_detections() {
        let detections = vec![
            det("car", Position::Left, Distance::Close, 400.0),
            det("person", Position::Center, Distance::Medium, 100.0),
        ];
        assert_eq!(
            answer(&table(), &detections, "any obstacles?"),
            "2 obstacles detected. Main: person on your center."
        );
    }

    #[test]
    fn obstacle_query_singular() {
        let detections = vec![det("car", Position::Right, Distance::Close, 400.0)];
        assert_eq!(
            answer(&table(), &detections, "obstacle?"),
            "1 obstacle detected. Main: car on your right."
        );
    }

    #[test]
    fn obstacle_query_with_nothing_qualifying() {
        assert_eq!(answer(&table(), &[], "any obstacles?"), NO_OBSTACLES);
        // Detections exist, but none are in the priority table.
        let detections = vec![det("kite", Position::Center, Distance::Far, 10.0)];
        assert_eq!(answer(&table(), &detections, "any obstacles?"), NO_OBSTACLES);
    }

    #[test]
    fn rule_order_prefers_person_over_front() {
        let detections = vec![
            det("car", Position::Center, Distance::Close, 400.0),
            det("person", Position::Left, Distance::Far, 100.0),
        ];
        assert_eq!(
            answer(&table(), &detections, "is a person in front?"),
            "Yes, 1 person detected. Far on your left."
        );
    }

    #[test]
    fn default_rule_matches_the_ranked_advisory() {
        let detections = vec![det("person", Position::Center, Distance::Close, 100.0)];
        assert_eq!(
            answer(&table(), &detections, "describe the scene"),
            "Person close ahead."
        );
        assert_eq!(answer(&table(), &[], ""), "Path is clear.");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let detections = vec![det("person", Position::Left, Distance::Medium, 100.0)];
        assert_eq!(
            answer(&table(), &detections, "ANY PEOPLE?"),
            "Yes, 1 person detected. Medium distance on your left."
        );
    }
}
