//! Voice-message composition for ranked detections.

use crate::{EnrichedDetection, Position};

/// The designed empty-state advisory. Not an error.
pub const PATH_CLEAR: &str = "Path is clear.";

/// Compose a single spoken sentence from a ranked detection list.
///
/// Detections are grouped by position; for each non-empty group, in
/// center/left/right order, only the highest-ranked detection is spoken.
/// Clauses are joined with `". "`, the lead character is capitalized, and
/// a final period is appended. An empty list yields [`PATH_CLEAR`].
pub fn compose(ranked: &[EnrichedDetection]) -> String {
    if ranked.is_empty() {
        return PATH_CLEAR.to_string();
    }

    let mut clauses = Vec::new();
    for position in [Position::Center, Position::Left, Position::Right] {
        let Some(det) = ranked.iter().find(|det| det.position == position) else {
            continue;
        };
        let clause = match position {
            Position::Center => format!("{} {} ahead", det.label, det.distance),
            Position::Left => format!("{} {} on your left", det.label, det.distance),
            Position::Right => format!("{} {} on your right", det.label, det.distance),
        };
        clauses.push(clause);
    }

    if clauses.is_empty() {
        // Unreachable for non-empty input since every detection carries a
        // position, but the clear-path fallback keeps the contract total.
        return PATH_CLEAR.to_string();
    }

    let mut message = capitalize_first(&clauses.join(". "));
    message.push('.');
    message
}

/// Uppercase only the first character; the rest of the text, class names
/// included, passes through verbatim.
pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
