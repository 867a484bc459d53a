//! Sanitizing parsers for raw user input.
//!
//! Every numeric field entered as text passes through here before it reaches
//! the engine, so NaN and infinities never show up in computed grades.

use crate::model::{Grade, Weight};

/// Replace non-finite values with 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parse a finite number, ignoring surrounding whitespace.
///
/// Returns `None` for blank or unparseable text.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Blank or unparseable text means the assignment is not graded yet.
pub fn parse_grade(raw: &str) -> Grade {
    parse_number(raw).map_or(Grade::Ungraded, Grade::Scored)
}

/// Blank text means extra credit; anything else is a non-negative weight,
/// with unparseable text counting as 0.
pub fn parse_weight(raw: &str) -> Weight {
    if raw.trim().is_empty() {
        return Weight::ExtraCredit;
    }
    Weight::Weighted(parse_number(raw).unwrap_or(0.0).max(0.0))
}

/// Max points and course totals: non-negative, 0 on parse failure.
pub fn parse_points(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0).max(0.0)
}

/// Target overall grade for a projection. Blank means "no target yet";
/// negative targets clamp to 0.
pub fn parse_target(raw: &str) -> Option<f64> {
    parse_number(raw).map(|t| t.max(0.0))
}
