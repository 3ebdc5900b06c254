//! Severity scoring
//!
//! Keyword heuristics layered on top of the classifier's category. The
//! classifier never influences the score except through the category label.

use crate::models::is_high_priority;

const BASE_SEVERITY: u32 = 50;
const MAX_SEVERITY: u32 = 100;

const EMERGENCY_KEYWORDS: [&str; 8] = [
    "emergency",
    "urgent",
    "immediately",
    "help",
    "fire",
    "flood",
    "accident",
    "crisis",
];

/// Duration words; the last two are Bengali for "days" and "weeks".
const DURATION_KEYWORDS: [&str; 5] = ["days", "weeks", "hours", "দিন", "সপ্তাহ"];

const EMERGENCY_BOOST: u32 = 30;
const DURATION_BOOST: u32 = 15;
const CATEGORY_BOOST: u32 = 25;
const EXCLAMATION_WEIGHT: u32 = 3;
const EXCLAMATION_CAP: u32 = 10;

/// Score a report 0-100 from its text and assigned category.
pub fn severity(text: &str, category: &str) -> u8 {
    let lowered = text.to_lowercase();
    let mut score = BASE_SEVERITY;

    if contains_any(&lowered, &EMERGENCY_KEYWORDS) {
        score += EMERGENCY_BOOST;
    }

    if contains_any(&lowered, &DURATION_KEYWORDS) {
        score += DURATION_BOOST;
    }

    if is_high_priority(category) {
        score += CATEGORY_BOOST;
    }

    // Counted on the original text
    let bangs = text.matches('!').count() as u32;
    score += bangs.saturating_mul(EXCLAMATION_WEIGHT).min(EXCLAMATION_CAP);

    score.min(MAX_SEVERITY) as u8
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
