//! Civic issue categories

/// Candidate labels handed to the zero-shot classifier, in tie-break order.
pub const CANDIDATE_CATEGORIES: [&str; 9] = [
    "water supply",
    "electricity outage",
    "road damage",
    "garbage collection",
    "gas supply",
    "flood",
    "fire emergency",
    "medical emergency",
    "crime/safety",
];

/// Categories that add a fixed bump to severity.
pub const HIGH_PRIORITY_CATEGORIES: [&str; 4] = [
    "fire emergency",
    "medical emergency",
    "flood",
    "crime/safety",
];

pub fn is_high_priority(category: &str) -> bool {
    HIGH_PRIORITY_CATEGORIES.contains(&category)
}
