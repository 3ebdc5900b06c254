//! Report sources
//!
//! Where issue reports come from. [`MockFeed`] stands in for a social media
//! ingestion connector until one exists; [`JsonFileFeed`] replays an exported
//! batch from disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::IssueReport;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("report source unavailable: {0}")]
    Unavailable(String),
}

pub trait ReportSource: Send + Sync {
    fn fetch_reports(&self) -> Result<Vec<IssueReport>, SourceError>;
}

/// Fixed reports, mostly useful for fixtures.
impl ReportSource for Vec<IssueReport> {
    fn fetch_reports(&self) -> Result<Vec<IssueReport>, SourceError> {
        Ok(self.clone())
    }
}

/// Simulated Facebook posts from around Dhaka.
pub struct MockFeed;

const MOCK_POSTS: [(&str, &str, &str); 8] = [
    (
        "আমাদের এলাকায় ৩ দিন ধরে পানি নেই। কেউ কিছু করছে না। Water crisis in Mirpur",
        "Mirpur, Dhaka",
        "2025-11-04T10:30:00",
    ),
    (
        "Broken road near Dhanmondi 27. Accident happened yesterday. Very dangerous!",
        "Dhanmondi, Dhaka",
        "2025-11-04T11:15:00",
    ),
    (
        "বিদ্যুৎ নেই গত ৬ ঘন্টা। এই গরমে অসহ্য। Load shedding unbearable",
        "Uttara, Dhaka",
        "2025-11-04T14:20:00",
    ),
    (
        "Garbage not collected for 2 weeks. Smell is terrible. Health hazard!",
        "Gulshan, Dhaka",
        "2025-11-04T09:00:00",
    ),
    (
        "Gas pressure very low. Can't cook food. Help needed urgently",
        "Banani, Dhaka",
        "2025-11-04T12:45:00",
    ),
    (
        "FIRE in Chawkbazar area! Need immediate help! 🔥🔥",
        "Chawkbazar, Dhaka",
        "2025-11-04T16:30:00",
    ),
    (
        "Flood water entering homes in Demra. Emergency situation!",
        "Demra, Dhaka",
        "2025-11-04T15:00:00",
    ),
    (
        "Road accident near Science Lab. Need ambulance immediately!",
        "Science Lab, Dhaka",
        "2025-11-04T13:20:00",
    ),
];

impl ReportSource for MockFeed {
    fn fetch_reports(&self) -> Result<Vec<IssueReport>, SourceError> {
        Ok(MOCK_POSTS
            .iter()
            .map(|(text, location, timestamp)| IssueReport::new(*text, *location, *timestamp))
            .collect())
    }
}

/// Reads a JSON array of reports on every fetch, so edits show up without a
/// restart.
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSource for JsonFileFeed {
    fn fetch_reports(&self) -> Result<Vec<IssueReport>, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            SourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            SourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}
