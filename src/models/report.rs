//! Issue report model

use serde::{Deserialize, Serialize};

/// One post pulled from the ingestion feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    pub text: String,
    pub location: String,
    /// ISO-8601, passed through untouched
    pub timestamp: String,
}

impl IssueReport {
    pub fn new(
        text: impl Into<String>,
        location: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            location: location.into(),
            timestamp: timestamp.into(),
        }
    }
}
