//! Dashboard statistics model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Issues above this severity count as high severity.
pub const HIGH_SEVERITY_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_issues: usize,
    pub high_severity: usize,
    pub categories: BTreeMap<String, usize>,
    pub locations: usize,
    pub last_updated: DateTime<Utc>,
}
