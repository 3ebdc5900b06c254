//! Analyzed issue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Pending,
}

/// A report annotated with its category and severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedIssue {
    pub id: u64,
    pub original_text: String,
    pub category: String,
    /// Top classifier score as a percentage, two decimals
    pub confidence: f64,
    pub severity: u8,
    pub location: String,
    pub timestamp: String,
    pub status: IssueStatus,
}

/// Successful `/api/analyze` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub success: bool,
    pub total_issues: usize,
    pub issues: Vec<AnalyzedIssue>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisEnvelope {
    pub fn new(issues: Vec<AnalyzedIssue>) -> Self {
        Self {
            success: true,
            total_issues: issues.len(),
            issues,
            timestamp: Utc::now(),
        }
    }
}

/// Convert a 0-1 score to a percentage rounded to two decimals.
pub fn confidence_percent(score: f64) -> f64 {
    (score * 100.0 * 100.0).round() / 100.0
}
