//! Issue analysis pipeline
//!
//! report ─► classify ─► top label/score ─► severity ─► AnalyzedIssue
//!
//! Both passes pull fresh reports and classify from scratch; nothing is
//! cached between calls.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::classifier::{ClassifierError, EngineStatus, ZeroShotClassifier};
use crate::models::{
    confidence_percent, AnalyzedIssue, IssueReport, IssueStatus, StatsSnapshot,
    CANDIDATE_CATEGORIES, HIGH_SEVERITY_THRESHOLD,
};
use crate::severity::severity;
use crate::source::{ReportSource, SourceError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Category, top score and severity for one report.
struct Assessment {
    category: String,
    score: f64,
    severity: u8,
}

pub struct Analyzer {
    classifier: Arc<dyn ZeroShotClassifier>,
    source: Arc<dyn ReportSource>,
    next_id: AtomicU64,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>, source: Arc<dyn ReportSource>) -> Self {
        Self {
            classifier,
            source,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.classifier.status()
    }

    fn assess(&self, report: &IssueReport) -> Result<Assessment, AnalysisError> {
        let result = self.classifier.classify(&report.text, &CANDIDATE_CATEGORIES)?;
        if !result.is_normalized() {
            tracing::warn!(location = %report.location, "Classifier scores do not sum to one");
        }

        let (category, score) = result.top().ok_or_else(|| {
            ClassifierError::Inference("classifier returned no labels".to_string())
        })?;

        Ok(Assessment {
            category: category.to_string(),
            score,
            severity: severity(&report.text, category),
        })
    }

    /// Analyze every report, most severe first. Fails as a whole on the
    /// first error.
    pub fn analyze(&self) -> Result<Vec<AnalyzedIssue>, AnalysisError> {
        let reports = self.source.fetch_reports()?;
        let mut issues = Vec::with_capacity(reports.len());

        for report in reports {
            let assessment = self.assess(&report)?;
            issues.push(AnalyzedIssue {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                original_text: report.text,
                category: assessment.category,
                confidence: confidence_percent(assessment.score),
                severity: assessment.severity,
                location: report.location,
                timestamp: report.timestamp,
                status: IssueStatus::Pending,
            });
        }

        // Stable, so equal severities keep feed order
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));

        tracing::debug!(total = issues.len(), "Analysis complete");
        Ok(issues)
    }

    pub fn stats(&self) -> Result<StatsSnapshot, AnalysisError> {
        let reports = self.source.fetch_reports()?;

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut high_severity = 0;

        for report in &reports {
            let assessment = self.assess(report)?;
            *categories.entry(assessment.category).or_insert(0) += 1;
            if assessment.severity > HIGH_SEVERITY_THRESHOLD {
                high_severity += 1;
            }
        }

        let locations = reports
            .iter()
            .map(|r| r.location.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(StatsSnapshot {
            total_issues: reports.len(),
            high_severity,
            categories,
            locations,
            last_updated: Utc::now(),
        })
    }
}
