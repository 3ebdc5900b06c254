//! Zero-Shot Classifier Module
//!
//! The pipeline only talks to [`ZeroShotClassifier`]. Production wires in the
//! ONNX-backed [`NliClassifier`]; tests hand in fakes.
//!
//! ```text
//! text ──► premise/hypothesis pairs ──► NLI model ──► entailment logits
//!                                                          │
//!                          ranked labels + scores ◄── softmax
//! ```

pub mod lazy;
pub mod nli;

pub use lazy::LazyModel;
pub use nli::NliClassifier;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scores are expected to sum to one within this tolerance.
pub const SCORE_SUM_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Anything that can rank a fixed label set against a piece of text.
pub trait ZeroShotClassifier: Send + Sync {
    fn classify(&self, text: &str, labels: &[&str]) -> ClassifierResult<Classification>;

    /// Runtime counters for the status endpoint.
    fn status(&self) -> EngineStatus {
        EngineStatus::default()
    }
}

/// Labels ranked best-first with parallel scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl Classification {
    /// Rank per-label scores, highest first. Equal scores keep the input
    /// label order.
    pub fn ranked(labels: &[&str], scores: Vec<f64>) -> ClassifierResult<Self> {
        if labels.len() != scores.len() {
            return Err(ClassifierError::Inference(format!(
                "got {} scores for {} labels",
                scores.len(),
                labels.len()
            )));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(ClassifierError::Inference(format!(
                "non-finite score: {}",
                bad
            )));
        }

        let mut pairs: Vec<(&str, f64)> = labels.iter().copied().zip(scores).collect();
        // sort_by is stable
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));

        let (labels, scores) = pairs
            .into_iter()
            .map(|(label, score)| (label.to_string(), score))
            .unzip();

        Ok(Self { labels, scores })
    }

    /// Best label and its score.
    pub fn top(&self) -> Option<(&str, f64)> {
        self.labels
            .first()
            .zip(self.scores.first())
            .map(|(label, score)| (label.as_str(), *score))
    }

    pub fn is_normalized(&self) -> bool {
        let sum: f64 = self.scores.iter().sum();
        (sum - 1.0).abs() <= SCORE_SUM_TOLERANCE
    }
}

/// Reject candidate sets the classifier cannot rank.
pub fn validate_labels(labels: &[&str]) -> ClassifierResult<()> {
    if labels.is_empty() {
        return Err(ClassifierError::InvalidInput(
            "candidate label set is empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for label in labels {
        if label.trim().is_empty() {
            return Err(ClassifierError::InvalidInput(
                "candidate label is blank".to_string(),
            ));
        }
        if !seen.insert(*label) {
            return Err(ClassifierError::InvalidInput(format!(
                "duplicate candidate label: {}",
                label
            )));
        }
    }
    Ok(())
}

/// Engine status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine: String,
    pub model_name: String,
    pub model_loaded: bool,
    pub load_attempts: u64,
    pub load_failures: u64,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self {
            engine: "unknown".to_string(),
            model_name: "None".to_string(),
            model_loaded: false,
            load_attempts: 0,
            load_failures: 0,
            inference_count: 0,
            avg_latency_ms: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CANDIDATE_CATEGORIES;

    #[test]
    fn test_ranked_orders_by_score() {
        let result = Classification::ranked(&["a", "b", "c"], vec![0.2, 0.5, 0.3]).unwrap();
        assert_eq!(result.labels, vec!["b", "c", "a"]);
        assert_eq!(result.scores, vec![0.5, 0.3, 0.2]);
        assert_eq!(result.top(), Some(("b", 0.5)));
        assert!(result.is_normalized());
    }

    #[test]
    fn test_ranked_ties_keep_label_order() {
        let result =
            Classification::ranked(&["first", "second", "third"], vec![0.25, 0.5, 0.25]).unwrap();
        assert_eq!(result.labels, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_ranked_rejects_length_mismatch() {
        let err = Classification::ranked(&["a", "b"], vec![1.0]).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn test_ranked_rejects_nan() {
        let err = Classification::ranked(&["a", "b"], vec![f64::NAN, 1.0]).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_top_of_empty() {
        let result = Classification::ranked(&[], vec![]).unwrap();
        assert_eq!(result.top(), None);
    }

    #[test]
    fn test_validate_labels() {
        assert!(validate_labels(&CANDIDATE_CATEGORIES).is_ok());
        assert!(validate_labels(&[]).is_err());
        assert!(validate_labels(&["flood", " "]).is_err());
        assert!(validate_labels(&["flood", "flood"]).is_err());
    }
}
