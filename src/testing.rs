//! Test doubles for the classifier and report source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::classifier::{
    Classification, ClassifierError, ClassifierResult, EngineStatus, LazyModel, ZeroShotClassifier,
};
use crate::models::IssueReport;

/// Picks the first label whose keyword shows up in the text.
pub struct KeywordClassifier;

const KEYWORDS: [(&str, &str); 9] = [
    ("fire", "fire emergency"),
    ("flood", "flood"),
    ("ambulance", "medical emergency"),
    ("water", "water supply"),
    ("road", "road damage"),
    ("garbage", "garbage collection"),
    ("gas", "gas supply"),
    ("load shedding", "electricity outage"),
    ("theft", "crime/safety"),
];

impl ZeroShotClassifier for KeywordClassifier {
    fn classify(&self, text: &str, labels: &[&str]) -> ClassifierResult<Classification> {
        let lowered = text.to_lowercase();
        let winner = KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, label)| *label);

        let rest = 0.4 / (labels.len().max(2) - 1) as f64;
        let scores = labels
            .iter()
            .map(|label| if Some(*label) == winner { 0.6 } else { rest })
            .collect();
        Classification::ranked(labels, scores)
    }
}

/// Returns the same ranking for every text.
pub struct FixedClassifier(pub Classification);

impl ZeroShotClassifier for FixedClassifier {
    fn classify(&self, _text: &str, _labels: &[&str]) -> ClassifierResult<Classification> {
        Ok(self.0.clone())
    }
}

/// Classifier whose model load fails while `broken` is set.
pub struct FlakyClassifier {
    pub broken: Arc<AtomicBool>,
    model: LazyModel<KeywordClassifier>,
}

impl FlakyClassifier {
    pub fn new() -> Self {
        let broken = Arc::new(AtomicBool::new(true));
        let flag = broken.clone();
        let model = LazyModel::new(move || {
            if flag.load(Ordering::SeqCst) {
                Err(ClassifierError::ModelLoad("weights unavailable".to_string()))
            } else {
                Ok(KeywordClassifier)
            }
        });
        Self { broken, model }
    }
}

impl ZeroShotClassifier for FlakyClassifier {
    fn classify(&self, text: &str, labels: &[&str]) -> ClassifierResult<Classification> {
        self.model.with(|inner| inner.classify(text, labels))
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            engine: "flaky".to_string(),
            model_loaded: self.model.is_loaded(),
            load_attempts: self.model.load_attempts(),
            load_failures: self.model.load_failures(),
            ..EngineStatus::default()
        }
    }
}

/// Classifies normally until call number `fail_from`, then every call
/// fails with an inference error.
pub struct FailingClassifier {
    fail_from: usize,
    calls: AtomicUsize,
}

impl FailingClassifier {
    pub fn from_call(fail_from: usize) -> Self {
        Self {
            fail_from,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ZeroShotClassifier for FailingClassifier {
    fn classify(&self, text: &str, labels: &[&str]) -> ClassifierResult<Classification> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_from {
            return Err(ClassifierError::Inference("output tensor has wrong shape".to_string()));
        }
        KeywordClassifier.classify(text, labels)
    }
}

pub fn report(text: &str, location: &str) -> IssueReport {
    IssueReport::new(text, location, "2025-11-04T10:00:00")
}
