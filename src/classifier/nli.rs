//! NLI Classifier - ONNX Runtime Integration
//!
//! Zero-shot classification with an entailment model exported to ONNX.
//! Every candidate label becomes a hypothesis ("This example is flood.")
//! paired with the report text as premise. The entailment logits of all
//! pairs are softmaxed against each other, so scores sum to one.
//!
//! Expected layout:
//!
//! ```text
//! <MODEL_DIR>/<MODEL_NAME>/
//!   model.onnx       exported sequence-classification graph
//!   tokenizer.json   HuggingFace fast tokenizer
//!   config.json      optional, read for label2id
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams, TruncationStrategy};

use super::{
    validate_labels, Classification, ClassifierError, ClassifierResult, EngineStatus, LazyModel,
    ZeroShotClassifier,
};
use crate::config::Config;

pub const HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

const PAD_TOKENS: [&str; 2] = ["<pad>", "[PAD]"];

// ============================================================================
// MODEL FILES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub config: PathBuf,
}

impl ModelFiles {
    pub fn resolve(model_dir: &Path, model_name: &str) -> Self {
        let root = model_dir.join(model_name);
        Self {
            model: root.join("model.onnx"),
            tokenizer: root.join("tokenizer.json"),
            config: root.join("config.json"),
        }
    }
}

pub fn hypothesis(label: &str) -> String {
    HYPOTHESIS_TEMPLATE.replace("{}", label)
}

/// Find the entailment class in a HuggingFace `config.json`.
pub fn entailment_index(config: &serde_json::Value) -> Option<usize> {
    config
        .get("label2id")?
        .as_object()?
        .iter()
        .find(|(label, _)| label.to_lowercase().starts_with("entail"))
        .and_then(|(_, id)| id.as_u64())
        .map(|id| id as usize)
}

/// Column holding the entailment logit. Without a named entailment class
/// the last column is used, as HuggingFace's zero-shot pipeline does.
pub fn resolve_entailment_index(found: Option<usize>, classes: usize) -> Option<usize> {
    match found {
        Some(index) if index < classes => Some(index),
        Some(_) => None,
        None => classes.checked_sub(1),
    }
}

fn read_entailment_index(path: &Path) -> ClassifierResult<Option<usize>> {
    if !path.exists() {
        tracing::debug!(config = %path.display(), "No model config, using the last logit column");
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ClassifierError::ModelLoad(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| ClassifierError::ModelLoad(format!("Invalid {}: {}", path.display(), e)))?;

    Ok(entailment_index(&config))
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ============================================================================
// LOADED MODEL
// ============================================================================

struct NliModel {
    session: Session,
    tokenizer: Tokenizer,
    entailment_index: Option<usize>,
    logits_output: String,
    uses_token_type_ids: bool,
}

impl NliModel {
    fn load(files: &ModelFiles, max_length: usize) -> ClassifierResult<Self> {
        for path in [&files.model, &files.tokenizer] {
            if !path.exists() {
                return Err(ClassifierError::ModelLoad(format!(
                    "Model file not found: {}",
                    path.display()
                )));
            }
        }

        tracing::info!(model = %files.model.display(), "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(&files.model)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to load model: {}", e)))?;

        let logits_output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoad("No output defined".to_string()))?;
        let uses_token_type_ids = session.inputs.iter().any(|i| i.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to load tokenizer: {}", e)))?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to set truncation: {}", e)))?;

        if tokenizer.get_padding().is_none() {
            let (pad_token, pad_id) = PAD_TOKENS
                .iter()
                .find_map(|t| tokenizer.token_to_id(t).map(|id| (t.to_string(), id)))
                .unwrap_or_else(|| (PAD_TOKENS[0].to_string(), 1));
            tokenizer.with_padding(Some(PaddingParams {
                pad_id,
                pad_token,
                ..Default::default()
            }));
        }

        let entailment_index = read_entailment_index(&files.config)?;

        tracing::info!(
            entailment_index = ?entailment_index,
            uses_token_type_ids,
            "ONNX model loaded successfully"
        );

        Ok(Self {
            session,
            tokenizer,
            entailment_index,
            logits_output,
            uses_token_type_ids,
        })
    }

    /// One entailment logit per label, in label order.
    fn entailment_logits(&mut self, premise: &str, labels: &[&str]) -> ClassifierResult<Vec<f32>> {
        let hypotheses: Vec<String> = labels.iter().map(|l| hypothesis(l)).collect();
        let pairs: Vec<(&str, &str)> = hypotheses.iter().map(|h| (premise, h.as_str())).collect();

        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| ClassifierError::Inference(format!("Tokenization failed: {}", e)))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);
        if batch == 0 || seq_len == 0 {
            return Err(ClassifierError::Inference("Empty encoding".to_string()));
        }

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend(encoding.get_ids().iter().map(|&v| v as i64));
            mask.extend(encoding.get_attention_mask().iter().map(|&v| v as i64));
            type_ids.extend(encoding.get_type_ids().iter().map(|&v| v as i64));
        }

        let to_tensor = |data: Vec<i64>| -> ClassifierResult<Tensor<i64>> {
            let array = Array2::from_shape_vec((batch, seq_len), data)
                .map_err(|e| ClassifierError::Inference(format!("Array error: {}", e)))?;
            Tensor::from_array(array)
                .map_err(|e| ClassifierError::Inference(format!("Tensor error: {}", e)))
        };

        let input_ids = to_tensor(ids)?;
        let attention_mask = to_tensor(mask)?;

        let outputs = if self.uses_token_type_ids {
            let token_type_ids = to_tensor(type_ids)?;
            self.session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])
        } else {
            self.session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
        }
        .map_err(|e| ClassifierError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.logits_output)
            .ok_or_else(|| ClassifierError::Inference("No output".to_string()))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Extract error: {}", e)))?;

        if data.len() % batch != 0 {
            return Err(ClassifierError::Inference(format!(
                "Logits of length {} do not split into {} rows",
                data.len(),
                batch
            )));
        }
        let classes = data.len() / batch;
        let index = resolve_entailment_index(self.entailment_index, classes).ok_or_else(|| {
            ClassifierError::Inference(format!(
                "Entailment index {:?} out of range for {} classes",
                self.entailment_index, classes
            ))
        })?;

        Ok(data.chunks(classes).map(|row| row[index]).collect())
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Shared zero-shot classifier, loaded on first use.
pub struct NliClassifier {
    model_name: String,
    model: LazyModel<NliModel>,
    inference_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl NliClassifier {
    pub fn new(config: &Config) -> Self {
        let files = ModelFiles::resolve(&config.model_dir, &config.model_name);
        let max_length = config.max_length;

        Self {
            model_name: config.model_name.clone(),
            model: LazyModel::new(move || NliModel::load(&files, max_length)),
            inference_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }
}

impl ZeroShotClassifier for NliClassifier {
    fn classify(&self, text: &str, labels: &[&str]) -> ClassifierResult<Classification> {
        validate_labels(labels)?;

        let start_time = Instant::now();
        let logits = self
            .model
            .with(|model| model.entailment_logits(text, labels))?;

        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        Classification::ranked(labels, softmax(&logits))
    }

    fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            engine: "onnx".to_string(),
            model_name: self.model_name.clone(),
            model_loaded: self.model.is_loaded(),
            load_attempts: self.model.load_attempts(),
            load_failures: self.model.load_failures(),
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CANDIDATE_CATEGORIES;
    use serde_json::json;

    fn config_for(dir: &Path) -> Config {
        Config {
            port: 0,
            model_name: "facebook/bart-large-mnli".to_string(),
            model_dir: dir.to_path_buf(),
            max_length: 128,
            reports_file: None,
            environment: "test".to_string(),
        }
    }

    #[test]
    fn test_resolve_model_files() {
        let files = ModelFiles::resolve(Path::new("models"), "facebook/bart-large-mnli");
        assert_eq!(files.model, PathBuf::from("models/facebook/bart-large-mnli/model.onnx"));
        assert_eq!(
            files.tokenizer,
            PathBuf::from("models/facebook/bart-large-mnli/tokenizer.json")
        );
        assert_eq!(files.config, PathBuf::from("models/facebook/bart-large-mnli/config.json"));
    }

    #[test]
    fn test_hypothesis_template() {
        assert_eq!(hypothesis("crime/safety"), "This example is crime/safety.");
    }

    #[test]
    fn test_entailment_index_from_label2id() {
        let config = json!({
            "label2id": { "contradiction": 0, "neutral": 1, "entailment": 2 }
        });
        assert_eq!(entailment_index(&config), Some(2));

        let config = json!({
            "label2id": { "ENTAILMENT": 0, "NEUTRAL": 1, "CONTRADICTION": 2 }
        });
        assert_eq!(entailment_index(&config), Some(0));

        assert_eq!(entailment_index(&json!({ "label2id": { "LABEL_0": 0 } })), None);
        assert_eq!(entailment_index(&json!({})), None);
    }

    #[test]
    fn test_read_entailment_index_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let index = read_entailment_index(&dir.path().join("config.json")).unwrap();
        assert_eq!(index, None);
        assert_eq!(resolve_entailment_index(index, 3), Some(2));
    }

    #[test]
    fn test_two_class_head_without_entailment_label_uses_last_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"label2id": {"LABEL_0": 0, "LABEL_1": 1}}"#).unwrap();

        let found = read_entailment_index(&path).unwrap();
        assert_eq!(found, None);
        assert_eq!(resolve_entailment_index(found, 2), Some(1));
    }

    #[test]
    fn test_resolve_entailment_index() {
        let mnli = json!({ "label2id": { "contradiction": 0, "neutral": 1, "entailment": 2 } });
        assert_eq!(resolve_entailment_index(entailment_index(&mnli), 3), Some(2));
        assert_eq!(resolve_entailment_index(Some(0), 2), Some(0));
        assert_eq!(resolve_entailment_index(Some(2), 2), None);
        assert_eq!(resolve_entailment_index(None, 0), None);
    }

    #[test]
    fn test_read_entailment_index_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"label2id": {"entailment": 0, "not_entailment": 1}}"#).unwrap();
        assert_eq!(read_entailment_index(&path).unwrap(), Some(0));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_entailment_index(&path),
            Err(ClassifierError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_softmax() {
        let scores = softmax(&[1.0, 1.0]);
        assert!((scores[0] - 0.5).abs() < 1e-9);
        assert!((scores[1] - 0.5).abs() < 1e-9);

        let scores = softmax(&[1000.0, 0.0, -1000.0]);
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(scores[0] > 0.999);

        let scores = softmax(&[0.5, 2.0, -1.0, 0.0]);
        assert!(scores[1] > scores[0] && scores[0] > scores[3] && scores[3] > scores[2]);
    }

    #[test]
    fn test_missing_model_fails_and_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = NliClassifier::new(&config_for(dir.path()));

        let err = classifier.classify("Flood water entering homes", &CANDIDATE_CATEGORIES).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
        assert!(err.to_string().contains("model.onnx"));

        assert!(classifier.classify("second try", &CANDIDATE_CATEGORIES).is_err());

        let status = classifier.status();
        assert_eq!(status.engine, "onnx");
        assert_eq!(status.model_name, "facebook/bart-large-mnli");
        assert!(!status.model_loaded);
        assert_eq!(status.load_attempts, 2);
        assert_eq!(status.load_failures, 2);
        assert_eq!(status.inference_count, 0);
    }

    #[test]
    fn test_empty_labels_rejected_before_load() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = NliClassifier::new(&config_for(dir.path()));

        let err = classifier.classify("anything", &[]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput(_)));
        assert_eq!(classifier.status().load_attempts, 0);
    }
}
