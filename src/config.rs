//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Zero-shot model identifier, e.g. `facebook/bart-large-mnli`
    pub model_name: String,

    /// Directory holding exported models, one sub-directory per model name
    pub model_dir: PathBuf,

    /// Token limit for a premise/hypothesis pair
    pub max_length: usize,

    /// JSON export to analyze instead of the built-in mock feed
    pub reports_file: Option<PathBuf>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_name: lookup("MODEL_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "facebook/bart-large-mnli".to_string()),

            model_dir: lookup("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("models")),

            max_length: lookup("MODEL_MAX_LENGTH")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(512),

            reports_file: lookup("REPORTS_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
