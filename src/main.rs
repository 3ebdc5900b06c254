//! CivicPulse AI Backend Server
//!
//! Classifies civic complaints pulled from social media and ranks them by
//! severity.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CIVICPULSE AI                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────┐  ┌───────────────────┐ │
//! │  │  API      │  │  Analyzer       │  │  Report Source    │ │
//! │  │  (Axum)   │─►│  classify +     │◄─│  (mock feed)      │ │
//! │  │           │  │  severity       │  │                   │ │
//! │  └───────────┘  └────────┬────────┘  └───────────────────┘ │
//! │                          ▼                                  │
//! │                ┌──────────────────┐                        │
//! │                │ NLI model (ONNX) │  loaded on first use   │
//! │                └──────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod analyzer;
mod classifier;
mod config;
mod error;
mod handlers;
mod models;
mod severity;
mod source;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::analyzer::Analyzer;
use crate::classifier::{validate_labels, NliClassifier};
use crate::models::CANDIDATE_CATEGORIES;
use crate::source::{JsonFileFeed, MockFeed, ReportSource};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "civicpulse=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("CivicPulse AI Backend starting...");

    validate_labels(&CANDIDATE_CATEGORIES).context("Invalid candidate category set")?;

    // Model loads on the first request
    tracing::info!(
        model = %config.model_name,
        dir = %config.model_dir.display(),
        "Waiting for first request to load model"
    );
    let classifier = Arc::new(NliClassifier::new(&config));

    let source: Arc<dyn ReportSource> = match &config.reports_file {
        Some(path) => {
            tracing::info!(file = %path.display(), "Reading reports from file");
            Arc::new(JsonFileFeed::new(path))
        }
        None => Arc::new(MockFeed),
    };
    let analyzer = Arc::new(Analyzer::new(classifier, source));

    // Build application state
    let state = AppState {
        analyzer,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/api/health", get(handlers::health::check))
        .route("/api/analyze", post(handlers::analyze::analyze))
        .route("/api/stats", get(handlers::stats::stats))
        .route("/api/engine/status", get(handlers::engine::status))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
