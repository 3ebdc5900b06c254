//! Analyze handler

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::models::AnalysisEnvelope;

/// Classify and rank every report from the feed
pub async fn analyze(State(state): State<AppState>) -> AppResult<Json<AnalysisEnvelope>> {
    let analyzer = state.analyzer.clone();

    // Inference is blocking and CPU bound
    let issues = tokio::task::spawn_blocking(move || analyzer.analyze()).await??;

    tracing::info!(total = issues.len(), "Analyzed reports");
    Ok(Json(AnalysisEnvelope::new(issues)))
}
