//! Dashboard statistics handler

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::models::StatsSnapshot;

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<StatsSnapshot>> {
    let analyzer = state.analyzer.clone();
    let snapshot = tokio::task::spawn_blocking(move || analyzer.stats()).await??;
    Ok(Json(snapshot))
}
