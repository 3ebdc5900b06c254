//! Classifier engine status handler

use axum::{extract::State, Json};

use crate::AppState;
use crate::classifier::EngineStatus;

pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.analyzer.engine_status())
}
