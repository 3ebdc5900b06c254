//! Banner and health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

#[derive(Serialize)]
pub struct Endpoints {
    analyze: &'static str,
    stats: &'static str,
    health: &'static str,
    engine: &'static str,
}

#[derive(Serialize)]
pub struct BannerResponse {
    message: &'static str,
    status: &'static str,
    version: &'static str,
    model: String,
    endpoints: Endpoints,
}

pub async fn home(State(state): State<AppState>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "CivicPulse AI Backend is running!",
        status: "active",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.model_name.clone(),
        endpoints: Endpoints {
            analyze: "/api/analyze (POST)",
            stats: "/api/stats (GET)",
            health: "/api/health (GET)",
            engine: "/api/engine/status (GET)",
        },
    })
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "CivicPulse AI",
    })
}
