use axum::{Json, extract::State};

use crate::{AppState, models::prices::HealthResponse};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.dataset.source().to_string(),
        total_records: state.dataset.len(),
    })
}
