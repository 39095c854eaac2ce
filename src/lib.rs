// src/lib.rs

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::dataset::PriceDataset;

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<PriceDataset>,
}

impl AppState {
    pub fn new(dataset: PriceDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }
}

pub mod services {
    pub mod athena;
    pub mod data_loader;
    pub mod dataset;
    pub mod mock_data;
}

pub mod config;
pub mod error;
pub mod models;
pub mod handlers;

/// Full API router with CORS open to any origin
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/models", get(handlers::prices::get_models))
        .route("/api/data", get(handlers::prices::get_data))
        .route("/api/stats", get(handlers::prices::get_stats))
        .route(
            "/api/price-history/{model}",
            get(handlers::prices::get_price_history),
        )
        .route("/api/filters", get(handlers::prices::get_filter_options))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
