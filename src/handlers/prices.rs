//! Price query handlers.
//!
//! All endpoints are reads over the startup snapshot; an unknown model or an
//! unmatched filter yields an empty result, never an error. Query strings are
//! taken as raw pairs so repeated keys can't be rejected (last value wins).

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    models::prices::{
        DailyPrice, FilterOptions, ModelsResponse, PriceCriteria, PriceRecord, PriceStats,
    },
};

/// GET /api/models
pub async fn get_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state.dataset.list_models();
    tracing::debug!("Returning {} models", models.len());
    Json(ModelsResponse { models })
}

/// GET /api/data?model&color&ram&storage
pub async fn get_data(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<PriceRecord>> {
    let criteria = PriceCriteria::from_params(&params);
    tracing::info!("Fetching price data with criteria: {:?}", criteria);

    let records: Vec<PriceRecord> = state
        .dataset
        .filter(&criteria)
        .map(PriceRecord::from)
        .collect();

    tracing::debug!("Matched {} records", records.len());
    Json(records)
}

/// GET /api/stats?model&color&ram&storage
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<PriceStats> {
    let criteria = PriceCriteria::from_params(&params);
    tracing::info!("Computing price stats with criteria: {:?}", criteria);
    Json(state.dataset.stats(&criteria))
}

/// GET /api/price-history/{model}?color&ram&storage
pub async fn get_price_history(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<DailyPrice>> {
    let criteria = PriceCriteria::from_params(&params);
    tracing::info!("Fetching price history for {} with criteria: {:?}", model, criteria);

    let history = state.dataset.price_history(&model, &criteria);
    if history.is_empty() {
        tracing::debug!("No price history for {}", model);
    }

    Json(history)
}

/// GET /api/filters?model
pub async fn get_filter_options(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<FilterOptions> {
    let criteria = PriceCriteria::from_params(&params);
    let model = criteria.model.as_deref().filter(|m| !m.is_empty());
    Json(state.dataset.filter_options(model))
}
