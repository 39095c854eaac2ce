use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use phone_price_tracker::{
    AppState, build_router,
    models::observation::{PriceObservation, parse_timestamp},
    services::dataset::{DataSource, PriceDataset},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

fn observation(
    model: &str,
    color: &str,
    ram: &str,
    storage: &str,
    price: Decimal,
    timestamp: &str,
) -> PriceObservation {
    PriceObservation {
        model: model.to_string(),
        color: color.to_string(),
        ram: ram.to_string(),
        storage: storage.to_string(),
        price,
        timestamp: parse_timestamp(timestamp).expect("fixture timestamp"),
    }
}

/// Small fixture table, newest first like the Athena query returns it
pub fn fixture_dataset() -> PriceDataset {
    PriceDataset::new(
        vec![
            observation("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "256GB", dec!(45999), "2024-01-03T10:00:00"),
            observation("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "128GB", dec!(40999), "2024-01-02T18:00:00"),
            observation("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "128GB", dec!(39999), "2024-01-02T08:00:00"),
            observation("VIVO_T3_5G", "Cosmic Blue", "8GB", "128GB", dec!(18499), "2024-01-02T09:00:00"),
            observation("SAMSUNG_GALAXY_S24", "Amber Yellow", "8GB", "128GB", dec!(41999), "2024-01-01T12:00:00"),
            observation("VIVO_T3_5G", "Crystal Flake", "8GB", "256GB", dec!(20499), "2024-01-01T09:00:00"),
        ],
        DataSource::Athena,
    )
}

pub fn build_test_router() -> Router {
    build_router(AppState::new(fixture_dataset()))
}

/// Send a GET through the router and decode the JSON body
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };

    (status, json)
}
