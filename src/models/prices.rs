use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::observation::{PriceObservation, format_timestamp};

/// Optional equality filters shared by /api/data, /api/stats and /api/price-history.
///
/// Missing or empty values don't constrain anything.
#[derive(Debug, Clone, Default)]
pub struct PriceCriteria {
    pub model: Option<String>,
    pub color: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
}

impl PriceCriteria {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Fold raw query pairs into criteria. A repeated key keeps its last
    /// value; unknown keys are ignored.
    pub fn from_params(params: &[(String, String)]) -> Self {
        let mut criteria = Self::default();
        for (key, value) in params {
            let slot = match key.as_str() {
                "model" => &mut criteria.model,
                "color" => &mut criteria.color,
                "ram" => &mut criteria.ram,
                "storage" => &mut criteria.storage,
                _ => continue,
            };
            *slot = Some(value.clone());
        }
        criteria
    }

    pub fn matches(&self, observation: &PriceObservation) -> bool {
        field_matches(&self.model, &observation.model)
            && field_matches(&self.color, &observation.color)
            && field_matches(&self.ram, &observation.ram)
            && field_matches(&self.storage, &observation.storage)
    }
}

fn field_matches(constraint: &Option<String>, value: &str) -> bool {
    match constraint.as_deref() {
        None | Some("") => true,
        Some(expected) => expected == value,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// A single observation as returned by GET /api/data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    pub color: String,
    pub ram: String,
    pub storage: String,
    pub price: f64,
    pub timestamp: String,
    pub model: String,
}

impl From<&PriceObservation> for PriceRecord {
    fn from(observation: &PriceObservation) -> Self {
        Self {
            color: observation.color.clone(),
            ram: observation.ram.clone(),
            storage: observation.storage.clone(),
            price: observation.price.to_f64().unwrap_or(0.0),
            timestamp: format_timestamp(&observation.timestamp),
            model: observation.model.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub current_price: f64,
    pub total_records: usize,
}

/// Daily average price, one per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: String, // YYYY-MM-DD
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub colors: Vec<String>,
    pub ram: Vec<String>,
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
    pub total_records: usize,
}
