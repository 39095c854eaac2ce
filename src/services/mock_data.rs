//! Synthetic price history used when Athena is disabled or unreachable.

use chrono::{Duration, Local, NaiveDateTime};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;

use crate::models::observation::PriceObservation;

/// Days of history before today
pub const HISTORY_DAYS: i64 = 30;

/// Max relative deviation applied to past prices (±5%)
const MAX_VARIATION: f64 = 0.05;

/// A phone configuration with its reference price
#[derive(Debug, Clone)]
pub struct BaseConfiguration {
    pub model: &'static str,
    pub color: &'static str,
    pub ram: &'static str,
    pub storage: &'static str,
    pub price: Decimal,
}

const fn base(
    model: &'static str,
    color: &'static str,
    ram: &'static str,
    storage: &'static str,
    price: Decimal,
) -> BaseConfiguration {
    BaseConfiguration {
        model,
        color,
        ram,
        storage,
        price,
    }
}

pub const BASE_CONFIGURATIONS: &[BaseConfiguration] = &[
    base("SAMSUNG_GALAXY_S24", "Cobalt Violet", "8GB", "128GB", dec!(49999.0)),
    base("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "128GB", dec!(40999.0)),
    base("SAMSUNG_GALAXY_S24", "Amber Yellow", "8GB", "256GB", dec!(45999.0)),
    base("SAMSUNG_GALAXY_S24", "Cobalt Violet", "8GB", "256GB", dec!(55999.0)),
    base("SAMSUNG_GALAXY_S24", "Marble Grey", "8GB", "256GB", dec!(45999.0)),
    base("VIVO_T3_5G", "Cosmic Blue", "8GB", "128GB", dec!(18499.0)),
    base("SAMSUNG_GALAXY_S24", "Marble Grey", "8GB", "128GB", dec!(40999.0)),
    base("VIVO_T3_5G", "Crystal Flake", "8GB", "256GB", dec!(20499.0)),
    base("VIVO_T3_5G", "Cosmic Blue", "8GB", "256GB", dec!(20499.0)),
    base("SAMSUNG_GALAXY_S24", "Amber Yellow", "8GB", "128GB", dec!(40999.0)),
    base("VIVO_T3_5G", "Crystal Flake", "8GB", "128GB", dec!(18499.0)),
    base("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "256GB", dec!(45999.0)),
];

/// Generate the last 30 days plus today for every base configuration
pub fn generate() -> Vec<PriceObservation> {
    let observations = generate_with(
        BASE_CONFIGURATIONS,
        Local::now().naive_local(),
        &mut rand::thread_rng(),
    );
    tracing::info!("Using mock data: {} records", observations.len());
    observations
}

/// Oldest day first, one row per configuration per day. Today's rows carry the
/// exact base price; earlier days are perturbed within ±5% and rounded to cents.
pub fn generate_with<R: Rng + ?Sized>(
    configurations: &[BaseConfiguration],
    now: NaiveDateTime,
    rng: &mut R,
) -> Vec<PriceObservation> {
    let mut observations =
        Vec::with_capacity(configurations.len() * (HISTORY_DAYS as usize + 1));

    for days_ago in (0..=HISTORY_DAYS).rev() {
        let timestamp = now - Duration::days(days_ago);

        for config in configurations {
            let variation = if days_ago > 0 {
                rng.gen_range(-MAX_VARIATION..=MAX_VARIATION)
            } else {
                0.0
            };
            let factor = Decimal::ONE + Decimal::from_f64(variation).unwrap_or(Decimal::ZERO);

            observations.push(PriceObservation {
                model: config.model.to_string(),
                color: config.color.to_string(),
                ram: config.ram.to_string(),
                storage: config.storage.to_string(),
                price: (config.price * factor).round_dp(2),
                timestamp,
            });
        }
    }

    observations
}
