//! In-memory price table and the read-only queries served over it.
//!
//! The table is built once at startup and never mutated, so every query is a
//! plain scan over shared data.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::models::observation::PriceObservation;
use crate::models::prices::{DailyPrice, FilterOptions, PriceCriteria, PriceStats};

/// Where the loaded observations came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Athena,
    Mock,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Athena => "athena",
            DataSource::Mock => "mock",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of all price observations
#[derive(Debug, Clone)]
pub struct PriceDataset {
    observations: Vec<PriceObservation>,
    source: DataSource,
}

impl PriceDataset {
    pub fn new(observations: Vec<PriceObservation>, source: DataSource) -> Self {
        Self {
            observations,
            source,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct model names in first-seen order
    pub fn list_models(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .filter(|o| seen.insert(o.model.as_str()))
            .map(|o| o.model.clone())
            .collect()
    }

    /// Rows matching every given constraint, in load order
    pub fn filter<'a>(&'a self, criteria: &'a PriceCriteria) -> impl Iterator<Item = &'a PriceObservation> + 'a {
        self.observations.iter().filter(move |o| criteria.matches(o))
    }

    /// Summary statistics over the filtered rows.
    ///
    /// `current_price` is the price of the latest observation; when several
    /// share that timestamp the first one in load order wins. An empty
    /// selection yields all zeros.
    pub fn stats(&self, criteria: &PriceCriteria) -> PriceStats {
        let mut matched = self.filter(criteria);

        let Some(first) = matched.next() else {
            return PriceStats::default();
        };

        let mut min = first.price;
        let mut max = first.price;
        let mut sum = PriceSum::default();
        sum.add(first.price);
        let mut latest = first;

        for observation in matched {
            min = min.min(observation.price);
            max = max.max(observation.price);
            sum.add(observation.price);
            if observation.timestamp > latest.timestamp {
                latest = observation;
            }
        }

        PriceStats {
            min_price: to_f64(min),
            max_price: to_f64(max),
            avg_price: sum.mean(),
            current_price: to_f64(latest.price),
            total_records: sum.count,
        }
    }

    /// Mean price per calendar date for one model, ascending by date.
    ///
    /// The `model` field of `criteria` is ignored in favour of `model`.
    pub fn price_history(&self, model: &str, criteria: &PriceCriteria) -> Vec<DailyPrice> {
        let criteria = PriceCriteria {
            model: Some(model.to_string()),
            ..criteria.clone()
        };

        let mut by_date: BTreeMap<NaiveDate, PriceSum> = BTreeMap::new();
        for observation in self.filter(&criteria) {
            by_date
                .entry(observation.timestamp.date())
                .or_default()
                .add(observation.price);
        }

        by_date
            .into_iter()
            .map(|(date, sum)| DailyPrice {
                date: date.format("%Y-%m-%d").to_string(),
                price: sum.mean(),
            })
            .collect()
    }

    /// Sorted distinct colors, RAM and storage values, optionally for one model
    pub fn filter_options(&self, model: Option<&str>) -> FilterOptions {
        let criteria = PriceCriteria {
            model: model.map(str::to_string),
            ..Default::default()
        };

        let mut colors = BTreeSet::new();
        let mut ram = BTreeSet::new();
        let mut storage = BTreeSet::new();

        for observation in self.filter(&criteria) {
            colors.insert(observation.color.as_str());
            ram.insert(observation.ram.as_str());
            storage.insert(observation.storage.as_str());
        }

        FilterOptions {
            colors: colors.into_iter().map(str::to_string).collect(),
            ram: ram.into_iter().map(str::to_string).collect(),
            storage: storage.into_iter().map(str::to_string).collect(),
        }
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Running total for a mean. Stays exact in `Decimal` until the sum would
/// overflow, then continues in `f64`.
#[derive(Debug)]
struct PriceSum {
    exact: Option<Decimal>,
    approx: f64,
    count: usize,
}

impl Default for PriceSum {
    fn default() -> Self {
        Self {
            exact: Some(Decimal::ZERO),
            approx: 0.0,
            count: 0,
        }
    }
}

impl PriceSum {
    fn add(&mut self, price: Decimal) {
        self.exact = self.exact.and_then(|sum| sum.checked_add(price));
        self.approx += to_f64(price);
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match self.exact {
            Some(sum) => to_f64(sum / Decimal::from(self.count)),
            None => self.approx / self.count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::parse_timestamp;
    use rust_decimal_macros::dec;

    fn obs(model: &str, color: &str, ram: &str, storage: &str, price: Decimal, ts: &str) -> PriceObservation {
        PriceObservation {
            model: model.to_string(),
            color: color.to_string(),
            ram: ram.to_string(),
            storage: storage.to_string(),
            price,
            timestamp: parse_timestamp(ts).unwrap(),
        }
    }

    fn sample() -> PriceDataset {
        PriceDataset::new(
            vec![
                obs("A", "Red", "8GB", "128GB", dec!(10), "2024-01-01"),
                obs("A", "Red", "8GB", "128GB", dec!(20), "2024-01-01"),
                obs("A", "Blue", "8GB", "256GB", dec!(30), "2024-01-02"),
            ],
            DataSource::Mock,
        )
    }

    fn criteria(model: Option<&str>, color: Option<&str>) -> PriceCriteria {
        PriceCriteria {
            model: model.map(str::to_string),
            color: color.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_with_timestamp_tie() {
        let stats = sample().stats(&criteria(Some("A"), Some("Red")));
        assert_eq!(stats.min_price, 10.0);
        assert_eq!(stats.max_price, 20.0);
        assert_eq!(stats.avg_price, 15.0);
        // Both rows share the latest timestamp: first in load order wins
        assert_eq!(stats.current_price, 10.0);
        assert_eq!(stats.total_records, 2);
    }

    #[test]
    fn test_stats_current_price_is_latest() {
        let stats = sample().stats(&criteria(Some("A"), None));
        assert_eq!(stats.current_price, 30.0);
        assert_eq!(stats.avg_price, 20.0);
    }

    #[test]
    fn test_stats_empty_selection_is_zeroed() {
        let stats = sample().stats(&criteria(Some("nonexistent"), None));
        assert_eq!(stats, PriceStats::default());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.current_price, 0.0);
    }

    #[test]
    fn test_stats_count_matches_filter() {
        let dataset = sample();
        for c in [
            criteria(None, None),
            criteria(Some("A"), None),
            criteria(Some("A"), Some("Blue")),
            criteria(None, Some("Green")),
        ] {
            let stats = dataset.stats(&c);
            assert_eq!(stats.total_records, dataset.filter(&c).count());
            if stats.total_records > 0 {
                assert!(stats.min_price <= stats.avg_price);
                assert!(stats.avg_price <= stats.max_price);
            }
        }
    }

    #[test]
    fn test_filter_respects_every_constraint() {
        let dataset = sample();
        let c = PriceCriteria {
            storage: Some("128GB".to_string()),
            ..Default::default()
        };
        let rows: Vec<_> = dataset.filter(&c).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|o| o.storage == "128GB"));

        assert_eq!(dataset.filter(&criteria(Some("nonexistent"), None)).count(), 0);
    }

    #[test]
    fn test_filter_keeps_load_order() {
        let prices: Vec<Decimal> = sample()
            .filter(&PriceCriteria::default())
            .map(|o| o.price)
            .collect();
        assert_eq!(prices, vec![dec!(10), dec!(20), dec!(30)]);
    }

    #[test]
    fn test_price_history_daily_average() {
        let history = sample().price_history("A", &PriceCriteria::default());
        assert_eq!(
            history,
            vec![
                DailyPrice { date: "2024-01-01".to_string(), price: 15.0 },
                DailyPrice { date: "2024-01-02".to_string(), price: 30.0 },
            ]
        );
    }

    #[test]
    fn test_price_history_merges_times_of_day() {
        let dataset = PriceDataset::new(
            vec![
                obs("A", "Red", "8GB", "128GB", dec!(100), "2024-05-03T23:00:00"),
                obs("A", "Red", "8GB", "128GB", dec!(200), "2024-05-01T08:00:00"),
                obs("A", "Red", "8GB", "128GB", dec!(300), "2024-05-03T01:00:00"),
            ],
            DataSource::Athena,
        );
        let history = dataset.price_history("A", &PriceCriteria::default());
        // Sorted by date, no entry for the missing 2024-05-02
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], DailyPrice { date: "2024-05-01".to_string(), price: 200.0 });
        assert_eq!(history[1], DailyPrice { date: "2024-05-03".to_string(), price: 200.0 });
    }

    #[test]
    fn test_price_history_ignores_criteria_model() {
        let dataset = sample();
        let history = dataset.price_history("A", &criteria(Some("B"), Some("Blue")));
        assert_eq!(history, vec![DailyPrice { date: "2024-01-02".to_string(), price: 30.0 }]);

        assert!(dataset.price_history("B", &PriceCriteria::default()).is_empty());
    }

    #[test]
    fn test_filter_options_sorted_and_distinct() {
        let mut rows = sample().observations;
        rows.push(obs("B", "Amber", "12GB", "512GB", dec!(5), "2024-01-03"));
        let dataset = PriceDataset::new(rows, DataSource::Mock);

        let all = dataset.filter_options(None);
        assert_eq!(all.colors, vec!["Amber", "Blue", "Red"]);
        // Lexicographic, not numeric
        assert_eq!(all.ram, vec!["12GB", "8GB"]);
        assert_eq!(all.storage, vec!["128GB", "256GB", "512GB"]);

        let only_a = dataset.filter_options(Some("A"));
        assert_eq!(only_a.colors, vec!["Blue", "Red"]);
        assert_eq!(only_a.ram, vec!["8GB"]);

        assert_eq!(dataset.filter_options(Some("missing")), FilterOptions::default());
    }

    #[test]
    fn test_list_models_first_seen_order() {
        let dataset = PriceDataset::new(
            vec![
                obs("VIVO_T3_5G", "Cosmic Blue", "8GB", "128GB", dec!(1), "2024-01-01"),
                obs("SAMSUNG_GALAXY_S24", "Onyx Black", "8GB", "128GB", dec!(2), "2024-01-01"),
                obs("VIVO_T3_5G", "Crystal Flake", "8GB", "256GB", dec!(3), "2024-01-02"),
            ],
            DataSource::Mock,
        );
        assert_eq!(dataset.list_models(), vec!["VIVO_T3_5G", "SAMSUNG_GALAXY_S24"]);
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_huge_prices_do_not_overflow() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let dataset = PriceDataset::new(
            vec![
                obs("A", "Red", "8GB", "128GB", huge, "2024-01-01T08:00:00"),
                obs("A", "Red", "8GB", "128GB", huge, "2024-01-01T20:00:00"),
            ],
            DataSource::Athena,
        );

        let stats = dataset.stats(&PriceCriteria::default());
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.min_price, stats.max_price);
        assert!((stats.avg_price - stats.max_price).abs() <= stats.max_price * 1e-12);

        let history = dataset.price_history("A", &PriceCriteria::default());
        assert_eq!(history.len(), 1);
        assert!((history[0].price - stats.max_price).abs() <= stats.max_price * 1e-12);
    }

    #[test]
    fn test_price_sum_stays_exact() {
        let mut sum = PriceSum::default();
        assert_eq!(sum.mean(), 0.0);
        sum.add(dec!(0.1));
        sum.add(dec!(0.2));
        assert_eq!(sum.exact, Some(dec!(0.3)));
        assert_eq!(sum.count, 2);
        assert_eq!(sum.mean(), 0.15);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = PriceDataset::new(Vec::new(), DataSource::Athena);
        assert!(dataset.is_empty());
        assert!(dataset.list_models().is_empty());
        assert_eq!(dataset.stats(&PriceCriteria::default()), PriceStats::default());
        assert_eq!(dataset.source().to_string(), "athena");
    }
}
