use crate::config::Config;
use crate::error::SourceResult;
use crate::models::observation::PriceObservation;
use crate::services::athena::{AthenaClient, QueryExecutor, fetch_observations};
use crate::services::dataset::{DataSource, PriceDataset};
use crate::services::mock_data;

/// Load the price table once at startup.
///
/// Uses synthetic data when `USE_MOCK_DATA` is set, otherwise Athena with a
/// single fallback to synthetic data if anything goes wrong.
pub async fn load_dataset(config: &Config) -> PriceDataset {
    if config.use_mock_data {
        tracing::info!("USE_MOCK_DATA is set, skipping Athena");
        return PriceDataset::new(mock_data::generate(), DataSource::Mock);
    }

    let client = AthenaClient::new(&config.athena).await;
    resolve(load_from_source(&client, config).await)
}

/// Same as [`load_dataset`]'s Athena branch, against any executor.
pub async fn load_with_executor(executor: &dyn QueryExecutor, config: &Config) -> PriceDataset {
    resolve(load_from_source(executor, config).await)
}

async fn load_from_source(
    executor: &dyn QueryExecutor,
    config: &Config,
) -> SourceResult<Vec<PriceObservation>> {
    tracing::info!(
        "Loading prices from Athena {}.{} ({})",
        config.athena.database,
        config.athena.table,
        config.athena.region
    );
    fetch_observations(executor, &config.athena).await
}

fn resolve(result: SourceResult<Vec<PriceObservation>>) -> PriceDataset {
    match result {
        Ok(observations) => PriceDataset::new(observations, DataSource::Athena),
        Err(e) => {
            tracing::error!("Error loading data from Athena: {}", e);
            tracing::warn!("Falling back to mock data");
            PriceDataset::new(mock_data::generate(), DataSource::Mock)
        }
    }
}
