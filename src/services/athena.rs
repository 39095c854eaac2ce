//! Athena data source.
//!
//! Submits the price query, polls the execution until it settles, then pages
//! through the results and turns each row into a [`PriceObservation`].
//! Calls go through the AWS SDK, so credentials come from the standard chain
//! and requests are SigV4-signed.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_athena::Client;
use aws_sdk_athena::config::http::HttpResponse;
use aws_sdk_athena::error::{DisplayErrorContext, SdkError};
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::AthenaConfig;
use crate::error::{SourceError, SourceResult};
use crate::models::observation::{PriceObservation, parse_timestamp};

/// Execution state as reported by GetQueryExecution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Other(String),
}

impl QueryState {
    pub fn parse(state: &str) -> Self {
        match state {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryStatus {
    pub state: QueryState,
    pub reason: Option<String>,
}

/// One page of query results. Each row is a list of optional cell values.
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    pub rows: Vec<Vec<Option<String>>>,
    pub next_token: Option<String>,
}

/// The three Athena calls the loader needs
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn start_query_execution(&self, query: &str) -> SourceResult<String>;

    async fn get_query_execution(&self, execution_id: &str) -> SourceResult<QueryStatus>;

    async fn get_query_results(
        &self,
        execution_id: &str,
        next_token: Option<&str>,
    ) -> SourceResult<ResultPage>;
}

/// Athena client on top of the AWS SDK
#[derive(Clone)]
pub struct AthenaClient {
    client: Client,
    database: String,
    output_location: String,
}

impl AthenaClient {
    /// Resolve credentials the usual AWS way; `endpoint` overrides the regional URL.
    pub async fn new(config: &AthenaConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_athena::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::from_conf(builder.build(), config)
    }

    pub fn from_conf(sdk_config: aws_sdk_athena::Config, config: &AthenaConfig) -> Self {
        Self {
            client: Client::from_conf(sdk_config),
            database: config.database.clone(),
            output_location: config.output_location.clone(),
        }
    }
}

fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> SourceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.raw_response() {
        Some(raw) if !raw.status().is_success() => SourceError::Api {
            status: raw.status().as_u16(),
            body: message,
        },
        _ => SourceError::Sdk(message),
    }
}

#[async_trait]
impl QueryExecutor for AthenaClient {
    async fn start_query_execution(&self, query: &str) -> SourceResult<String> {
        let output = self
            .client
            .start_query_execution()
            .query_string(query)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(&self.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&self.output_location)
                    .build(),
            )
            .send()
            .await
            .map_err(sdk_error)?;

        output
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| SourceError::Decode("StartQueryExecution returned no execution id".to_string()))
    }

    async fn get_query_execution(&self, execution_id: &str) -> SourceResult<QueryStatus> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(sdk_error)?;

        let status = output.query_execution().and_then(|e| e.status());
        let state = status
            .and_then(|s| s.state())
            .map(|s| QueryState::parse(s.as_str()))
            .unwrap_or_else(|| QueryState::Other(String::new()));

        Ok(QueryStatus {
            state,
            reason: status
                .and_then(|s| s.state_change_reason())
                .map(str::to_string),
        })
    }

    async fn get_query_results(
        &self,
        execution_id: &str,
        next_token: Option<&str>,
    ) -> SourceResult<ResultPage> {
        let output = self
            .client
            .get_query_results()
            .query_execution_id(execution_id)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error)?;

        let rows: Vec<Vec<Option<String>>> = output
            .result_set()
            .map(|set| {
                set.rows()
                    .iter()
                    .map(|row| {
                        row.data()
                            .iter()
                            .map(|d| d.var_char_value().map(str::to_string))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultPage {
            rows,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

pub fn price_query(database: &str, table: &str) -> String {
    format!(
        "SELECT color, ram, storage, price, timestamp, model \
         FROM {}.{} ORDER BY timestamp DESC",
        database, table
    )
}

/// Run the price query and return every parsed observation.
///
/// Polls up to `max_attempts` times, sleeping `poll_interval` between polls.
pub async fn fetch_observations(
    executor: &dyn QueryExecutor,
    config: &AthenaConfig,
) -> SourceResult<Vec<PriceObservation>> {
    let query = price_query(&config.database, &config.table);
    let execution_id = executor.start_query_execution(&query).await?;
    tracing::info!("Started Athena query {}", execution_id);

    wait_for_completion(executor, &execution_id, config).await?;

    let mut observations = Vec::new();
    let mut next_token: Option<String> = None;
    let mut first_page = true;
    let mut row_number = 0usize;

    loop {
        let page = executor
            .get_query_results(&execution_id, next_token.as_deref())
            .await?;

        // Athena returns the column header as the first row of the first page only
        let skip = if first_page { 1 } else { 0 };
        for row in page.rows.iter().skip(skip) {
            row_number += 1;
            if let Some(observation) = parse_row(row, row_number)? {
                observations.push(observation);
            }
        }

        first_page = false;
        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    tracing::info!("Successfully loaded {} records from Athena", observations.len());
    Ok(observations)
}

async fn wait_for_completion(
    executor: &dyn QueryExecutor,
    execution_id: &str,
    config: &AthenaConfig,
) -> SourceResult<()> {
    for attempt in 1..=config.max_attempts {
        let status = executor.get_query_execution(execution_id).await?;
        tracing::debug!(
            "Athena query {} state {:?} (attempt {}/{})",
            execution_id,
            status.state,
            attempt,
            config.max_attempts
        );

        match status.state {
            QueryState::Succeeded => return Ok(()),
            QueryState::Failed | QueryState::Cancelled => {
                return Err(SourceError::QueryFailed(
                    status.reason.unwrap_or_else(|| "Unknown error".to_string()),
                ));
            }
            _ => tokio::time::sleep(config.poll_interval).await,
        }
    }

    Err(SourceError::Timeout(config.max_attempts))
}

fn cell(row: &[Option<String>], index: usize) -> String {
    row.get(index).cloned().flatten().unwrap_or_default()
}

/// Columns: color, ram, storage, price, timestamp, model.
///
/// Returns `Ok(None)` for rows that can't be represented (negative price or
/// unreadable timestamp); a non-numeric price fails the whole fetch.
fn parse_row(row: &[Option<String>], row_number: usize) -> SourceResult<Option<PriceObservation>> {
    let raw_price = cell(row, 3);
    let price = if raw_price.trim().is_empty() {
        Decimal::ZERO
    } else {
        parse_price(raw_price.trim()).ok_or_else(|| SourceError::MalformedRow {
            row: row_number,
            reason: format!("invalid price '{}'", raw_price),
        })?
    };

    if price.is_sign_negative() && !price.is_zero() {
        tracing::warn!("Skipping row {}: negative price {}", row_number, price);
        return Ok(None);
    }

    let raw_timestamp = cell(row, 4);
    let Some(timestamp) = parse_timestamp(&raw_timestamp) else {
        tracing::warn!("Skipping row {}: invalid timestamp '{}'", row_number, raw_timestamp);
        return Ok(None);
    };

    Ok(Some(PriceObservation {
        color: cell(row, 0),
        ram: cell(row, 1),
        storage: cell(row, 2),
        price,
        timestamp,
        model: cell(row, 5),
    }))
}

fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
