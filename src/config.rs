use std::time::Duration;

/// Runtime configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub use_mock_data: bool,
    pub athena: AthenaConfig,
    pub host: String,
    pub port: u16,
}

/// Connection and polling parameters for the Athena data source.
#[derive(Debug, Clone)]
pub struct AthenaConfig {
    pub region: String,
    pub database: String,
    pub table: String,
    pub output_location: String,
    /// Overrides the regional Athena endpoint when set
    pub endpoint: Option<String>,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let region = var("AWS_REGION", "us-east-1");
        let endpoint = lookup("ATHENA_ENDPOINT").filter(|e| !e.trim().is_empty());

        let poll_interval_ms = var("ATHENA_POLL_INTERVAL_MS", "1000")
            .parse::<u64>()
            .unwrap_or(1000);
        let max_attempts = var("ATHENA_MAX_ATTEMPTS", "30").parse::<u32>().unwrap_or(30);

        Config {
            use_mock_data: var("USE_MOCK_DATA", "true").to_lowercase() == "true",
            athena: AthenaConfig {
                region,
                database: var("ATHENA_DATABASE", "your_database_name"),
                table: var("ATHENA_TABLE", "your_table_name"),
                output_location: var("ATHENA_OUTPUT_LOCATION", "s3://your-bucket/athena-results/"),
                endpoint,
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_attempts,
            },
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8000").parse::<u16>().unwrap_or(8000),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
