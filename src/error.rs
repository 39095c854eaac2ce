/// Failures while loading observations from the external query source.
///
/// These never reach an API caller: the data loader turns any of them into a
/// fallback to synthetic data at startup.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Athena SDK error: {0}")]
    Sdk(String),

    #[error("Athena API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Athena response: {0}")]
    Decode(String),

    #[error("Athena query failed: {0}")]
    QueryFailed(String),

    #[error("Athena query timed out after {0} attempts")]
    Timeout(u32),

    #[error("Malformed result row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
