use thiserror::Error;

/// Why a query could not produce a result.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The listings source could not be read or parsed.
    #[error("failed to load dataset: {0:#}")]
    DataSource(#[from] anyhow::Error),

    /// A column the query depends on is absent from the source.
    #[error("No {0} column in dataset")]
    MissingColumn(&'static str),

    /// Sampling was asked for on a table with no rows.
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}
