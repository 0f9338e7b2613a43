use thiserror::Error;

/// Convenience result type for pivot configuration and export.
pub type PivotResult<T> = Result<T, PivotError>;

/// Error type returned by pivot configuration and snapshot export.
///
/// Building itself never fails: an empty or underspecified build yields no table instead.
#[derive(Debug, Error)]
pub enum PivotError {
    /// A field name does not exist in the dataset schema.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// An aggregator name does not match any supported [`crate::aggregator::AggregatorKind`].
    #[error("unknown aggregator '{name}' (expected one of: sum, count, average)")]
    UnknownAggregator { name: String },

    /// Snapshot or definition (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
