use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price data available for '{0}'")]
    NoData(String),

    #[error("Neither an adjusted close nor a close column is present for '{0}'")]
    MissingPriceColumn(String),

    #[error("Cannot normalize an empty price series")]
    EmptySeries,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Only {available} of the required {required} assets could be analyzed (failed: {failed:?})")]
    NotEnoughAssets {
        required: usize,
        available: usize,
        failed: Vec<String>,
    },

    #[error("Invalid series data: {0}")]
    Core(#[from] CoreError),
}
