use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No price data available for '{0}' in the requested range")]
    NoData(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to read price history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV price history: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data format in price history: {0}")]
    InvalidData(String),
}
