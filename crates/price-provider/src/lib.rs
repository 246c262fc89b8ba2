use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceTable;

pub mod csv_directory;
pub mod error;
pub mod memory;

// --- Public API ---
pub use csv_directory::CsvDirectoryProvider;
pub use memory::InMemoryProvider;

/// The abstract interface for a source of daily price histories.
///
/// This trait is the contract the analysis front end uses, allowing the
/// underlying source (files, an HTTP service, a fixture) to be swapped out.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetches the daily price table of `symbol` for `start..=end`.
    ///
    /// An empty result is reported as `ProviderError::NoData`, never as an
    /// empty table.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError>;
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ProviderError> {
    if start > end {
        return Err(ProviderError::InvalidRange { start, end });
    }
    Ok(())
}
