use crate::error::ProviderError;
use crate::{PriceHistoryProvider, check_range};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceTable;
use std::collections::HashMap;

/// Serves pre-built price tables, filtered to the requested range.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    tables: HashMap<String, PriceTable>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: PriceTable) -> Self {
        self.tables.insert(table.symbol.clone(), table);
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError> {
        check_range(start, end)?;
        let table = self
            .tables
            .get(symbol)
            .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

        let keep: Vec<bool> = table
            .timestamps
            .iter()
            .map(|t| (start..=end).contains(&t.date_naive()))
            .collect();
        let filtered = PriceTable {
            symbol: table.symbol.clone(),
            timestamps: keep_rows(&table.timestamps, &keep),
            close: table.close.as_deref().map(|v| keep_rows(v, &keep)),
            adj_close: table.adj_close.as_deref().map(|v| keep_rows(v, &keep)),
        };
        if filtered.is_empty() {
            return Err(ProviderError::NoData(symbol.to_string()));
        }
        Ok(filtered)
    }
}

fn keep_rows<T: Copy>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter_map(|(v, k)| k.then_some(*v))
        .collect()
}
