use crate::error::ProviderError;
use crate::{PriceHistoryProvider, check_range};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{PriceField, PriceTable};
use rust_decimal::Decimal;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

const DATE_COLUMN: &str = "Date";

/// Reads daily price histories from `<dir>/<SYMBOL>.csv` files.
///
/// The files follow the common end-of-day export layout
/// (`Date,Open,High,Low,Close,Adj Close,Volume`). Only `Date` is mandatory;
/// a missing `Close` or `Adj Close` header leaves that column absent from the
/// returned table. A price column with blank or `null` cells is dropped in
/// favour of a complete one; rows without any price are skipped.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvDirectoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError> {
        check_range(start, end)?;
        let path = self.path_for(symbol);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(symbol, path = %path.display(), "No price file for symbol.");
                return Err(ProviderError::NoData(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let table = parse_table(symbol, &bytes, start, end)?;
        if table.is_empty() {
            return Err(ProviderError::NoData(symbol.to_string()));
        }
        tracing::debug!(symbol, rows = table.len(), "Loaded price history.");
        Ok(table)
    }
}

/// Parses a CSV export into a price table restricted to `start..=end`.
pub fn parse_table(
    symbol: &str,
    bytes: &[u8],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceTable, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| ProviderError::InvalidData(format!("'{symbol}' has no '{DATE_COLUMN}' column")))?;
    let column_idx = |field: PriceField| headers.iter().position(|h| h == field.column_name());
    let close_idx = column_idx(PriceField::Close);
    let adj_idx = column_idx(PriceField::AdjClose);

    let mut rows: Vec<Row> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_date).ok_or_else(|| {
            ProviderError::InvalidData(format!(
                "'{symbol}' row {}: unrecognised date '{raw_date}'",
                line + 1
            ))
        })?;
        if !(start..=end).contains(&timestamp.date_naive()) {
            continue;
        }

        let close = close_idx.and_then(|i| parse_price(record.get(i)));
        let adj_close = adj_idx.and_then(|i| parse_price(record.get(i)));
        if close.is_none() && adj_close.is_none() && (close_idx.is_some() || adj_idx.is_some()) {
            tracing::debug!(symbol, row = line + 1, "Skipping row without a price.");
            continue;
        }
        rows.push(Row {
            timestamp,
            close,
            adj_close,
        });
    }

    let table = align_columns(symbol, rows, close_idx.is_some(), adj_idx.is_some());
    sort_and_check(table)
}

struct Row {
    timestamp: DateTime<Utc>,
    close: Option<Decimal>,
    adj_close: Option<Decimal>,
}

/// Builds equally long columns from rows that may lack one of the prices.
///
/// A column with a gap in any row is dropped, so a blank `Adj Close` falls
/// back to `Close`. When every column has gaps, the better populated one is
/// kept (adjusted close on a tie) and rows without it are skipped.
fn align_columns(symbol: &str, mut rows: Vec<Row>, has_close: bool, has_adj: bool) -> PriceTable {
    let complete = |rows: &[Row], pick: fn(&Row) -> Option<Decimal>| rows.iter().all(|r| pick(r).is_some());
    let close_of: fn(&Row) -> Option<Decimal> = |r| r.close;
    let adj_of: fn(&Row) -> Option<Decimal> = |r| r.adj_close;

    let mut keep_close = has_close && complete(&rows, close_of);
    let mut keep_adj = has_adj && complete(&rows, adj_of);

    if !keep_close && !keep_adj && (has_close || has_adj) {
        let count = |pick: fn(&Row) -> Option<Decimal>| rows.iter().filter(|r| pick(r).is_some()).count();
        let prefer_adj = has_adj && (!has_close || count(adj_of) >= count(close_of));
        let primary = if prefer_adj { adj_of } else { close_of };
        rows.retain(|r| primary(r).is_some());
        tracing::debug!(
            symbol,
            column = if prefer_adj { "Adj Close" } else { "Close" },
            rows = rows.len(),
            "Price columns have gaps, keeping the better populated one."
        );
        keep_adj = prefer_adj || (has_adj && complete(&rows, adj_of));
        keep_close = !prefer_adj || (has_close && complete(&rows, close_of));
    }

    let column = |keep: bool, pick: fn(&Row) -> Option<Decimal>| {
        keep.then(|| rows.iter().filter_map(pick).collect::<Vec<_>>())
    };
    PriceTable {
        symbol: symbol.to_string(),
        timestamps: rows.iter().map(|r| r.timestamp).collect(),
        close: column(keep_close, close_of),
        adj_close: column(keep_adj, adj_of),
    }
}

/// Exports are usually ascending, but some sources write newest first.
fn sort_and_check(mut table: PriceTable) -> Result<PriceTable, ProviderError> {
    if table.timestamps.windows(2).any(|w| w[1] < w[0]) {
        let mut order: Vec<usize> = (0..table.timestamps.len()).collect();
        order.sort_by_key(|&i| table.timestamps[i]);
        let reorder = |values: &[Decimal]| order.iter().map(|&i| values[i]).collect::<Vec<_>>();
        table.close = table.close.as_deref().map(reorder);
        table.adj_close = table.adj_close.as_deref().map(reorder);
        table.timestamps = order.iter().map(|&i| table.timestamps[i]).collect();
    }
    if let Some(w) = table.timestamps.windows(2).find(|w| w[0] == w[1]) {
        return Err(ProviderError::InvalidData(format!(
            "'{}' has duplicate rows for {}",
            table.symbol,
            w[0].date_naive()
        )));
    }
    Ok(table)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A blank, `null` or unparsable cell is a missing price.
fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    match raw {
        None | Some("") | Some("null") => None,
        Some(value) => Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .ok(),
    }
}
