use crate::error::AnalyticsError;
use core_types::{PricePoint, PriceSeries, PriceTable, ReturnSeries};
use rust_decimal::prelude::ToPrimitive;

/// Selects the canonical price column of a raw table.
///
/// The adjusted close is preferred; the plain close is used when the provider
/// did not deliver an adjusted column. A table without rows is `NoData`.
pub fn select_price_series(table: &PriceTable) -> Result<PriceSeries, AnalyticsError> {
    if table.is_empty() {
        return Err(AnalyticsError::NoData(table.symbol.clone()));
    }
    table.validate_shape()?;

    let field = table
        .canonical_field()
        .ok_or_else(|| AnalyticsError::MissingPriceColumn(table.symbol.clone()))?;
    let values = table
        .column(field)
        .ok_or_else(|| AnalyticsError::MissingPriceColumn(table.symbol.clone()))?;

    let points = table
        .timestamps
        .iter()
        .zip(values)
        .map(|(timestamp, value)| {
            let price = value.to_f64().ok_or_else(|| {
                AnalyticsError::InvalidParameter(format!(
                    "price {} of '{}' at {} is not representable",
                    value, table.symbol, timestamp
                ))
            })?;
            Ok(PricePoint {
                timestamp: *timestamp,
                price,
            })
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    tracing::debug!(
        symbol = %table.symbol,
        column = field.column_name(),
        rows = points.len(),
        "Selected canonical price column."
    );
    Ok(PriceSeries::new(points)?)
}

/// Normalizes a raw table into its canonical price series and daily returns.
pub fn prepare_returns(table: &PriceTable) -> Result<(PriceSeries, ReturnSeries), AnalyticsError> {
    let prices = select_price_series(table)?;
    let returns = ReturnSeries::from_prices(&prices);
    Ok((prices, returns))
}
