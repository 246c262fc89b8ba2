use crate::error::AnalyticsError;
use crate::report::{ValuePoint, ValueSeries};
use core_types::{PricePoint, PriceSeries, ReturnSeries};

/// Base level of a normalized price index.
pub const INDEX_BASE: f64 = 100.0;

/// Rebases a price series so that its first observation equals 100.
pub fn normalize_index(prices: &PriceSeries) -> Result<PriceSeries, AnalyticsError> {
    let first = prices.first().ok_or(AnalyticsError::EmptySeries)?;
    let factor = INDEX_BASE / first.price;

    // The base is pinned so rounding in the factor cannot move it off 100.
    let points = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| PricePoint {
            timestamp: p.timestamp,
            price: if i == 0 { INDEX_BASE } else { p.price * factor },
        })
        .collect();
    Ok(PriceSeries::new(points)?)
}

/// Value of `principal` invested at the start of a return series.
///
/// Each point is the principal times the running product of `1 + return`.
/// Undefined returns, including the leading one, compound as zero, so the
/// first point is the principal itself and the output has one point per
/// point of the input.
pub fn cumulative_value(returns: &ReturnSeries, principal: f64) -> Result<ValueSeries, AnalyticsError> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "principal must be a positive number, got {principal}"
        )));
    }

    let mut growth = 1.0;
    Ok(returns
        .points()
        .iter()
        .map(|point| {
            growth *= 1.0 + point.value.unwrap_or(0.0);
            ValuePoint {
                timestamp: point.timestamp,
                value: principal * growth,
            }
        })
        .collect())
}
