use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// An ordered, validated price history for one asset.
///
/// Timestamps are strictly increasing and every price is finite and positive.
/// The series cannot be modified once built; transformations return new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(CoreError::InvalidInput(
                    "timestamps".to_string(),
                    format!(
                        "{} does not strictly follow {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                ));
            }
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !p.price.is_finite() || p.price <= 0.0)
        {
            return Err(CoreError::InvalidInput(
                "price".to_string(),
                format!("{} at {} is not a positive number", bad.price, bad.timestamp),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = CoreError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        PriceSeries::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// A single period return. `None` marks an undefined observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Simple (percentage change) returns derived from a price series.
///
/// The series keeps one point per source price. The first point has no prior
/// price and is always undefined, so a series built from `n` prices carries
/// `n - 1` defined observations. Non-finite values are stored as undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ReturnPoint>", into = "Vec<ReturnPoint>")]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Derives returns by simple percentage change between consecutive prices.
    pub fn from_prices(prices: &PriceSeries) -> Self {
        let mut points = Vec::with_capacity(prices.len());
        if let Some(first) = prices.first() {
            points.push(ReturnPoint {
                timestamp: first.timestamp,
                value: None,
            });
        }
        points.extend(prices.points().windows(2).map(|w| ReturnPoint {
            timestamp: w[1].timestamp,
            value: finite((w[1].price - w[0].price) / w[0].price),
        }));
        Self { points }
    }

    /// Builds a series from externally computed returns.
    pub fn from_points(points: Vec<ReturnPoint>) -> Result<Self, CoreError> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(CoreError::InvalidInput(
                    "timestamps".to_string(),
                    format!(
                        "{} does not strictly follow {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                ));
            }
        }
        let points = points
            .into_iter()
            .map(|p| ReturnPoint {
                timestamp: p.timestamp,
                value: p.value.and_then(finite),
            })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the defined observations only.
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|p| p.value)
    }

    /// Iterates over `(timestamp, value)` for the defined observations only.
    pub fn defined_points(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.timestamp, v)))
    }

    pub fn defined_count(&self) -> usize {
        self.defined().count()
    }
}

impl TryFrom<Vec<ReturnPoint>> for ReturnSeries {
    type Error = CoreError;

    fn try_from(points: Vec<ReturnPoint>) -> Result<Self, Self::Error> {
        ReturnSeries::from_points(points)
    }
}

impl From<ReturnSeries> for Vec<ReturnPoint> {
    fn from(series: ReturnSeries) -> Self {
        series.points
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
