use crate::stats;
use chrono::{DateTime, Utc};
use core_types::PriceSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Return and risk figures for one asset.
///
/// Every figure is optional. `None` means "not applicable": too few
/// observations, or a ratio whose denominator is zero. Values are raw
/// fractions (0.05 is 5%), never pre-formatted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    /// Number of defined daily returns the figures are based on.
    pub observations: usize,
    pub mean_daily_return: Option<f64>,
    pub daily_volatility: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    /// Annualized excess return over annualized volatility.
    pub sharpe: Option<f64>,
    /// Daily excess return over daily volatility, without annualization.
    pub daily_sharpe: Option<f64>,
    /// Annualized sample deviation of the negative returns.
    pub downside_deviation: Option<f64>,
    pub sortino: Option<f64>,
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
}

impl AssetMetrics {
    /// Attaches the benchmark-relative figures.
    pub fn with_benchmark(mut self, relative: BetaAlpha) -> Self {
        self.beta = relative.beta;
        self.alpha = relative.alpha;
        self
    }
}

/// Sensitivity of an asset to a benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaAlpha {
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
    /// Number of timestamps where both series had a defined return.
    pub observations: usize,
}

/// A coarse reading of the average pairwise correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diversification {
    /// Average correlation above 0.7.
    HighlyCorrelated,
    /// Average correlation above 0.3.
    ModeratelyCorrelated,
    Diversifying,
}

impl Diversification {
    pub fn from_average(average: f64) -> Self {
        if average > 0.7 {
            Diversification::HighlyCorrelated
        } else if average > 0.3 {
            Diversification::ModeratelyCorrelated
        } else {
            Diversification::Diversifying
        }
    }
}

/// Pairwise Pearson correlation of daily returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub assets: Vec<String>,
    /// Row-major, `assets.len()` x `assets.len()`. Symmetric with a unit diagonal.
    pub values: Vec<Vec<Option<f64>>>,
    /// Number of complete rows (every asset defined) the coefficients use.
    pub observations: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.assets.iter().position(|s| s == a)?;
        let j = self.assets.iter().position(|s| s == b)?;
        self.values[i][j]
    }

    /// Mean of every defined entry, diagonal included.
    ///
    /// `None` unless at least one pair of distinct assets has a defined
    /// coefficient; the diagonal alone says nothing about co-movement.
    pub fn average_correlation(&self) -> Option<f64> {
        let has_pair = self.values.iter().enumerate().any(|(i, row)| {
            row.iter()
                .enumerate()
                .any(|(j, value)| i != j && value.is_some())
        });
        if !has_pair {
            return None;
        }
        let entries: Vec<f64> = self.values.iter().flatten().flatten().copied().collect();
        stats::mean(&entries)
    }

    pub fn diversification(&self) -> Option<Diversification> {
        self.average_correlation().map(Diversification::from_average)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Value of an invested principal over time.
pub type ValueSeries = Vec<ValuePoint>;

/// Cumulative value of the same principal invested in each asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioProjection {
    pub principal: f64,
    pub values: BTreeMap<String, ValueSeries>,
}

/// Simulated future price trajectories for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPaths {
    pub last_price: f64,
    pub mu: f64,
    pub sigma: f64,
    pub horizon_days: usize,
    /// One vector of `horizon_days` prices per path.
    pub paths: Vec<Vec<f64>>,
}

/// Distribution of the final simulated prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalSummary {
    pub mean: f64,
    pub p05: f64,
    pub p95: f64,
}

impl SimulationPaths {
    pub fn terminal_prices(&self) -> Vec<f64> {
        self.paths.iter().filter_map(|p| p.last().copied()).collect()
    }

    pub fn terminal_summary(&self) -> Option<TerminalSummary> {
        let mut finals = self.terminal_prices();
        finals.sort_by(f64::total_cmp);
        Some(TerminalSummary {
            mean: stats::mean(&finals)?,
            p05: stats::quantile(&finals, 0.05)?,
            p95: stats::quantile(&finals, 0.95)?,
        })
    }
}

/// The asset that leads a ranking, with the figure it leads on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub symbol: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub best_annual_return: Option<Leader>,
    pub lowest_annual_volatility: Option<Leader>,
    /// Mean of the defined Sharpe ratios.
    pub average_sharpe: Option<f64>,
}

impl BatchSummary {
    pub fn from_metrics(metrics: &BTreeMap<String, AssetMetrics>) -> Self {
        let leader = |pick: fn(&AssetMetrics) -> Option<f64>, highest: bool| {
            metrics
                .iter()
                .filter_map(|(symbol, m)| pick(m).map(|value| (symbol, value)))
                .max_by(|a, b| {
                    if highest {
                        a.1.total_cmp(&b.1)
                    } else {
                        b.1.total_cmp(&a.1)
                    }
                })
                .map(|(symbol, value)| Leader {
                    symbol: symbol.clone(),
                    value,
                })
        };
        let sharpes: Vec<f64> = metrics.values().filter_map(|m| m.sharpe).collect();

        Self {
            best_annual_return: leader(|m| m.annualized_return, true),
            lowest_annual_volatility: leader(|m| m.annualized_volatility, false),
            average_sharpe: stats::mean(&sharpes),
        }
    }
}

/// A symbol that could not be analyzed, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFailure {
    pub symbol: String,
    pub reason: String,
}

/// Everything one analysis run produces, ready for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Successfully analyzed symbols in input order.
    pub assets: Vec<String>,
    pub metrics: BTreeMap<String, AssetMetrics>,
    /// Price series rebased so that the first observation is 100.
    pub normalized: BTreeMap<String, PriceSeries>,
    pub projection: PortfolioProjection,
    pub correlation: CorrelationMatrix,
    pub average_correlation: Option<f64>,
    pub diversification: Option<Diversification>,
    pub simulations: BTreeMap<String, SimulationPaths>,
    pub summary: BatchSummary,
    pub failures: Vec<AssetFailure>,
    /// Why beta and alpha are missing when a benchmark was requested but unusable.
    pub benchmark_failure: Option<AssetFailure>,
}

impl BatchReport {
    /// Records a symbol that failed before reaching the engine, e.g. at the provider.
    pub fn record_failure(&mut self, symbol: impl Into<String>, reason: impl ToString) {
        self.failures.push(AssetFailure {
            symbol: symbol.into(),
            reason: reason.to_string(),
        });
    }

    /// Records that the benchmark could not be fetched or prepared.
    pub fn record_benchmark_failure(&mut self, symbol: impl Into<String>, reason: impl ToString) {
        self.benchmark_failure = Some(AssetFailure {
            symbol: symbol.into(),
            reason: reason.to_string(),
        });
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.symbol.as_str()).collect()
    }
}
