use crate::report::AssetMetrics;
use crate::stats::{mean, ratio, sample_std};
use core_types::ReturnSeries;
use serde::{Deserialize, Serialize};

/// Length of the trading year used for every annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// The excess-return convention applied to Sharpe and Sortino.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Annual risk-free rate as a fraction. Zero reproduces the plain
    /// return-over-risk ratios.
    pub risk_free_rate: f64,
}

/// Computes the single-asset return and risk figures of a return series.
///
/// Undefined observations are skipped. Nothing here fails: too few
/// observations or a zero denominator leave the affected figures `None`,
/// and anything derived from an undefined figure is undefined as well.
/// `beta` and `alpha` are left unset; see [`AssetMetrics::with_benchmark`].
pub fn asset_metrics(returns: &ReturnSeries, config: &MetricsConfig) -> AssetMetrics {
    let daily: Vec<f64> = returns.defined().collect();
    let annual_sqrt = TRADING_DAYS.sqrt();

    let mean_daily_return = mean(&daily);
    let daily_volatility = sample_std(&daily);
    let annualized_return = mean_daily_return.map(|m| m * TRADING_DAYS);
    let annualized_volatility = daily_volatility.map(|v| v * annual_sqrt);

    let excess_annual = annualized_return.map(|r| r - config.risk_free_rate);
    let excess_daily = mean_daily_return.map(|m| m - config.risk_free_rate / TRADING_DAYS);

    let downside: Vec<f64> = daily.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_deviation = sample_std(&downside).map(|s| s * annual_sqrt);

    AssetMetrics {
        observations: daily.len(),
        mean_daily_return,
        daily_volatility,
        annualized_return,
        annualized_volatility,
        sharpe: ratio(excess_annual, annualized_volatility),
        daily_sharpe: ratio(excess_daily, daily_volatility),
        downside_deviation,
        sortino: ratio(excess_annual, downside_deviation),
        beta: None,
        alpha: None,
    }
}
