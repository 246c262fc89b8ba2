use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from the file; omitted sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub monte_carlo: MonteCarloSettings,
    pub data: DataSettings,
}

/// Parameters for the return and risk analysis of a batch of assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// The amount invested in each asset for the cumulative value projection.
    pub principal: Decimal,
    /// Annual risk-free rate subtracted from returns in the Sharpe and Sortino ratios.
    /// 0.02 corresponds to 2%.
    pub risk_free_rate: f64,
    /// Benchmark symbol used for beta and alpha. `None` disables both.
    pub benchmark: Option<String>,
    /// Minimum number of assets that must be analyzed successfully for a batch to be reported.
    pub min_assets: usize,
}

/// Parameters for the Monte Carlo price projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSettings {
    pub enabled: bool,
    /// Number of independent trajectories per asset.
    pub paths: usize,
    /// Length of every trajectory in trading days.
    pub horizon_days: usize,
    /// Fixed seed for reproducible runs. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

/// Where the file-backed price history provider reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub data_dir: PathBuf,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            principal: dec!(1000),
            risk_free_rate: 0.0,
            benchmark: Some("^GSPC".to_string()),
            min_assets: 2,
        }
    }
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            paths: 200,
            horizon_days: 252,
            seed: None,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

pub const MAX_PATHS: usize = 100_000;
pub const MAX_HORIZON_DAYS: usize = 2_520;

impl Config {
    /// Checks the cross-field rules that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.monte_carlo.validate()
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.principal <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "analysis.principal must be greater than 0".to_string(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid(
                "analysis.risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.min_assets == 0 {
            return Err(ConfigError::Invalid(
                "analysis.min_assets must be at least 1".to_string(),
            ));
        }
        if matches!(&self.benchmark, Some(symbol) if symbol.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "analysis.benchmark must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl MonteCarloSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PATHS).contains(&self.paths) {
            return Err(ConfigError::Invalid(format!(
                "monte_carlo.paths must be between 1 and {MAX_PATHS}"
            )));
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(ConfigError::Invalid(format!(
                "monte_carlo.horizon_days must be between 1 and {MAX_HORIZON_DAYS}"
            )));
        }
        Ok(())
    }
}
