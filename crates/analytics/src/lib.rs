//! # FinSight Analytics Engine
//!
//! This crate turns raw price histories into return and risk figures: mean
//! and volatility, annualized return and volatility, Sharpe and Sortino,
//! beta and alpha against a benchmark, correlation across assets, and
//! portfolio aggregates (normalized index, cumulative value, Monte Carlo
//! projection).
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no global state. Every operation is a function
//!   of its inputs; the Monte Carlo projection takes its random source as an
//!   argument.
//! - **Undefined, not broken:** Too few observations or a zero denominator
//!   yield `None` for the affected figure instead of an error, NaN or infinity.
//! - **Per-symbol isolation:** The `AnalyticsEngine` records a failing symbol
//!   and carries on with the rest of the batch.
//!
//! ## Public API
//!
//! - Operations: `prepare_returns`, `asset_metrics`, `beta_alpha`,
//!   `correlation_matrix`, `normalize_index`, `cumulative_value`, `monte_carlo`.
//! - `AnalyticsEngine`: runs all of them over a batch and builds a `BatchReport`.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod cross;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod prepare;
pub mod report;
pub mod simulation;
mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use cross::{beta_alpha, correlation_matrix};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::{MetricsConfig, TRADING_DAYS, asset_metrics};
pub use portfolio::{INDEX_BASE, cumulative_value, normalize_index};
pub use prepare::{prepare_returns, select_price_series};
pub use report::{
    AssetFailure, AssetMetrics, BatchReport, BatchSummary, BetaAlpha, CorrelationMatrix,
    Diversification, Leader, PortfolioProjection, SimulationPaths, TerminalSummary, ValuePoint,
    ValueSeries,
};
pub use simulation::{MonteCarloParams, monte_carlo};
