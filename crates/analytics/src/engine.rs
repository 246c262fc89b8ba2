use crate::cross::{beta_alpha, correlation_matrix};
use crate::error::AnalyticsError;
use crate::metrics::{MetricsConfig, asset_metrics};
use crate::portfolio::{cumulative_value, normalize_index};
use crate::prepare::prepare_returns;
use crate::report::{BatchReport, BatchSummary, PortfolioProjection};
use crate::simulation::{MonteCarloParams, monte_carlo};
use configuration::{AnalysisSettings, MonteCarloSettings};
use core_types::{PriceSeries, PriceTable, ReturnSeries};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// An asset whose price table made it through series preparation.
struct PreparedAsset {
    symbol: String,
    prices: PriceSeries,
    returns: ReturnSeries,
}

/// A stateless orchestrator that runs the full analysis over a batch of assets.
///
/// Each symbol is prepared independently; a symbol that fails is recorded in
/// the report and the rest of the batch carries on.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    analysis: AnalysisSettings,
    monte_carlo: MonteCarloSettings,
}

impl AnalyticsEngine {
    pub fn new(analysis: AnalysisSettings, monte_carlo: MonteCarloSettings) -> Self {
        Self {
            analysis,
            monte_carlo,
        }
    }

    fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            risk_free_rate: self.analysis.risk_free_rate,
        }
    }

    /// The main entry point for analyzing a batch.
    ///
    /// # Arguments
    ///
    /// * `tables` - Raw price tables, one per symbol, in display order.
    /// * `benchmark` - The benchmark's price table, if beta and alpha are wanted.
    ///
    /// # Returns
    ///
    /// The `BatchReport`, or `NotEnoughAssets` when fewer than the configured
    /// minimum of symbols could be analyzed.
    #[tracing::instrument(name = "analyze_batch", skip_all, fields(symbols = tables.len()))]
    pub fn analyze(
        &self,
        tables: &[PriceTable],
        benchmark: Option<&PriceTable>,
    ) -> Result<BatchReport, AnalyticsError> {
        let mut report = BatchReport {
            assets: Vec::new(),
            metrics: BTreeMap::new(),
            normalized: BTreeMap::new(),
            projection: PortfolioProjection::default(),
            correlation: correlation_matrix(&[]),
            average_correlation: None,
            diversification: None,
            simulations: BTreeMap::new(),
            summary: BatchSummary::default(),
            failures: Vec::new(),
            benchmark_failure: None,
        };

        let prepared = self.prepare_all(tables, &mut report);
        if prepared.len() < self.analysis.min_assets {
            return Err(AnalyticsError::NotEnoughAssets {
                required: self.analysis.min_assets,
                available: prepared.len(),
                failed: report.failures.iter().map(|f| f.symbol.clone()).collect(),
            });
        }

        let benchmark_returns = benchmark.and_then(|table| match prepare_returns(table) {
            Ok((_, returns)) => Some(returns),
            Err(e) => {
                tracing::warn!(
                    benchmark = %table.symbol,
                    error = %e,
                    "Benchmark unavailable, beta and alpha will not be computed."
                );
                report.record_benchmark_failure(&table.symbol, e);
                None
            }
        });

        let principal = self.analysis.principal.to_f64().ok_or_else(|| {
            AnalyticsError::InvalidParameter(format!(
                "principal {} is not representable",
                self.analysis.principal
            ))
        })?;
        report.projection.principal = principal;

        let config = self.metrics_config();
        for asset in &prepared {
            let mut metrics = asset_metrics(&asset.returns, &config);
            if let Some(bench) = &benchmark_returns {
                metrics = metrics.with_benchmark(beta_alpha(&asset.returns, bench));
            }
            tracing::debug!(symbol = %asset.symbol, ?metrics, "Asset metrics computed.");

            report.assets.push(asset.symbol.clone());
            report.metrics.insert(asset.symbol.clone(), metrics);
            report
                .normalized
                .insert(asset.symbol.clone(), normalize_index(&asset.prices)?);
            report.projection.values.insert(
                asset.symbol.clone(),
                cumulative_value(&asset.returns, principal)?,
            );
        }

        let columns: Vec<(String, &ReturnSeries)> = prepared
            .iter()
            .map(|a| (a.symbol.clone(), &a.returns))
            .collect();
        report.correlation = correlation_matrix(&columns);
        report.average_correlation = report.correlation.average_correlation();
        report.diversification = report.correlation.diversification();
        report.summary = BatchSummary::from_metrics(&report.metrics);

        if self.monte_carlo.enabled {
            self.simulate_all(&prepared, &mut report)?;
        }

        tracing::info!(
            analyzed = report.assets.len(),
            failed = report.failures.len(),
            "Batch analysis complete."
        );
        Ok(report)
    }

    /// Runs series preparation for every table, isolating failures.
    fn prepare_all(&self, tables: &[PriceTable], report: &mut BatchReport) -> Vec<PreparedAsset> {
        let mut prepared: Vec<PreparedAsset> = Vec::with_capacity(tables.len());
        for table in tables {
            if prepared.iter().any(|a| a.symbol == table.symbol) {
                tracing::warn!(symbol = %table.symbol, "Duplicate symbol skipped.");
                report.record_failure(&table.symbol, "duplicate symbol in batch");
                continue;
            }
            match prepare_returns(table) {
                Ok((prices, returns)) => prepared.push(PreparedAsset {
                    symbol: table.symbol.clone(),
                    prices,
                    returns,
                }),
                Err(e) => {
                    tracing::warn!(symbol = %table.symbol, error = %e, "Symbol excluded from analysis.");
                    report.record_failure(&table.symbol, e);
                }
            }
        }
        prepared
    }

    /// Projects every asset with its own random stream.
    ///
    /// With a configured seed, asset `i` (in input order) uses `seed + i`, so
    /// a run is reproducible and assets do not share draws.
    fn simulate_all(
        &self,
        prepared: &[PreparedAsset],
        report: &mut BatchReport,
    ) -> Result<(), AnalyticsError> {
        let params = MonteCarloParams {
            paths: self.monte_carlo.paths,
            horizon_days: self.monte_carlo.horizon_days,
        };

        for (position, asset) in prepared.iter().enumerate() {
            let metrics = &report.metrics[&asset.symbol];
            let (Some(mu), Some(sigma), Some(last)) = (
                metrics.mean_daily_return,
                metrics.daily_volatility,
                asset.prices.last(),
            ) else {
                tracing::warn!(
                    symbol = %asset.symbol,
                    "Not enough history to estimate drift and volatility, simulation skipped."
                );
                continue;
            };

            let mut rng = match self.monte_carlo.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(position as u64)),
                None => StdRng::from_entropy(),
            };
            let paths = monte_carlo(&params, last.price, mu, sigma, &mut rng)?;
            report.simulations.insert(asset.symbol.clone(), paths);
        }
        Ok(())
    }
}
