//! Batch-level behaviour of the analytics engine.

use analytics::{AnalyticsEngine, AnalyticsError, Diversification, INDEX_BASE};
use approx::assert_abs_diff_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{AnalysisSettings, MonteCarloSettings};
use core_types::{PriceField, PriceTable};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal_macros::dec;

fn days(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// A table whose adjusted close compounds the given daily returns from 100.
fn table(symbol: &str, returns: &[f64]) -> PriceTable {
    let mut price = 100.0;
    let mut prices = vec![Decimal::from(100)];
    for r in returns {
        price *= 1.0 + r;
        prices.push(Decimal::from_f64(price).unwrap());
    }
    PriceTable::new(symbol)
        .with_timestamps(days(prices.len()))
        .with_column(PriceField::AdjClose, prices)
}

#[fixture]
fn market() -> PriceTable {
    table("^GSPC", &[0.01, -0.005, 0.007, -0.012, 0.004, 0.009, -0.003])
}

#[fixture]
fn engine() -> AnalyticsEngine {
    AnalyticsEngine::new(AnalysisSettings::default(), MonteCarloSettings::default())
}

#[rstest]
fn analyzes_every_valid_symbol(engine: AnalyticsEngine, market: PriceTable) {
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015, -0.02, 0.01, 0.018, -0.004]),
        table("BBB", &[-0.01, 0.004, -0.006, 0.011, -0.003, -0.008, 0.002]),
    ];

    let report = engine.analyze(&tables, Some(&market)).unwrap();

    assert_eq!(report.assets, vec!["AAA", "BBB"]);
    assert!(report.failures.is_empty());
    for symbol in ["AAA", "BBB"] {
        let metrics = &report.metrics[symbol];
        assert_eq!(metrics.observations, 7);
        assert!(metrics.sharpe.is_some());
        assert!(metrics.beta.is_some());
        assert!(metrics.alpha.is_some());

        assert_eq!(report.normalized[symbol].first().unwrap().price, INDEX_BASE);
        let values = &report.projection.values[symbol];
        assert_eq!(values.len(), 8);
        assert_eq!(values[0].value, 1000.0);
    }

    assert_eq!(report.correlation.assets, vec!["AAA", "BBB"]);
    assert_eq!(report.correlation.observations, 7);
    assert!(report.average_correlation.is_some());
    assert!(report.diversification.is_some());
    assert!(report.simulations.is_empty());
}

#[rstest]
fn a_bad_symbol_does_not_abort_the_batch(engine: AnalyticsEngine, market: PriceTable) {
    let no_columns = PriceTable::new("NOCOL").with_timestamps(days(3));
    let empty = PriceTable::new("EMPTY").with_column(PriceField::Close, vec![]);
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015]),
        no_columns,
        table("BBB", &[-0.01, 0.004, -0.006]),
        empty,
    ];

    let report = engine.analyze(&tables, Some(&market)).unwrap();

    assert_eq!(report.assets, vec!["AAA", "BBB"]);
    assert_eq!(report.failed_symbols(), vec!["NOCOL", "EMPTY"]);
    assert!(report.failures[0].reason.contains("Neither an adjusted close"));
    assert!(report.failures[1].reason.contains("No price data"));
}

#[rstest]
fn too_few_valid_symbols_is_an_error(engine: AnalyticsEngine) {
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015]),
        PriceTable::new("GONE"),
    ];

    let result = engine.analyze(&tables, None);
    assert_eq!(
        result,
        Err(AnalyticsError::NotEnoughAssets {
            required: 2,
            available: 1,
            failed: vec!["GONE".to_string()],
        })
    );
}

#[rstest]
fn single_asset_batches_are_allowed_when_configured() {
    let engine = AnalyticsEngine::new(
        AnalysisSettings {
            min_assets: 1,
            benchmark: None,
            ..Default::default()
        },
        MonteCarloSettings::default(),
    );

    let report = engine.analyze(&[table("AAA", &[0.01, 0.02])], None).unwrap();
    assert_eq!(report.correlation.values, vec![vec![Some(1.0)]]);
    assert_eq!(report.metrics["AAA"].beta, None);
}

#[rstest]
fn missing_benchmark_leaves_beta_alpha_undefined(engine: AnalyticsEngine) {
    let broken_benchmark = PriceTable::new("^GSPC");
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015]),
        table("BBB", &[-0.01, 0.004, -0.006]),
    ];

    let report = engine.analyze(&tables, Some(&broken_benchmark)).unwrap();
    assert!(report.metrics.values().all(|m| m.beta.is_none() && m.alpha.is_none()));
    assert!(report.failures.is_empty());

    let benchmark_failure = report.benchmark_failure.as_ref().unwrap();
    assert_eq!(benchmark_failure.symbol, "^GSPC");
    assert!(benchmark_failure.reason.contains("No price data"));
}

#[rstest]
fn usable_benchmark_records_no_failure(engine: AnalyticsEngine, market: PriceTable) {
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015]),
        table("BBB", &[-0.01, 0.004, -0.006]),
    ];

    let report = engine.analyze(&tables, Some(&market)).unwrap();
    assert_eq!(report.benchmark_failure, None);
}

#[rstest]
fn perfectly_correlated_assets_are_flagged(engine: AnalyticsEngine) {
    let base = [0.01, -0.02, 0.015, 0.005, -0.01];
    let doubled: Vec<f64> = base.iter().map(|r| r * 2.0).collect();
    let tables = vec![table("AAA", &base), table("BBB", &doubled)];

    let report = engine.analyze(&tables, None).unwrap();
    assert_abs_diff_eq!(report.correlation.get("AAA", "BBB").unwrap(), 1.0, epsilon = 1e-6);
    assert_eq!(report.diversification, Some(Diversification::HighlyCorrelated));
}

#[rstest]
fn seeded_simulation_is_reproducible() {
    let engine = AnalyticsEngine::new(
        AnalysisSettings::default(),
        MonteCarloSettings {
            enabled: true,
            paths: 20,
            horizon_days: 10,
            seed: Some(99),
        },
    );
    let tables = vec![
        table("AAA", &[0.02, -0.01, 0.015, -0.02]),
        table("BBB", &[-0.01, 0.004, -0.006, 0.011]),
    ];

    let first = engine.analyze(&tables, None).unwrap();
    let second = engine.analyze(&tables, None).unwrap();

    assert_eq!(first.simulations, second.simulations);
    let aaa = &first.simulations["AAA"];
    assert_eq!(aaa.paths.len(), 20);
    assert!(aaa.paths.iter().all(|p| p.len() == 10));
    let last_close = tables[0].adj_close.as_ref().unwrap().last().unwrap().to_f64().unwrap();
    assert_eq!(aaa.last_price, last_close);
    assert_ne!(first.simulations["AAA"].paths, first.simulations["BBB"].paths);
}

#[rstest]
fn principal_comes_from_settings() {
    let engine = AnalyticsEngine::new(
        AnalysisSettings {
            principal: dec!(2500.50),
            ..Default::default()
        },
        MonteCarloSettings::default(),
    );
    let tables = vec![table("AAA", &[0.1]), table("BBB", &[-0.1])];

    let report = engine.analyze(&tables, None).unwrap();
    assert_eq!(report.projection.principal, 2500.5);
    assert_abs_diff_eq!(report.projection.values["AAA"][1].value, 2750.55, epsilon = 1e-6);
}
