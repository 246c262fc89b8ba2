use crate::metrics::TRADING_DAYS;
use crate::report::{BetaAlpha, CorrelationMatrix};
use crate::stats::{mean, pearson, population_covariance, ratio};
use chrono::{DateTime, Utc};
use core_types::ReturnSeries;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Pairs the defined observations that two series share by timestamp.
fn align(a: &ReturnSeries, b: &ReturnSeries) -> (Vec<f64>, Vec<f64>) {
    let mut left = a.defined_points().peekable();
    let mut right = b.defined_points().peekable();
    let (mut xs, mut ys) = (Vec::new(), Vec::new());

    // Both series are strictly increasing, so a merge join finds the intersection.
    while let (Some((ta, va)), Some((tb, vb))) = (left.peek().copied(), right.peek().copied()) {
        match ta.cmp(&tb) {
            Ordering::Less => {
                left.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Equal => {
                xs.push(va);
                ys.push(vb);
                left.next();
                right.next();
            }
        }
    }
    (xs, ys)
}

/// Beta and alpha of an asset against a benchmark.
///
/// Only timestamps where both series have a defined return are used. Beta is
/// the population covariance over the benchmark's population variance; alpha
/// is the annualized asset mean minus beta times the annualized benchmark mean.
/// Fewer than two aligned points, or a flat benchmark, leave both undefined.
pub fn beta_alpha(asset: &ReturnSeries, benchmark: &ReturnSeries) -> BetaAlpha {
    let (xs, ys) = align(asset, benchmark);
    let observations = xs.len();
    if observations < 2 {
        return BetaAlpha {
            beta: None,
            alpha: None,
            observations,
        };
    }

    let beta = ratio(population_covariance(&xs, &ys), population_covariance(&ys, &ys));
    let alpha = match (beta, mean(&xs), mean(&ys)) {
        (Some(b), Some(mx), Some(my)) => {
            Some(mx * TRADING_DAYS - b * (my * TRADING_DAYS)).filter(|a| a.is_finite())
        }
        _ => None,
    };

    BetaAlpha {
        beta,
        alpha,
        observations,
    }
}

/// Pearson correlation matrix of several return series.
///
/// Rows are aligned by timestamp and only complete rows, where every series
/// has a defined return, participate. The diagonal is exactly 1; an
/// off-diagonal entry is undefined with fewer than two complete rows or when
/// either series is flat over them.
pub fn correlation_matrix(series: &[(String, &ReturnSeries)]) -> CorrelationMatrix {
    let width = series.len();
    let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
    for (column, (_, returns)) in series.iter().enumerate() {
        for (timestamp, value) in returns.defined_points() {
            rows.entry(timestamp).or_insert_with(|| vec![None; width])[column] = Some(value);
        }
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];
    let mut observations = 0;
    for row in rows.values() {
        if row.iter().all(Option::is_some) {
            observations += 1;
            for (column, value) in row.iter().flatten().enumerate() {
                columns[column].push(*value);
            }
        }
    }

    let mut values = vec![vec![None; width]; width];
    for i in 0..width {
        values[i][i] = Some(1.0);
        for j in (i + 1)..width {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    tracing::debug!(assets = width, observations, "Correlation matrix computed.");
    CorrelationMatrix {
        assets: series.iter().map(|(id, _)| id.clone()).collect(),
        values,
        observations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone};
    use core_types::ReturnPoint;
    use proptest::prelude::*;

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn series(points: &[(i64, Option<f64>)]) -> ReturnSeries {
        ReturnSeries::from_points(
            points
                .iter()
                .map(|(day, value)| ReturnPoint {
                    timestamp: at(*day),
                    value: *value,
                })
                .collect(),
        )
        .unwrap()
    }

    fn dense(values: &[f64]) -> ReturnSeries {
        series(
            &values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as i64, Some(*v)))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn disjoint_timestamps_leave_beta_and_alpha_undefined() {
        let asset = series(&[(1, Some(0.01))]);
        let benchmark = series(&[(2, Some(0.02))]);

        let result = beta_alpha(&asset, &benchmark);
        assert_eq!(result.observations, 0);
        assert_eq!(result.beta, None);
        assert_eq!(result.alpha, None);
    }

    #[test]
    fn beta_of_scaled_benchmark() {
        let bench = [0.01, -0.02, 0.015, 0.005, -0.01];
        let asset: Vec<f64> = bench.iter().map(|r| 2.0 * r + 0.001).collect();

        let result = beta_alpha(&dense(&asset), &dense(&bench));
        assert_eq!(result.observations, 5);
        assert_abs_diff_eq!(result.beta.unwrap(), 2.0, epsilon = 1e-9);

        let expected_alpha = mean(&asset).unwrap() * 252.0 - 2.0 * mean(&bench).unwrap() * 252.0;
        assert_abs_diff_eq!(result.alpha.unwrap(), expected_alpha, epsilon = 1e-9);
        assert_abs_diff_eq!(result.alpha.unwrap(), 0.252, epsilon = 1e-9);
    }

    #[test]
    fn beta_uses_only_shared_defined_timestamps() {
        let asset = series(&[(0, None), (1, Some(0.02)), (2, Some(-0.02)), (3, Some(0.04)), (5, Some(9.0))]);
        let bench = series(&[(0, Some(0.5)), (1, Some(0.01)), (2, Some(-0.01)), (3, Some(0.02)), (4, Some(0.3))]);

        let result = beta_alpha(&asset, &bench);
        assert_eq!(result.observations, 3);
        assert_abs_diff_eq!(result.beta.unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_benchmark_leaves_beta_undefined() {
        let result = beta_alpha(&dense(&[0.01, 0.02, 0.03]), &dense(&[0.25, 0.25, 0.25]));
        assert_eq!(result.beta, None);
        assert_eq!(result.alpha, None);
    }

    #[test]
    fn correlation_drops_incomplete_rows() {
        let a = series(&[(0, Some(0.01)), (1, Some(0.02)), (2, Some(0.03)), (3, Some(0.04))]);
        let b = series(&[(0, Some(0.02)), (1, None), (2, Some(0.06)), (3, Some(0.08))]);
        let c = series(&[(0, Some(-0.01)), (1, Some(0.5)), (2, Some(-0.03)), (3, Some(-0.04))]);

        let matrix = correlation_matrix(&[
            ("A".to_string(), &a),
            ("B".to_string(), &b),
            ("C".to_string(), &c),
        ]);

        assert_eq!(matrix.observations, 3);
        assert_abs_diff_eq!(matrix.get("A", "B").unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.get("A", "C").unwrap(), -1.0, epsilon = 1e-9);
        assert_eq!(matrix.get("C", "C"), Some(1.0));
    }

    #[test]
    fn average_correlation_includes_diagonal() {
        let a = dense(&[0.01, 0.02, 0.03]);
        let b = dense(&[0.03, 0.02, 0.01]);
        let matrix = correlation_matrix(&[("A".to_string(), &a), ("B".to_string(), &b)]);

        // Entries are 1, -1, -1, 1.
        assert_abs_diff_eq!(matrix.average_correlation().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn too_few_rows_leaves_off_diagonal_undefined() {
        let a = dense(&[0.01]);
        let b = dense(&[0.02]);
        let matrix = correlation_matrix(&[("A".to_string(), &a), ("B".to_string(), &b)]);

        assert_eq!(matrix.get("A", "B"), None);
        assert_eq!(matrix.get("A", "A"), Some(1.0));
        assert_eq!(matrix.average_correlation(), None);
    }

    #[test]
    fn disjoint_dates_give_no_diversification_reading() {
        let a = series(&[(0, Some(0.01)), (1, Some(0.02)), (2, Some(0.03))]);
        let b = series(&[(10, Some(0.02)), (11, Some(-0.01)), (12, Some(0.04))]);
        let matrix = correlation_matrix(&[("A".to_string(), &a), ("B".to_string(), &b)]);

        assert_eq!(matrix.observations, 0);
        assert_eq!(matrix.values, vec![vec![Some(1.0), None], vec![None, Some(1.0)]]);
        assert_eq!(matrix.average_correlation(), None);
        assert_eq!(matrix.diversification(), None);
    }

    #[test]
    fn single_asset_has_no_diversification_reading() {
        let a = dense(&[0.01, 0.02, 0.03]);
        let matrix = correlation_matrix(&[("A".to_string(), &a)]);

        assert_eq!(matrix.get("A", "A"), Some(1.0));
        assert_eq!(matrix.diversification(), None);
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_unit_diagonal(
            data in prop::collection::vec(prop::collection::vec(-0.1f64..0.1, 10), 1..5)
        ) {
            let owned: Vec<ReturnSeries> = data.iter().map(|v| dense(v)).collect();
            let input: Vec<(String, &ReturnSeries)> = owned
                .iter()
                .enumerate()
                .map(|(i, s)| (format!("A{i}"), s))
                .collect();

            let matrix = correlation_matrix(&input);
            for i in 0..owned.len() {
                prop_assert_eq!(matrix.values[i][i], Some(1.0));
                for j in 0..owned.len() {
                    prop_assert_eq!(matrix.values[i][j], matrix.values[j][i]);
                    if let Some(r) = matrix.values[i][j] {
                        prop_assert!((-1.0..=1.0).contains(&r));
                    }
                }
            }
        }
    }
}
