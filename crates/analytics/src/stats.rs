//! Descriptive statistics shared by the metric calculators.
//!
//! Every helper returns `None` instead of NaN or infinity, so an undefined
//! result can never leak into a report as a number.

/// Arithmetic mean. `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (denominator `n - 1`). `None` below two observations.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    finite((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Population covariance (denominator `n`) of two equally long samples.
pub(crate) fn population_covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let sum: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    finite(sum / xs.len() as f64)
}

/// Pearson correlation, clamped to [-1, 1].
/// `None` below two observations or when either sample has zero variance.
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let cov = population_covariance(xs, ys)?;
    let sx = population_covariance(xs, xs)?.sqrt();
    let sy = population_covariance(ys, ys)?.sqrt();
    ratio(Some(cov), Some(sx * sy)).map(|r| r.clamp(-1.0, 1.0))
}

/// Divides two optional quantities. A zero denominator is undefined, not infinite.
pub(crate) fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    finite(n / d)
}

/// Value at the `q`-th quantile (0..=1) of an ascending slice, linearly interpolated.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    finite(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
