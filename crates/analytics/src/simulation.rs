use crate::error::AnalyticsError;
use crate::report::SimulationPaths;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Shape of a Monte Carlo projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloParams {
    pub paths: usize,
    pub horizon_days: usize,
}

/// Projects future prices as a random walk with constant drift and volatility.
///
/// Every day of every path draws an independent daily return from
/// `Normal(mu, sigma)`; a path is `last_price` times the running product of
/// `1 + draw`. Draws are independent across assets as well, so co-movement
/// between assets is not modelled, and there is no mean reversion.
///
/// The random source is supplied by the caller; a seeded generator gives
/// reproducible paths.
pub fn monte_carlo<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    last_price: f64,
    mu: f64,
    sigma: f64,
    rng: &mut R,
) -> Result<SimulationPaths, AnalyticsError> {
    if params.paths == 0 || params.horizon_days == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "paths and horizon_days must both be at least 1".to_string(),
        ));
    }
    if !last_price.is_finite() || last_price <= 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "last price must be a positive number, got {last_price}"
        )));
    }
    if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "cannot draw returns from Normal(mu = {mu}, sigma = {sigma})"
        )));
    }
    let normal =
        Normal::new(mu, sigma).map_err(|e| AnalyticsError::InvalidParameter(e.to_string()))?;

    let paths = (0..params.paths)
        .map(|_| {
            let mut price = last_price;
            (0..params.horizon_days)
                .map(|_| {
                    price *= 1.0 + normal.sample(rng);
                    price
                })
                .collect()
        })
        .collect();

    Ok(SimulationPaths {
        last_price,
        mu,
        sigma,
        horizon_days: params.horizon_days,
        paths,
    })
}
