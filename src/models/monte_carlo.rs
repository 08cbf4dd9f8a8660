use crate::chain::OptionType;
use crate::errors::{EngineError, EngineResult};
use crate::models::{intrinsic, PricingInputs};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Trading days per year, used by the daily path generator.
const TRADING_DAYS: f64 = 252.0;

/// Terminal-price percentiles of the simulated distribution.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Outcome statistics from one terminal-price simulation. Regenerated per
/// request; deterministic for a fixed seed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimulationResult {
    /// Terminal prices sorted ascending, length equals the trial count.
    pub terminal_prices: Vec<f64>,
    pub percentiles: Percentiles,
    /// Fraction of paths expiring with positive payoff.
    pub probability_itm: f64,
    /// Mean payoff discounted at the risk-free rate over the horizon.
    pub expected_payoff: f64,
    /// Undiscounted payoff standard deviation.
    pub payoff_std: f64,
}

/// Simulates terminal prices under geometric Brownian motion and derives
/// payoff statistics for one contract.
///
/// S_T = S exp((r - sigma^2/2) T + sigma sqrt(T) Z),  Z ~ N(0, 1)
///
/// The seed is an explicit part of the contract: identical inputs and seed
/// reproduce the identical sample.
pub fn simulate(
    inputs: &PricingInputs,
    option_type: OptionType,
    trials: usize,
    seed: u64,
) -> EngineResult<SimulationResult> {
    if trials < 1 {
        return Err(EngineError::NumericalInstability(
            "simulation needs at least 1 trial".into(),
        ));
    }
    inputs.validate()?;

    let mut terminal: Vec<f64> = if inputs.ttm_years <= 0.0 {
        // At expiry the distribution collapses to the spot.
        vec![inputs.spot; trials]
    } else {
        let drift = (inputs.rate - 0.5 * inputs.sigma * inputs.sigma) * inputs.ttm_years;
        let mut rng = StdRng::seed_from_u64(seed);
        (0..trials)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut rng);
                inputs.spot * (drift + inputs.sigma_sqrt_t * z).exp()
            })
            .collect()
    };

    let n = trials as f64;
    let mut payoff_sum = 0.0;
    let mut payoff_sq_sum = 0.0;
    let mut itm = 0usize;
    for &st in &terminal {
        let payoff = intrinsic(option_type, st, inputs.strike);
        payoff_sum += payoff;
        payoff_sq_sum += payoff * payoff;
        if payoff > 0.0 {
            itm += 1;
        }
    }
    let mean_payoff = payoff_sum / n;
    let variance = (payoff_sq_sum / n - mean_payoff * mean_payoff).max(0.0);
    let discount = (-inputs.rate * inputs.ttm_years).exp();

    terminal.sort_by(|a, b| a.total_cmp(b));
    let percentiles = Percentiles {
        p10: percentile(&terminal, 10.0),
        p25: percentile(&terminal, 25.0),
        p50: percentile(&terminal, 50.0),
        p75: percentile(&terminal, 75.0),
        p90: percentile(&terminal, 90.0),
    };

    Ok(SimulationResult {
        terminal_prices: terminal,
        percentiles,
        probability_itm: itm as f64 / n,
        expected_payoff: discount * mean_payoff,
        payoff_std: variance.sqrt(),
    })
}

/// Full daily GBM price paths for the presentation layer's fan charts.
/// Returns `trials` rows of `days` prices each, starting at the spot.
pub fn price_paths(
    inputs: &PricingInputs,
    days: usize,
    trials: usize,
    seed: u64,
) -> EngineResult<Vec<Vec<f64>>> {
    if trials < 1 {
        return Err(EngineError::NumericalInstability(
            "simulation needs at least 1 trial".into(),
        ));
    }
    if days < 1 {
        return Err(EngineError::InvalidInput(
            "path simulation needs at least 1 day".into(),
        ));
    }
    inputs.validate()?;

    let dt = 1.0 / TRADING_DAYS;
    let drift = (inputs.rate - 0.5 * inputs.sigma * inputs.sigma) * dt;
    let diffusion = inputs.sigma * dt.sqrt();
    let mut rng = StdRng::seed_from_u64(seed);

    let paths = (0..trials)
        .map(|_| {
            let mut path = Vec::with_capacity(days);
            let mut price = inputs.spot;
            path.push(price);
            for _ in 1..days {
                let z: f64 = StandardNormal.sample(&mut rng);
                price *= (drift + diffusion * z).exp();
                path.push(price);
            }
            path
        })
        .collect();

    Ok(paths)
}

/// Linear-interpolated percentile of an ascending-sorted sample.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
