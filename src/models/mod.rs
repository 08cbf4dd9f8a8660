pub mod binomial;
pub mod black_scholes;
pub mod monte_carlo;

use crate::chain::OptionType;
use crate::errors::{EngineError, EngineResult};

/// Volatility terms below this are treated as zero to avoid dividing by
/// a vanishing sigma*sqrt(T).
pub(crate) const MIN_SIGMA_SQRT_T: f64 = 1e-12;

/// Immutable inputs for one pricing evaluation. Common subexpressions
/// are computed once at construction and shared by every model.
#[derive(Debug, Clone, Copy)]
pub struct PricingInputs {
    pub spot: f64,
    pub strike: f64,
    pub ttm_years: f64,
    pub rate: f64,
    pub sigma: f64,
    /// Binomial lattice depth.
    pub steps: usize,
    // Precomputed
    pub ln_s_k: f64,
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
}

impl PricingInputs {
    #[inline]
    pub fn new(spot: f64, strike: f64, ttm_years: f64, rate: f64, sigma: f64, steps: usize) -> Self {
        let ln_s_k = (spot / strike).ln();
        let sqrt_t = ttm_years.max(0.0).sqrt();
        Self {
            spot,
            strike,
            ttm_years,
            rate,
            sigma,
            steps,
            ln_s_k,
            sqrt_t,
            sigma_sqrt_t: sigma * sqrt_t,
        }
    }

    /// Rejects inputs the numerical kernels cannot price. The negated
    /// comparisons also catch NaN.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.spot > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "spot must be positive, got {}",
                self.spot
            )));
        }
        if !(self.strike > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if !(self.ttm_years >= 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "time to expiry must be non-negative, got {}",
                self.ttm_years
            )));
        }
        if !(self.sigma >= 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "volatility must be non-negative, got {}",
                self.sigma
            )));
        }
        if !self.rate.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "rate must be finite, got {}",
                self.rate
            )));
        }
        if self.steps < 1 {
            return Err(EngineError::InvalidInput(
                "lattice needs at least 1 step".into(),
            ));
        }
        Ok(())
    }
}

/// Exercise value at a given underlying level.
#[inline]
pub(crate) fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// Price sensitivities in display units: theta per calendar day, vega per
/// volatility point, rho per rate point.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

/// Fair-value outputs for one contract. Never mutated after computation.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct FairValueResult {
    /// Closed-form European price.
    pub european_price: f64,
    /// Binomial lattice American price.
    pub american_price: f64,
    pub greeks: Greeks,
}
