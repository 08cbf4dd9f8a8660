use crate::chain::OptionType;
use crate::models::{intrinsic, Greeks, PricingInputs, MIN_SIGMA_SQRT_T};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Black-Scholes closed form for European options.
///
/// d1 = (ln(S/K) + (r + sigma^2/2) T) / (sigma sqrt(T))
/// d2 = d1 - sigma sqrt(T)
///
/// call = S Phi(d1) - K e^(-rT) Phi(d2)
/// put  = K e^(-rT) Phi(-d2) - S Phi(-d1)
///
/// At expiry the option is worth exactly its intrinsic value; with zero
/// volatility the forward is deterministic and the price collapses to
/// the discounted intrinsic value.
pub fn price(inputs: &PricingInputs, option_type: OptionType) -> f64 {
    if inputs.ttm_years <= 0.0 {
        return intrinsic(option_type, inputs.spot, inputs.strike);
    }
    let pv_strike = inputs.strike * (-inputs.rate * inputs.ttm_years).exp();
    if inputs.sigma_sqrt_t < MIN_SIGMA_SQRT_T {
        return intrinsic(option_type, inputs.spot, pv_strike);
    }

    let normal = Normal::standard();
    let d1 = (inputs.ln_s_k + (inputs.rate + 0.5 * inputs.sigma * inputs.sigma) * inputs.ttm_years)
        / inputs.sigma_sqrt_t;
    let d2 = d1 - inputs.sigma_sqrt_t;

    match option_type {
        OptionType::Call => inputs.spot * normal.cdf(d1) - pv_strike * normal.cdf(d2),
        OptionType::Put => pv_strike * normal.cdf(-d2) - inputs.spot * normal.cdf(-d1),
    }
}

/// Analytical Greeks, scaled to display units: theta per calendar day,
/// vega per volatility point, rho per rate point. All zero at expiry or
/// with zero volatility, where the sensitivities are undefined.
pub fn greeks(inputs: &PricingInputs, option_type: OptionType) -> Greeks {
    if inputs.ttm_years <= 0.0 || inputs.sigma_sqrt_t < MIN_SIGMA_SQRT_T {
        return Greeks::default();
    }

    let normal = Normal::standard();
    let t = inputs.ttm_years;
    let d1 = (inputs.ln_s_k + (inputs.rate + 0.5 * inputs.sigma * inputs.sigma) * t)
        / inputs.sigma_sqrt_t;
    let d2 = d1 - inputs.sigma_sqrt_t;
    let pdf_d1 = normal.pdf(d1);
    let pv_strike = inputs.strike * (-inputs.rate * t).exp();

    let (delta, theta_annual, rho) = match option_type {
        OptionType::Call => (
            normal.cdf(d1),
            -inputs.spot * pdf_d1 * inputs.sigma / (2.0 * inputs.sqrt_t)
                - inputs.rate * pv_strike * normal.cdf(d2),
            pv_strike * t * normal.cdf(d2),
        ),
        OptionType::Put => (
            normal.cdf(d1) - 1.0,
            -inputs.spot * pdf_d1 * inputs.sigma / (2.0 * inputs.sqrt_t)
                + inputs.rate * pv_strike * normal.cdf(-d2),
            -pv_strike * t * normal.cdf(-d2),
        ),
    };

    Greeks {
        delta,
        gamma: pdf_d1 / (inputs.spot * inputs.sigma_sqrt_t),
        theta: theta_annual / 365.0,
        vega: inputs.spot * pdf_d1 * inputs.sqrt_t / 100.0,
        rho: rho / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm_inputs() -> PricingInputs {
        PricingInputs::new(100.0, 100.0, 0.25, 0.05, 0.20, 200)
    }

    #[test]
    fn test_known_value() {
        let call = price(&atm_inputs(), OptionType::Call);
        assert!(
            (call - 4.615).abs() < 0.01,
            "ATM quarter-year call should be ~4.615, got {call}"
        );
    }

    #[test]
    fn test_put_call_parity() {
        let inputs = PricingInputs::new(100.0, 95.0, 0.7, 0.03, 0.25, 200);
        let call = price(&inputs, OptionType::Call);
        let put = price(&inputs, OptionType::Put);
        let forward = inputs.spot - inputs.strike * (-inputs.rate * inputs.ttm_years).exp();
        assert!(
            (call - put - forward).abs() < 1e-6,
            "parity violated: C-P={} vs S-Ke^-rT={forward}",
            call - put
        );
    }

    #[test]
    fn test_expiry_returns_intrinsic() {
        let inputs = PricingInputs::new(105.0, 100.0, 0.0, 0.05, 0.20, 200);
        assert_eq!(price(&inputs, OptionType::Call), 5.0);
        assert_eq!(price(&inputs, OptionType::Put), 0.0);
    }

    #[test]
    fn test_zero_vol_returns_discounted_intrinsic() {
        let inputs = PricingInputs::new(105.0, 100.0, 0.25, 0.05, 0.0, 200);
        let expected = 105.0 - 100.0 * (-0.05_f64 * 0.25).exp();
        let call = price(&inputs, OptionType::Call);
        assert!(
            (call - expected).abs() < 1e-12,
            "zero-vol call {call} should equal discounted intrinsic {expected}"
        );
    }

    #[test]
    fn test_greeks_signs_and_magnitudes() {
        let g_call = greeks(&atm_inputs(), OptionType::Call);
        let g_put = greeks(&atm_inputs(), OptionType::Put);

        assert!((g_call.delta - 0.569).abs() < 0.01, "call delta {}", g_call.delta);
        assert!((g_call.delta - g_put.delta - 1.0).abs() < 1e-12, "delta parity");
        assert!(g_call.gamma > 0.0);
        assert!((g_call.gamma - g_put.gamma).abs() < 1e-12, "gamma is type-free");
        assert!(g_call.theta < 0.0, "long ATM call bleeds theta");
        assert!(g_call.vega > 0.0);
        assert!(g_call.rho > 0.0 && g_put.rho < 0.0);
    }

    #[test]
    fn test_greeks_zero_at_expiry() {
        let inputs = PricingInputs::new(105.0, 100.0, 0.0, 0.05, 0.20, 200);
        let g = greeks(&inputs, OptionType::Call);
        assert_eq!(g.delta, 0.0);
        assert_eq!(g.vega, 0.0);
    }
}
