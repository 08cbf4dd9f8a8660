use crate::chain::OptionType;
use crate::errors::EngineResult;
use crate::models::{intrinsic, PricingInputs, MIN_SIGMA_SQRT_T};

/// Cox-Ross-Rubinstein binomial lattice for American options.
///
/// u = e^(sigma sqrt(dt)), d = 1/u, p = (e^(r dt) - d) / (u - d)
///
/// Backward induction rolls a single value buffer in place, taking
/// max(continuation, exercise) at every interior node. The early-exercise
/// comparison is what separates the American price from the European one.
/// O(steps^2) time, O(steps) space.
pub fn price(inputs: &PricingInputs, option_type: OptionType) -> EngineResult<f64> {
    inputs.validate()?;

    if inputs.ttm_years <= 0.0 {
        return Ok(intrinsic(option_type, inputs.spot, inputs.strike));
    }
    if inputs.sigma_sqrt_t < MIN_SIGMA_SQRT_T {
        // Deterministic underlying: same degenerate value as the closed form.
        let pv_strike = inputs.strike * (-inputs.rate * inputs.ttm_years).exp();
        return Ok(intrinsic(option_type, inputs.spot, pv_strike));
    }

    let steps = inputs.steps;
    let dt = inputs.ttm_years / steps as f64;
    let u = (inputs.sigma * dt.sqrt()).exp();
    let d = 1.0 / u;
    let disc = (-inputs.rate * dt).exp();
    let p = ((inputs.rate * dt).exp() - d) / (u - d);
    let one_minus_p = 1.0 - p;

    // Terminal payoffs, lowest node first. The multiplicative recurrence
    // spot * d^steps * (u/d)^j avoids a powf per node.
    let ratio = u / d;
    let mut values = Vec::with_capacity(steps + 1);
    let mut st = inputs.spot * d.powi(steps as i32);
    for _ in 0..=steps {
        values.push(intrinsic(option_type, st, inputs.strike));
        st *= ratio;
    }

    // Rollback. base tracks the lowest node price spot * d^i per level.
    let mut base = inputs.spot * d.powi(steps as i32 - 1);
    for i in (0..steps).rev() {
        let mut st = base;
        for j in 0..=i {
            let continuation = disc * (p * values[j + 1] + one_minus_p * values[j]);
            let exercise = intrinsic(option_type, st, inputs.strike);
            values[j] = continuation.max(exercise);
            st *= ratio;
        }
        base *= u;
    }

    Ok(values[0])
}
