/// Risk-bounded position sizing.
///
/// contracts = floor(portfolio * risk_fraction / (price * multiplier))
///
/// Bumped to a single contract when the portfolio covers one, and capped
/// at a fraction of open interest so the position can always be unwound.
/// Pure function.

/// Sizing parameters. Stack-allocated.
#[derive(Debug, Clone, Copy)]
pub struct SizingParams {
    pub portfolio_value: f64,
    /// Fraction of the portfolio put at risk, e.g. 0.02.
    pub risk_fraction: f64,
    /// Premium per share.
    pub option_price: f64,
    /// Shares per contract, typically 100.
    pub contract_multiplier: f64,
    pub open_interest: u64,
    /// Never hold more than this fraction of open interest.
    pub max_oi_fraction: f64,
}

/// Number of contracts to trade. Zero when the premium is degenerate or
/// the risk budget cannot cover a single contract.
#[inline]
pub fn position_size(params: &SizingParams) -> u32 {
    if !(params.option_price > 0.0) || !params.option_price.is_finite() {
        return 0;
    }

    let per_contract = params.option_price * params.contract_multiplier;
    let risk_budget = params.portfolio_value * params.risk_fraction;

    let raw = (risk_budget / per_contract).floor();
    let mut contracts = if raw.is_finite() && raw > 0.0 {
        raw.min(u32::MAX as f64) as u64
    } else {
        0
    };

    // One-contract minimum when capital allows it; the overshoot is the
    // documented rounding slack on the risk budget.
    if contracts == 0 && params.portfolio_value > per_contract {
        contracts = 1;
    }

    // Liquidity cap, never below the one-contract minimum.
    let oi_cap = ((params.open_interest as f64 * params.max_oi_fraction).floor() as u64).max(1);
    contracts.min(oi_cap) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(option_price: f64) -> SizingParams {
        SizingParams {
            portfolio_value: 10_000.0,
            risk_fraction: 0.02,
            option_price,
            contract_multiplier: 100.0,
            open_interest: 1_000,
            max_oi_fraction: 0.05,
        }
    }

    #[test]
    fn test_respects_risk_budget() {
        // budget 200, contract costs 150 -> exactly 1
        assert_eq!(position_size(&params(1.50)), 1);
        // budget 200, contract costs 40 -> 5
        assert_eq!(position_size(&params(0.40)), 5);
    }

    #[test]
    fn test_budget_bound_with_rounding_slack() {
        for price in [0.10, 0.35, 0.80, 1.25, 2.40, 5.00, 9.75] {
            let p = params(price);
            let contracts = position_size(&p) as f64;
            let spent = contracts * price * p.contract_multiplier;
            let budget = p.portfolio_value * p.risk_fraction;
            let slack = price * p.contract_multiplier;
            assert!(
                spent <= budget + slack,
                "price {price}: spent {spent} exceeds budget {budget} plus one-contract slack"
            );
        }
    }

    #[test]
    fn test_one_contract_minimum() {
        // budget 200 cannot cover a 500-dollar contract, but the portfolio can
        assert_eq!(position_size(&params(5.00)), 1);
    }

    #[test]
    fn test_zero_when_unaffordable() {
        let mut p = params(5.00);
        p.portfolio_value = 300.0;
        assert_eq!(position_size(&p), 0, "cannot afford a single contract");
    }

    #[test]
    fn test_open_interest_cap() {
        let mut p = params(0.10); // budget-driven size would be 20
        p.open_interest = 100; // cap = floor(100 * 0.05) = 5
        assert_eq!(position_size(&p), 5);
    }

    #[test]
    fn test_degenerate_price() {
        assert_eq!(position_size(&params(0.0)), 0);
        assert_eq!(position_size(&params(f64::NAN)), 0);
    }
}
