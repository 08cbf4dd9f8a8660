use crate::models::monte_carlo::Percentiles;

/// For a normal sample the 10th-90th percentile span covers 2.563
/// standard deviations.
const P10_P90_SIGMA_SPAN: f64 = 2.563;

/// Valuation label relative to model fair value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Valuation {
    Undervalued,
    Overvalued,
    Fair,
}

impl std::fmt::Display for Valuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undervalued => write!(f, "UNDERVALUED"),
            Self::Overvalued => write!(f, "OVERVALUED"),
            Self::Fair => write!(f, "FAIR"),
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ValuationResult {
    pub label: Valuation,
    /// (market - fair) / fair, in percent. Negative means cheap.
    pub deviation_pct: f64,
}

/// Compares market price to model fair value. Non-finite or non-positive
/// inputs classify as FAIR with zero deviation; a conservative default is
/// safer than an undefined signal.
pub fn classify(market_price: f64, fair_value: f64, threshold_pct: f64) -> ValuationResult {
    if !(market_price > 0.0) || !(fair_value > 0.0) || !market_price.is_finite() || !fair_value.is_finite() {
        return ValuationResult {
            label: Valuation::Fair,
            deviation_pct: 0.0,
        };
    }

    let deviation_pct = (market_price - fair_value) / fair_value * 100.0;
    let label = if deviation_pct <= -threshold_pct {
        Valuation::Undervalued
    } else if deviation_pct >= threshold_pct {
        Valuation::Overvalued
    } else {
        Valuation::Fair
    };
    ValuationResult { label, deviation_pct }
}

/// Sharpe-like ranking signal: expected net return weighted by the
/// probability of finishing in the money, scaled by outcome dispersion.
/// Strictly a relative ordering for candidates, never a forecast of
/// realized return.
pub fn risk_adjusted_return(net_expected_return: f64, probability_itm: f64, dispersion: f64) -> f64 {
    if !(dispersion > 0.0) || !dispersion.is_finite() || !net_expected_return.is_finite() {
        return 0.0;
    }
    net_expected_return * probability_itm / dispersion
}

/// Robust dispersion estimate from the simulated percentile spread.
pub fn percentile_dispersion(p: &Percentiles) -> f64 {
    (p.p90 - p.p10) / P10_P90_SIGMA_SPAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_bands() {
        assert_eq!(classify(8.9, 10.0, 10.0).label, Valuation::Undervalued);
        assert_eq!(classify(9.0, 10.0, 10.0).label, Valuation::Undervalued, "band edge is inclusive");
        assert_eq!(classify(11.0, 10.0, 10.0).label, Valuation::Overvalued);
        assert_eq!(classify(10.5, 10.0, 10.0).label, Valuation::Fair);
        assert_eq!(classify(9.5, 10.0, 10.0).label, Valuation::Fair);
    }

    #[test]
    fn test_deviation_sign() {
        let cheap = classify(8.0, 10.0, 10.0);
        assert!((cheap.deviation_pct + 20.0).abs() < 1e-12, "cheap = -20%, got {}", cheap.deviation_pct);
        let rich = classify(12.0, 10.0, 10.0);
        assert!((rich.deviation_pct - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_classify_fair() {
        assert_eq!(classify(f64::NAN, 10.0, 10.0).label, Valuation::Fair);
        assert_eq!(classify(10.0, f64::NAN, 10.0).label, Valuation::Fair);
        assert_eq!(classify(10.0, 0.0, 10.0).label, Valuation::Fair);
        assert_eq!(classify(-1.0, 10.0, 10.0).label, Valuation::Fair);
    }

    #[test]
    fn test_risk_adjusted_return() {
        let rar = risk_adjusted_return(100.0, 0.5, 25.0);
        assert!((rar - 2.0).abs() < 1e-12);
        assert_eq!(risk_adjusted_return(100.0, 0.5, 0.0), 0.0, "zero dispersion yields no signal");
        assert_eq!(risk_adjusted_return(f64::NAN, 0.5, 25.0), 0.0);
    }

    #[test]
    fn test_percentile_dispersion() {
        let p = Percentiles { p10: 90.0, p25: 95.0, p50: 100.0, p75: 105.0, p90: 110.0 };
        let sigma = percentile_dispersion(&p);
        assert!((sigma - 20.0 / 2.563).abs() < 1e-12);
    }
}
