use crate::chain::{OptionContract, OptionType, PriceForecast};
use crate::config::EngineConfig;
use crate::models::monte_carlo::SimulationResult;
use crate::risk::sizing::{self, SizingParams};
use crate::valuation::{Valuation, ValuationResult};

/// Trade action for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    BuyCall,
    BuyPut,
    SellCall,
    SellPut,
    Hold,
}

impl Action {
    #[inline]
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::BuyCall | Self::BuyPut)
    }

    #[inline]
    pub fn is_sell(&self) -> bool {
        matches!(self, Self::SellCall | Self::SellPut)
    }

    #[inline]
    pub fn is_hold(&self) -> bool {
        matches!(self, Self::Hold)
    }

    /// True when the position profits from the underlying rising.
    #[inline]
    pub fn wants_up(&self) -> Option<bool> {
        match self {
            Self::BuyCall | Self::SellPut => Some(true),
            Self::BuyPut | Self::SellCall => Some(false),
            Self::Hold => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BuyCall => write!(f, "BUY_CALL"),
            Self::BuyPut => write!(f, "BUY_PUT"),
            Self::SellCall => write!(f, "SELL_CALL"),
            Self::SellPut => write!(f, "SELL_PUT"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Why a contract ended at HOLD without being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    ThinVolume,
    ThinOpenInterest,
    MissingFairValue,
    MissingProbability,
}

/// Terminal state of the per-contract evaluation machine:
/// Evaluating -> FilteredOut | Scored -> Finalized.
/// FilteredOut is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalState {
    FilteredOut,
    Finalized,
}

/// Final recommendation record for the presentation layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: Confidence,
    pub valuation: Valuation,
    pub deviation_pct: f64,
    pub probability_itm: f64,
    /// Discounted expected payoff per share, from the simulation.
    pub expected_payoff: f64,
    pub position_size: u32,
    /// Market-price cost of the sized position.
    pub total_cost: f64,
    pub state: EvalState,
    pub hold_reason: Option<HoldReason>,
}

/// Runs the per-contract decision machine.
///
/// Decision table, in order:
/// 1. Missing upstream values (NaN fair value or probability) -> HOLD.
///    A conservative default beats an undefined trade signal.
/// 2. Liquidity gate: thin volume or open interest -> FilteredOut,
///    surfaced as HOLD regardless of how attractive the valuation looks.
/// 3. UNDERVALUED and P(ITM) above the buy floor -> BUY, unless a
///    confident ML forecast points the other way.
///    OVERVALUED and P(ITM) below the sell ceiling -> SELL.
///    Anything else -> HOLD.
///
/// Confidence counts two conditions: P(ITM) beyond the high-confidence
/// cutoff (mirrored for sells) and ample liquidity. Both HIGH, one
/// MEDIUM, none LOW. A disagreeing forecast caps confidence at MEDIUM.
pub fn evaluate(
    config: &EngineConfig,
    contract: &OptionContract,
    spot: f64,
    valuation: ValuationResult,
    sim: &SimulationResult,
    forecast: &PriceForecast,
) -> Recommendation {
    let prob = sim.probability_itm;

    // ── 1. Degraded upstream values ──
    if !valuation.deviation_pct.is_finite() {
        return hold(valuation, sim, EvalState::Finalized, HoldReason::MissingFairValue);
    }
    if !prob.is_finite() {
        return hold(valuation, sim, EvalState::Finalized, HoldReason::MissingProbability);
    }

    // ── 2. Liquidity gate ──
    if contract.volume < config.min_volume {
        tracing::debug!(
            option_type = %contract.option_type,
            strike = contract.strike,
            volume = contract.volume,
            "filtered out: thin volume"
        );
        return hold(valuation, sim, EvalState::FilteredOut, HoldReason::ThinVolume);
    }
    if contract.open_interest < config.min_open_interest {
        tracing::debug!(
            option_type = %contract.option_type,
            strike = contract.strike,
            open_interest = contract.open_interest,
            "filtered out: thin open interest"
        );
        return hold(valuation, sim, EvalState::FilteredOut, HoldReason::ThinOpenInterest);
    }

    // ── 3. Score ──
    let action = score_action(config, contract.option_type, valuation.label, prob, spot, forecast);
    let confidence = score_confidence(config, contract, action, prob, spot, forecast);

    let position_size = if action.is_hold() {
        0
    } else {
        sizing::position_size(&SizingParams {
            portfolio_value: config.portfolio_value,
            risk_fraction: config.risk_fraction,
            option_price: contract.mid_price(),
            contract_multiplier: config.contract_multiplier,
            open_interest: contract.open_interest,
            max_oi_fraction: config.max_oi_fraction,
        })
    };

    Recommendation {
        action,
        confidence,
        valuation: valuation.label,
        deviation_pct: valuation.deviation_pct,
        probability_itm: prob,
        expected_payoff: sim.expected_payoff,
        position_size,
        total_cost: contract.mid_price() * config.contract_multiplier * position_size as f64,
        state: EvalState::Finalized,
        hold_reason: None,
    }
}

fn score_action(
    config: &EngineConfig,
    option_type: OptionType,
    label: Valuation,
    prob: f64,
    spot: f64,
    forecast: &PriceForecast,
) -> Action {
    match label {
        Valuation::Undervalued if prob > config.buy_prob_floor => {
            let wants_up = option_type == OptionType::Call;
            // The forecast alone never creates a signal, but a confident
            // contradiction can veto one.
            let vetoed = forecast.confidence >= config.forecast_veto_confidence
                && forecast.is_bullish(spot) != wants_up;
            if vetoed {
                Action::Hold
            } else if wants_up {
                Action::BuyCall
            } else {
                Action::BuyPut
            }
        }
        Valuation::Overvalued if prob < config.sell_prob_ceiling => match option_type {
            OptionType::Call => Action::SellCall,
            OptionType::Put => Action::SellPut,
        },
        _ => Action::Hold,
    }
}

fn score_confidence(
    config: &EngineConfig,
    contract: &OptionContract,
    action: Action,
    prob: f64,
    spot: f64,
    forecast: &PriceForecast,
) -> Confidence {
    let Some(wants_up) = action.wants_up() else {
        return Confidence::Low;
    };

    let prob_strong = if action.is_buy() {
        prob > config.high_confidence_prob
    } else {
        prob < 1.0 - config.high_confidence_prob
    };
    let ample = contract.volume >= config.ample_volume
        && contract.open_interest >= config.ample_open_interest;

    let mut confidence = match (prob_strong, ample) {
        (true, true) => Confidence::High,
        (true, false) | (false, true) => Confidence::Medium,
        (false, false) => Confidence::Low,
    };

    if forecast.is_bullish(spot) != wants_up && confidence == Confidence::High {
        confidence = Confidence::Medium;
    }
    confidence
}

fn hold(
    valuation: ValuationResult,
    sim: &SimulationResult,
    state: EvalState,
    reason: HoldReason,
) -> Recommendation {
    Recommendation {
        action: Action::Hold,
        confidence: Confidence::Low,
        valuation: valuation.label,
        deviation_pct: valuation.deviation_pct,
        probability_itm: sim.probability_itm,
        expected_payoff: sim.expected_payoff,
        position_size: 0,
        total_cost: 0.0,
        state,
        hold_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::monte_carlo::{Percentiles, SimulationResult};
    use crate::valuation;
    use chrono::NaiveDate;

    fn contract(volume: u64, open_interest: u64) -> OptionContract {
        OptionContract {
            option_type: OptionType::Call,
            strike: 100.0,
            expiration: NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            bid: 3.90,
            ask: 4.10,
            volume,
            open_interest,
        }
    }

    fn sim(probability_itm: f64) -> SimulationResult {
        SimulationResult {
            terminal_prices: vec![100.0],
            percentiles: Percentiles { p10: 92.0, p25: 96.0, p50: 100.0, p75: 105.0, p90: 110.0 },
            probability_itm,
            expected_payoff: 4.5,
            payoff_std: 6.0,
        }
    }

    fn undervalued() -> ValuationResult {
        valuation::classify(4.0, 4.62, 10.0)
    }

    fn bullish() -> PriceForecast {
        PriceForecast { predicted_price: 106.0, confidence: 0.7 }
    }

    #[test]
    fn test_undervalued_liquid_call_is_bought() {
        let cfg = EngineConfig::default();
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.53), &bullish());
        assert_eq!(rec.action, Action::BuyCall);
        assert_eq!(rec.state, EvalState::Finalized);
        assert!(rec.position_size >= 1, "buy must be sized");
        assert!(rec.total_cost > 0.0);
        // prob 0.53 below the 0.55 cutoff, liquidity ample -> MEDIUM
        assert_eq!(rec.confidence, Confidence::Medium);
    }

    #[test]
    fn test_high_confidence_needs_prob_and_liquidity() {
        let cfg = EngineConfig::default();
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.62), &bullish());
        assert_eq!(rec.action, Action::BuyCall);
        assert_eq!(rec.confidence, Confidence::High);

        let thin = evaluate(&cfg, &contract(50, 200), 100.0, undervalued(), &sim(0.62), &bullish());
        assert_eq!(thin.confidence, Confidence::Medium, "one condition -> MEDIUM");
    }

    #[test]
    fn test_liquidity_filter_forces_hold() {
        let cfg = EngineConfig::default();
        // Strongly undervalued, strongly ITM -- still filtered.
        let rec = evaluate(&cfg, &contract(5, 1_000), 100.0, undervalued(), &sim(0.80), &bullish());
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.state, EvalState::FilteredOut);
        assert_eq!(rec.hold_reason, Some(HoldReason::ThinVolume));
        assert_eq!(rec.position_size, 0);

        let rec = evaluate(&cfg, &contract(500, 10), 100.0, undervalued(), &sim(0.80), &bullish());
        assert_eq!(rec.hold_reason, Some(HoldReason::ThinOpenInterest));
    }

    #[test]
    fn test_overvalued_low_prob_is_sold() {
        let cfg = EngineConfig::default();
        let rich = valuation::classify(6.0, 4.62, 10.0);
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, rich, &sim(0.30), &bullish());
        assert_eq!(rec.action, Action::SellCall);
        // prob 0.30 < 0.45 mirror cutoff and ample liquidity -> HIGH, but the
        // bullish forecast disagrees with a short call -> capped MEDIUM
        assert_eq!(rec.confidence, Confidence::Medium);
    }

    #[test]
    fn test_fair_value_holds() {
        let cfg = EngineConfig::default();
        let fair = valuation::classify(4.6, 4.62, 10.0);
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, fair, &sim(0.53), &bullish());
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.state, EvalState::Finalized, "scored hold is not a filter rejection");
        assert_eq!(rec.hold_reason, None);
    }

    #[test]
    fn test_confident_contrary_forecast_vetoes_buy() {
        let cfg = EngineConfig::default();
        let bearish = PriceForecast { predicted_price: 93.0, confidence: 0.9 };
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.53), &bearish);
        assert_eq!(rec.action, Action::Hold, "confident bearish forecast vetoes the call buy");

        let unsure_bearish = PriceForecast { predicted_price: 93.0, confidence: 0.2 };
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.53), &unsure_bearish);
        assert_eq!(rec.action, Action::BuyCall, "low-confidence forecast cannot veto");
    }

    #[test]
    fn test_contrary_forecast_caps_confidence() {
        let cfg = EngineConfig::default();
        let unsure_bearish = PriceForecast { predicted_price: 93.0, confidence: 0.2 };
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.62), &unsure_bearish);
        assert_eq!(rec.action, Action::BuyCall);
        assert_eq!(rec.confidence, Confidence::Medium, "disagreeing forecast caps HIGH at MEDIUM");
    }

    #[test]
    fn test_nan_probability_degrades_to_hold() {
        let cfg = EngineConfig::default();
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(f64::NAN), &bullish());
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.hold_reason, Some(HoldReason::MissingProbability));
    }

    #[test]
    fn test_low_probability_undervalued_holds() {
        let cfg = EngineConfig::default();
        let rec = evaluate(&cfg, &contract(500, 1_000), 100.0, undervalued(), &sim(0.30), &bullish());
        assert_eq!(rec.action, Action::Hold, "cheap but unlikely to pay off");
    }

    #[test]
    fn test_put_direction() {
        let cfg = EngineConfig::default();
        let mut c = contract(500, 1_000);
        c.option_type = OptionType::Put;
        let bearish = PriceForecast { predicted_price: 93.0, confidence: 0.9 };
        let rec = evaluate(&cfg, &c, 100.0, undervalued(), &sim(0.53), &bearish);
        assert_eq!(rec.action, Action::BuyPut, "bearish forecast supports the put buy");
    }
}
