use crate::chain::{OptionContract, OptionType};
use crate::config::EngineConfig;
use crate::models::monte_carlo::SimulationResult;
use crate::strategy::Recommendation;

/// Conservative and aggressive profit targets, as multiples of entry.
const LONG_TARGET_1_MULT: f64 = 1.50;
const LONG_TARGET_2_MULT: f64 = 2.00;
/// Ceiling on the percentile-derived third target.
const LONG_TARGET_3_CAP_MULT: f64 = 3.00;
/// Short-side buy-back targets as multiples of the premium collected.
const SHORT_TARGET_1_MULT: f64 = 0.50;
const SHORT_TARGET_2_MULT: f64 = 0.25;
/// Near-worthless floor for the final short target.
const SHORT_TARGET_3_FLOOR: f64 = 0.05;
/// Premium doubling is the assignment-threat stop on shorts.
const SHORT_STOP_MULT: f64 = 2.00;
/// Limit orders sit at these fractions of the spread above the bid.
const LONG_LIMIT_SPREAD_FRACTION: f64 = 0.30;
const SHORT_LIMIT_SPREAD_FRACTION: f64 = 0.70;
/// Sell-side max entry allows this much slip above the computed entry.
const SHORT_MAX_ENTRY_SLIP: f64 = 1.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryTiming {
    EnterNow,
    EnterSoon,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Long,
    Short,
}

/// Complete entry/exit plan for one contract. For HOLD recommendations
/// the plan is computed long-side with zero size, so a reader can still
/// see what entering would look like.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TradePlan {
    pub entry_price: f64,
    pub max_entry_price: f64,
    pub order_type: OrderType,
    pub timing: EntryTiming,
    pub breakeven: f64,
    pub spread_pct: f64,
    pub profit_target_1: f64,
    pub profit_target_2: f64,
    pub profit_target_3: f64,
    pub stop_loss: f64,
    /// Signed move from entry to the stop, in percent.
    pub stop_loss_pct: f64,
    pub risk_reward_1: f64,
    pub risk_reward_2: f64,
    pub max_loss: f64,
    pub profit_1_amount: f64,
    pub profit_2_amount: f64,
    /// Max loss as a share of the portfolio, in percent.
    pub portfolio_risk_pct: f64,
    pub exit_strategy: &'static str,
}

/// Derives the trade plan from the recommendation and model outputs.
///
/// Entry: a tight spread allows a market order at the touch; a wide one
/// gets a limit inside the spread. Buys never pay more than fair value
/// plus the configured margin; sells never collect less than fair minus
/// it. Exits: fixed multiples of entry for the first two targets, the
/// simulated 75th-percentile payoff (capped) for the third, and a
/// stop-loss tier keyed by the probability bucket.
pub fn build(
    config: &EngineConfig,
    contract: &OptionContract,
    rec: &Recommendation,
    fair_value: f64,
    sim: &SimulationResult,
) -> TradePlan {
    let direction = if rec.action.is_sell() {
        Direction::Short
    } else {
        Direction::Long
    };
    let prob = rec.probability_itm;
    let size = rec.position_size as f64;
    let multiplier = config.contract_multiplier;

    let bid = contract.bid.max(0.0);
    let ask = contract.ask.max(bid);
    let spread = ask - bid;
    let mid = 0.5 * (bid + ask);
    let spread_pct = if mid > 0.0 { spread / mid * 100.0 } else { 0.0 };
    let tight = spread_pct < config.tight_spread_pct;

    let (entry_price, max_entry_price, order_type) = match direction {
        Direction::Long => {
            let (raw, order_type) = if tight {
                (ask, OrderType::Market)
            } else {
                (bid + spread * LONG_LIMIT_SPREAD_FRACTION, OrderType::Limit)
            };
            let cap = fair_value * (1.0 + config.entry_fair_margin);
            (raw.min(cap), cap, order_type)
        }
        Direction::Short => {
            let (raw, order_type) = if tight {
                (bid, OrderType::Market)
            } else {
                (bid + spread * SHORT_LIMIT_SPREAD_FRACTION, OrderType::Limit)
            };
            let floor = fair_value * (1.0 - config.entry_fair_margin);
            let entry = raw.max(floor);
            (entry, entry * SHORT_MAX_ENTRY_SLIP, order_type)
        }
    };

    let timing = if prob > config.enter_now_prob {
        EntryTiming::EnterNow
    } else if prob > config.enter_soon_prob {
        EntryTiming::EnterSoon
    } else {
        EntryTiming::Wait
    };

    let breakeven = match contract.option_type {
        OptionType::Call => contract.strike + entry_price,
        OptionType::Put => contract.strike - entry_price,
    };

    let (t1, t2, t3, stop_loss) = match direction {
        Direction::Long => {
            let t1 = entry_price * LONG_TARGET_1_MULT;
            let t2 = entry_price * LONG_TARGET_2_MULT;
            // Moon-shot target from the simulated 75th percentile, capped,
            // and clamped so the target ladder stays ordered.
            let best_case = match contract.option_type {
                OptionType::Call => (sim.percentiles.p75 - contract.strike).max(0.0),
                OptionType::Put => (contract.strike - sim.percentiles.p25).max(0.0),
            };
            let t3 = best_case.min(entry_price * LONG_TARGET_3_CAP_MULT).max(t2);
            // Stop tier by probability bucket: the timing cutoffs double as
            // bucket boundaries.
            let retain = if prob > config.enter_now_prob {
                config.stop_retain_high
            } else if prob > config.enter_soon_prob {
                config.stop_retain_mid
            } else {
                config.stop_retain_low
            };
            (t1, t2, t3, entry_price * retain)
        }
        Direction::Short => {
            let t1 = entry_price * SHORT_TARGET_1_MULT;
            let t2 = entry_price * SHORT_TARGET_2_MULT;
            let t3 = SHORT_TARGET_3_FLOOR.min(t2);
            (t1, t2, t3, entry_price * SHORT_STOP_MULT)
        }
    };

    let (max_loss, profit_1_amount, profit_2_amount) = match direction {
        Direction::Long => {
            let total_cost = entry_price * multiplier * size;
            (
                total_cost * (1.0 - stop_loss / entry_price.max(f64::MIN_POSITIVE)),
                (t1 - entry_price) * multiplier * size,
                (t2 - entry_price) * multiplier * size,
            )
        }
        Direction::Short => (
            (stop_loss - entry_price) * multiplier * size,
            (entry_price - t1) * multiplier * size,
            (entry_price - t2) * multiplier * size,
        ),
    };

    let (risk_reward_1, risk_reward_2) = if max_loss > 0.0 {
        (profit_1_amount / max_loss, profit_2_amount / max_loss)
    } else {
        (0.0, 0.0)
    };

    TradePlan {
        entry_price,
        max_entry_price,
        order_type,
        timing,
        breakeven,
        spread_pct,
        profit_target_1: t1,
        profit_target_2: t2,
        profit_target_3: t3,
        stop_loss,
        stop_loss_pct: if entry_price > 0.0 {
            (stop_loss - entry_price) / entry_price * 100.0
        } else {
            0.0
        },
        risk_reward_1,
        risk_reward_2,
        max_loss,
        profit_1_amount,
        profit_2_amount,
        portfolio_risk_pct: if config.portfolio_value > 0.0 {
            max_loss / config.portfolio_value * 100.0
        } else {
            0.0
        },
        exit_strategy: exit_strategy(direction, prob, config.high_confidence_prob),
    }
}

/// Fixed exit templates keyed by direction and probability bucket.
fn exit_strategy(direction: Direction, prob: f64, high_prob: f64) -> &'static str {
    match direction {
        Direction::Long if prob > high_prob => {
            "hold to expiration if in the money, otherwise exit at the stop"
        }
        Direction::Long => "exit at 50% profit or the stop, or five days before expiration",
        Direction::Short => "buy to close at 50-80% profit, or at the doubling stop",
    }
}
