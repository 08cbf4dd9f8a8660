use crate::errors::{EngineError, EngineResult};

/// Every tunable threshold in the engine lives here, passed explicitly
/// into the pipeline. No call site carries its own magic numbers.
///
/// The probability cutoffs (0.45/0.55/0.40) and the 10% mispricing band
/// were chosen empirically, not derived; treat them as defaults to
/// calibrate, not as ground truth.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ── Valuation ──
    /// Mispricing band: |deviation| below this is considered fair.
    pub valuation_threshold_pct: f64,

    // ── Decision table ──
    /// Minimum probability-ITM before an undervalued contract is a buy.
    pub buy_prob_floor: f64,
    /// Maximum probability-ITM before an overvalued contract is a sell.
    pub sell_prob_ceiling: f64,
    /// Probability-ITM beyond this counts toward HIGH confidence.
    pub high_confidence_prob: f64,
    /// ML forecast confidence at which a contradicting forecast vetoes a buy.
    pub forecast_veto_confidence: f64,

    // ── Liquidity ──
    /// Below either minimum the contract is filtered out, forced HOLD.
    pub min_volume: u64,
    pub min_open_interest: u64,
    /// At or above both, liquidity counts as ample for confidence scoring.
    pub ample_volume: u64,
    pub ample_open_interest: u64,
    /// Never size beyond this fraction of open interest.
    pub max_oi_fraction: f64,

    // ── Position sizing ──
    pub portfolio_value: f64,
    /// Fraction of the portfolio put at risk per position.
    pub risk_fraction: f64,
    /// Shares per listed contract.
    pub contract_multiplier: f64,

    // ── Entry and exit ──
    /// Spread/mid below this allows a market order at the touch.
    pub tight_spread_pct: f64,
    /// Entry cap margin above (buys) or below (sells) fair value.
    pub entry_fair_margin: f64,
    /// Probability-ITM cutoffs for entry timing.
    pub enter_now_prob: f64,
    pub enter_soon_prob: f64,
    /// Stop-loss tiers: fraction of entry premium retained at the stop,
    /// keyed by probability-ITM bucket (high / mid / speculative).
    pub stop_retain_high: f64,
    pub stop_retain_mid: f64,
    pub stop_retain_low: f64,

    // ── Numerics ──
    /// Binomial lattice depth.
    pub lattice_steps: usize,
    /// Monte Carlo trial count.
    pub mc_trials: usize,
    /// Explicit RNG seed so simulations are reproducible.
    pub mc_seed: u64,

    // ── Output ──
    /// Chain reports are truncated to this many, best first.
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            valuation_threshold_pct: 10.0,
            buy_prob_floor: 0.45,
            sell_prob_ceiling: 0.40,
            high_confidence_prob: 0.55,
            forecast_veto_confidence: 0.60,
            min_volume: 10,
            min_open_interest: 50,
            ample_volume: 100,
            ample_open_interest: 500,
            max_oi_fraction: 0.05,
            portfolio_value: 10_000.0,
            risk_fraction: 0.02,
            contract_multiplier: 100.0,
            tight_spread_pct: 5.0,
            entry_fair_margin: 0.05,
            enter_now_prob: 0.60,
            enter_soon_prob: 0.50,
            stop_retain_high: 0.50,
            stop_retain_mid: 0.40,
            stop_retain_low: 0.30,
            lattice_steps: 200,
            mc_trials: 10_000,
            mc_seed: 42,
            top_n: 5,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by environment variables where present.
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let d = Self::default();
        Ok(Self {
            valuation_threshold_pct: env_parse("VALUATION_THRESHOLD_PCT", d.valuation_threshold_pct)?,
            min_volume: env_parse("MIN_VOLUME", d.min_volume)?,
            min_open_interest: env_parse("MIN_OPEN_INTEREST", d.min_open_interest)?,
            portfolio_value: env_parse("PORTFOLIO_VALUE", d.portfolio_value)?,
            risk_fraction: env_parse("RISK_FRACTION", d.risk_fraction)?,
            lattice_steps: env_parse("LATTICE_STEPS", d.lattice_steps)?,
            mc_trials: env_parse("MC_TRIALS", d.mc_trials)?,
            mc_seed: env_parse("MC_SEED", d.mc_seed)?,
            top_n: env_parse("TOP_N", d.top_n)?,
            ..d
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> EngineResult<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| EngineError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}
