use chrono::NaiveDate;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// One leg of an options chain, as delivered by the market-data
/// collaborator. Read-only to the core.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OptionContract {
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub bid: f64,
    pub ask: f64,
    pub volume: u64,
    pub open_interest: u64,
}

impl OptionContract {
    /// Bid/ask midpoint, the market price used for valuation.
    #[inline]
    pub fn mid_price(&self) -> f64 {
        0.5 * (self.bid + self.ask)
    }

    /// Calendar days until expiration, clamped at zero.
    #[inline]
    pub fn days_to_expiration(&self, as_of: NaiveDate) -> i64 {
        (self.expiration - as_of).num_days().max(0)
    }

    /// Time to expiration in years.
    #[inline]
    pub fn years_to_expiration(&self, as_of: NaiveDate) -> f64 {
        self.days_to_expiration(as_of) as f64 / 365.0
    }
}

/// Snapshot of the underlying from the market-data collaborator.
#[derive(Debug, Clone, Copy)]
pub struct MarketSnapshot {
    pub spot: f64,
    /// Annualized historical volatility.
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub as_of: NaiveDate,
}

/// Point price prediction from the ML collaborator. One scoring input
/// among several; never the sole driver of an action.
#[derive(Debug, Clone, Copy)]
pub struct PriceForecast {
    pub predicted_price: f64,
    /// Model confidence in [0, 1], derived from recent prediction error.
    pub confidence: f64,
}

impl PriceForecast {
    /// True when the forecast expects the underlying to rise from `spot`.
    #[inline]
    pub fn is_bullish(&self, spot: f64) -> bool {
        self.predicted_price > spot
    }
}
