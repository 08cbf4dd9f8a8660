use crate::chain::{MarketSnapshot, OptionContract, OptionType, PriceForecast};
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::execution::plan::{self, TradePlan};
use crate::models::{binomial, black_scholes, monte_carlo, FairValueResult, PricingInputs};
use crate::strategy::{self, Confidence, Recommendation};
use crate::valuation::{self, ValuationResult};
use chrono::NaiveDate;

/// One fully evaluated contract: the recommendation, the trade plan, and
/// the model outputs the presentation layer renders alongside them.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContractReport {
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    /// Bid/ask midpoint at evaluation time.
    pub market_price: f64,
    pub fair_value: FairValueResult,
    pub valuation: ValuationResult,
    pub recommendation: Recommendation,
    pub plan: TradePlan,
    /// Ranking signal; reports are sorted by this, descending.
    pub risk_adjusted_return: f64,
}

/// A contract the engine refused to evaluate. Reported once, never
/// retried; the caller decides whether to re-request data.
#[derive(Debug)]
pub struct FailedContract {
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub error: EngineError,
}

/// Chain-level output. Reports are sorted best-first and truncated to
/// the configured top-N; failures are set aside with their errors.
#[derive(Debug)]
pub struct ChainReport {
    pub reports: Vec<ContractReport>,
    pub failures: Vec<FailedContract>,
}

impl ChainReport {
    /// Non-HOLD picks with at least MEDIUM confidence.
    pub fn actionable(&self) -> impl Iterator<Item = &ContractReport> {
        self.reports.iter().filter(|r| {
            !r.recommendation.action.is_hold() && r.recommendation.confidence != Confidence::Low
        })
    }
}

/// The valuation pipeline. Owns nothing but the config; every evaluation
/// is a pure, synchronous pass over caller-supplied inputs, so chains
/// can be fanned out across threads without coordination.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full pipeline for a single contract:
    /// price -> simulate -> classify -> recommend -> plan.
    pub fn evaluate_contract(
        &self,
        snapshot: &MarketSnapshot,
        contract: &OptionContract,
        forecast: &PriceForecast,
    ) -> EngineResult<ContractReport> {
        let inputs = PricingInputs::new(
            snapshot.spot,
            contract.strike,
            contract.years_to_expiration(snapshot.as_of),
            snapshot.risk_free_rate,
            snapshot.volatility,
            self.config.lattice_steps,
        );
        inputs.validate()?;

        let fair_value = FairValueResult {
            european_price: black_scholes::price(&inputs, contract.option_type),
            american_price: binomial::price(&inputs, contract.option_type)?,
            greeks: black_scholes::greeks(&inputs, contract.option_type),
        };

        let sim = monte_carlo::simulate(
            &inputs,
            contract.option_type,
            self.config.mc_trials,
            self.config.mc_seed,
        )?;

        // Listed contracts are American, so the lattice value is the
        // tradable fair value.
        let market_price = contract.mid_price();
        let valuation = valuation::classify(
            market_price,
            fair_value.american_price,
            self.config.valuation_threshold_pct,
        );

        let recommendation = strategy::evaluate(
            &self.config,
            contract,
            snapshot.spot,
            valuation,
            &sim,
            forecast,
        );
        let plan = plan::build(
            &self.config,
            contract,
            &recommendation,
            fair_value.american_price,
            &sim,
        );

        let cost = market_price * self.config.contract_multiplier;
        let net_expected_return = sim.expected_payoff * self.config.contract_multiplier - cost;
        let risk_adjusted_return = valuation::risk_adjusted_return(
            net_expected_return,
            sim.probability_itm,
            valuation::percentile_dispersion(&sim.percentiles),
        );

        Ok(ContractReport {
            option_type: contract.option_type,
            strike: contract.strike,
            expiration: contract.expiration,
            market_price,
            fair_value,
            valuation,
            recommendation,
            plan,
            risk_adjusted_return,
        })
    }

    /// Evaluates a whole chain. A contract with corrupt inputs is warned
    /// about once and set aside; its peers continue unaffected.
    pub fn evaluate_chain(
        &self,
        snapshot: &MarketSnapshot,
        chain: &[OptionContract],
        forecast: &PriceForecast,
    ) -> ChainReport {
        let mut reports = Vec::with_capacity(chain.len());
        let mut failures = Vec::new();

        for contract in chain {
            match self.evaluate_contract(snapshot, contract, forecast) {
                Ok(report) => reports.push(report),
                Err(error) => {
                    tracing::warn!(
                        option_type = %contract.option_type,
                        strike = contract.strike,
                        %error,
                        "contract evaluation failed, continuing with peers"
                    );
                    failures.push(FailedContract {
                        option_type: contract.option_type,
                        strike: contract.strike,
                        expiration: contract.expiration,
                        error,
                    });
                }
            }
        }

        reports.sort_by(|a, b| b.risk_adjusted_return.total_cmp(&a.risk_adjusted_return));
        reports.truncate(self.config.top_n);

        tracing::info!(
            evaluated = reports.len(),
            failed = failures.len(),
            "chain evaluation complete"
        );
        ChainReport { reports, failures }
    }
}
