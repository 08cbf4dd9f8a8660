use chrono::NaiveDate;
use rusty_options::{
    Engine, EngineConfig, MarketSnapshot, OptionContract, OptionType, PriceForecast,
};

/// Evaluates a small synthetic chain and prints the reports as JSON.
/// Everything upstream of the engine (market data, ML forecast) is
/// stubbed here; in production those come from their own services.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };
    let engine = Engine::new(config);

    let snapshot = MarketSnapshot {
        spot: 100.0,
        volatility: 0.20,
        risk_free_rate: 0.05,
        as_of: NaiveDate::from_ymd_opt(2024, 3, 21).expect("valid date"),
    };
    let forecast = PriceForecast {
        predicted_price: 104.0,
        confidence: 0.55,
    };
    let expiration = NaiveDate::from_ymd_opt(2024, 6, 20).expect("valid date");

    let chain: Vec<OptionContract> = [
        (OptionType::Call, 95.0, 6.40, 6.60, 320, 2_400),
        (OptionType::Call, 100.0, 3.90, 4.10, 510, 3_100),
        (OptionType::Call, 105.0, 2.00, 2.20, 190, 1_150),
        (OptionType::Put, 95.0, 1.45, 1.65, 260, 1_800),
        (OptionType::Put, 100.0, 3.30, 3.50, 75, 900),
        (OptionType::Put, 105.0, 6.30, 6.90, 4, 60),
    ]
    .into_iter()
    .map(
        |(option_type, strike, bid, ask, volume, open_interest)| OptionContract {
            option_type,
            strike,
            expiration,
            bid,
            ask,
            volume,
            open_interest,
        },
    )
    .collect();

    tracing::info!(
        spot = snapshot.spot,
        contracts = chain.len(),
        "evaluating chain"
    );
    let result = engine.evaluate_chain(&snapshot, &chain, &forecast);

    for failure in &result.failures {
        tracing::warn!(
            option_type = %failure.option_type,
            strike = failure.strike,
            error = %failure.error,
            "skipped contract"
        );
    }

    match serde_json::to_string_pretty(&result.reports) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("failed to serialize reports: {e}");
            std::process::exit(1);
        }
    }
}
