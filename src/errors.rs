/// Domain-specific error types for the valuation core.
/// A failing contract must never abort a chain evaluation: the engine
/// records the error once, logs it, and continues with the peers.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
