use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the calculation core.
///
/// Invalid input fails fast and loudly; data-quality problems inside the
/// rule set never reach this type (bad rules are skipped during catalog
/// validation instead). Upstream failures are retryable by the caller —
/// the core itself never retries.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("amount is not a finite number: {0}")]
    NonFiniteAmount(f64),

    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("malformed date: {0}")]
    MalformedDate(String),

    #[error("catalog unavailable: {0}")]
    Upstream(#[source] anyhow::Error),
}

impl EngineError {
    /// True when the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Upstream(_))
    }
}
