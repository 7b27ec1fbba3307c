use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;
use crate::domain::{EngineError, PaymentMethod, RewardPreference, TxContext};
use crate::engine::resolve_query;

/// Calculation request as sent by the calculator UI.
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// Merchant name or category free text
    pub query: String,

    /// Transaction amount in HKD
    pub amount: f64,

    /// Payment method identifier (e.g. "apple_pay")
    pub payment_method: String,

    /// Spend date, ISO format; defaults to today
    #[serde(default)]
    pub date: Option<String>,

    /// Maximum number of results; absent = all
    #[serde(default)]
    pub limit: Option<usize>,

    /// Cash rebate (default) or points/miles
    #[serde(default)]
    pub reward_preference: Option<RewardPreference>,
}

impl CalculateRequest {
    /// Validate and convert into a transaction context.
    ///
    /// Fails fast on unknown payment methods, malformed dates, and
    /// negative amounts; the free-text query is resolved against the
    /// snapshot's merchant directory.
    pub fn to_tx_context(
        &self,
        snapshot: &CatalogSnapshot,
        today: NaiveDate,
    ) -> Result<TxContext, EngineError> {
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .ok_or_else(|| EngineError::UnknownPaymentMethod(self.payment_method.clone()))?;

        let date = match &self.date {
            Some(raw) => raw
                .parse::<NaiveDate>()
                .map_err(|_| EngineError::MalformedDate(raw.clone()))?,
            None => today,
        };

        let amount = Decimal::from_f64_retain(self.amount)
            .ok_or(EngineError::NonFiniteAmount(self.amount))?;
        if amount < Decimal::ZERO {
            return Err(EngineError::NegativeAmount(amount));
        }

        let (merchant_name, merchant_category) = resolve_query(&self.query, snapshot);

        TxContext::new(
            merchant_name,
            merchant_category,
            amount,
            payment_method,
            date,
            self.reward_preference.unwrap_or_default(),
        )
    }
}
