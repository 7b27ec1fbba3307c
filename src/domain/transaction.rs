use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// How the transaction is paid.
///
/// Closed enum: unknown values are rejected at the request boundary
/// rather than carried around as free strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical or in-app card payment (chip/contactless)
    Card,
    ApplePay,
    GooglePay,
    SamsungPay,
    /// Card-not-present online checkout
    Online,
    /// Octopus automatic add-value service
    OctopusAavs,
    /// Faster Payment System transfer
    Fps,
    AlipayHk,
    WechatPayHk,
}

impl PaymentMethod {
    /// Parse from the wire representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "card" | "physical_card" => Some(PaymentMethod::Card),
            "apple_pay" => Some(PaymentMethod::ApplePay),
            "google_pay" => Some(PaymentMethod::GooglePay),
            "samsung_pay" => Some(PaymentMethod::SamsungPay),
            "online" => Some(PaymentMethod::Online),
            "octopus_aavs" | "octopus" => Some(PaymentMethod::OctopusAavs),
            "fps" => Some(PaymentMethod::Fps),
            "alipay_hk" | "alipay" => Some(PaymentMethod::AlipayHk),
            "wechat_pay_hk" | "wechat_pay" => Some(PaymentMethod::WechatPayHk),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::ApplePay => "apple_pay",
            PaymentMethod::GooglePay => "google_pay",
            PaymentMethod::SamsungPay => "samsung_pay",
            PaymentMethod::Online => "online",
            PaymentMethod::OctopusAavs => "octopus_aavs",
            PaymentMethod::Fps => "fps",
            PaymentMethod::AlipayHk => "alipay_hk",
            PaymentMethod::WechatPayHk => "wechat_pay_hk",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the caller wants results as cash rebate or as points/miles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardPreference {
    #[default]
    Cash,
    Miles,
}

/// One transaction to simulate, as seen by the matching engine.
///
/// Built once at the request boundary and treated as read-only for the
/// rest of the calculation.
#[derive(Debug, Clone)]
pub struct TxContext {
    /// Merchant name as typed by the user (may be empty for pure
    /// category searches)
    pub merchant_name: String,

    /// Resolved merchant category, if known
    pub merchant_category: Option<String>,

    /// Transaction amount in HKD
    pub amount: Decimal,

    pub payment_method: PaymentMethod,

    /// Date the spend would happen (drives validity windows and
    /// day-restricted rules)
    pub date: NaiveDate,

    pub reward_preference: RewardPreference,
}

impl TxContext {
    /// Create a context, rejecting negative amounts up front.
    pub fn new(
        merchant_name: impl Into<String>,
        merchant_category: Option<String>,
        amount: Decimal,
        payment_method: PaymentMethod,
        date: NaiveDate,
        reward_preference: RewardPreference,
    ) -> Result<Self, EngineError> {
        if amount < Decimal::ZERO {
            return Err(EngineError::NegativeAmount(amount));
        }

        Ok(TxContext {
            merchant_name: merchant_name.into(),
            merchant_category,
            amount,
            payment_method,
            date,
            reward_preference,
        })
    }
}
