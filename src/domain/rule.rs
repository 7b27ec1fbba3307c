use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use super::card::Card;
use super::transaction::PaymentMethod;

/// What kind of condition a rule tests.
///
/// Ordering encodes specificity: when priority and percentage tie, the
/// more specific match wins so a blanket base rule cannot shadow a
/// merchant-specific one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MatchType {
    Base = 0,
    Category = 1,
    Payment = 2,
    Merchant = 3,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Base => write!(f, "base"),
            MatchType::Category => write!(f, "category"),
            MatchType::Payment => write!(f, "payment"),
            MatchType::Merchant => write!(f, "merchant"),
        }
    }
}

/// Validated match condition, carrying only the fields its type needs.
///
/// Typed variants are guaranteed non-empty by construction; the checks
/// live in [`RawRule::validate`], not at use sites.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCondition {
    /// Catch-all; always applicable
    Base,
    /// Merchant category membership
    Category(SmallVec<[String; 4]>),
    /// Merchant name containment (case-insensitive)
    Merchant(SmallVec<[String; 4]>),
    /// Payment method membership
    Payment(SmallVec<[PaymentMethod; 4]>),
}

impl MatchCondition {
    pub fn match_type(&self) -> MatchType {
        match self {
            MatchCondition::Base => MatchType::Base,
            MatchCondition::Category(_) => MatchType::Category,
            MatchCondition::Merchant(_) => MatchType::Merchant,
            MatchCondition::Payment(_) => MatchType::Payment,
        }
    }

    /// Specificity rank used in same-card tie-breaks.
    #[inline]
    pub fn specificity(&self) -> u8 {
        self.match_type() as u8
    }
}

/// Whether a cap limits the reward amount or the qualifying spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapType {
    Reward,
    Spending,
}

/// Window in which a cap would reset.
///
/// Carried through and surfaced to callers, but not enforced across
/// calls: the engine simulates single transactions and tracks no spend
/// history, so the cap acts as a static ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapPeriod {
    Monthly,
    Quarterly,
    Annual,
    Transaction,
}

impl std::fmt::Display for CapPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapPeriod::Monthly => write!(f, "monthly"),
            CapPeriod::Quarterly => write!(f, "quarterly"),
            CapPeriod::Annual => write!(f, "annual"),
            CapPeriod::Transaction => write!(f, "transaction"),
        }
    }
}

/// A cap with its semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cap {
    pub amount: Decimal,
    pub cap_type: CapType,
    pub period: CapPeriod,
}

/// A validated reward rule attached to a card.
#[derive(Debug, Clone)]
pub struct CardRule {
    /// Stable rule identifier
    pub id: String,

    /// Human-readable description surfaced in results
    pub description: String,

    pub condition: MatchCondition,

    /// Reward rate in percent
    pub percentage: Decimal,

    pub cap: Option<Cap>,

    /// Minimum qualifying transaction amount
    pub min_spend: Option<Decimal>,

    /// Categories that disqualify an otherwise-matching transaction
    pub exclude_categories: SmallVec<[String; 4]>,

    /// Inclusive validity window; a missing bound is open on that side
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,

    /// Weekday restriction (empty = any day)
    pub valid_days: SmallVec<[Weekday; 4]>,

    /// Day-of-month restriction (empty = any date)
    pub valid_dates: SmallVec<[u32; 4]>,

    /// Higher priority wins among rules on the same card
    pub priority: i32,

    /// Surfaced to the caller; never evaluated as a blocking condition
    pub requires_registration: bool,

    pub is_active: bool,
}

impl CardRule {
    /// The implicit fallback rule for a card with no applicable rules.
    ///
    /// Priority -1 keeps it below any explicit rule; no cap applies.
    pub fn implicit_base(card: &Card) -> Self {
        CardRule {
            id: format!("{}::base", card.id),
            description: format!("{} base rate", card.name),
            condition: MatchCondition::Base,
            percentage: card.base_percentage,
            cap: None,
            min_spend: None,
            exclude_categories: SmallVec::new(),
            valid_from: None,
            valid_until: None,
            valid_days: SmallVec::new(),
            valid_dates: SmallVec::new(),
            priority: -1,
            requires_registration: false,
            is_active: true,
        }
    }

    /// True when the rule only applies on certain weekdays or dates.
    pub fn is_day_restricted(&self) -> bool {
        !self.valid_days.is_empty() || !self.valid_dates.is_empty()
    }
}

/// Reasons a raw rule fails validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule {0}: match type {1} requires a non-empty condition set")]
    EmptyConditionSet(String, MatchType),

    #[error("rule {0}: percentage must not be negative")]
    NegativePercentage(String),

    #[error("rule {0}: cap must not be negative")]
    NegativeCap(String),

    #[error("rule {0}: min_spend must not be negative")]
    NegativeMinSpend(String),

    #[error("rule {0}: valid_from is after valid_until")]
    InvertedDateWindow(String),

    #[error("rule {0}: unknown payment method {1:?}")]
    UnknownPaymentMethod(String, String),

    #[error("rule {0}: unknown weekday {1:?}")]
    UnknownWeekday(String, String),

    #[error("rule {0}: day of month {1} out of range")]
    DayOfMonthOutOfRange(String, u32),
}

/// Rule as stored upstream: flat, with every condition field nullable.
///
/// Converted into [`CardRule`] at the catalog boundary so the matcher
/// never sees a rule whose invariants do not hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRule {
    pub id: String,

    pub card_id: String,

    #[serde(default)]
    pub description: Option<String>,

    pub match_type: MatchType,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub merchants: Vec<String>,

    #[serde(default)]
    pub payment_methods: Vec<String>,

    #[serde(with = "rust_decimal::serde::str")]
    pub percentage: Decimal,

    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub cap: Option<Decimal>,

    #[serde(default)]
    pub cap_type: Option<CapType>,

    #[serde(default)]
    pub cap_period: Option<CapPeriod>,

    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub min_spend: Option<Decimal>,

    #[serde(default)]
    pub exclude_categories: Vec<String>,

    #[serde(default)]
    pub valid_from: Option<NaiveDate>,

    #[serde(default)]
    pub valid_until: Option<NaiveDate>,

    /// Weekday names, e.g. ["fri", "sat"]
    #[serde(default)]
    pub valid_days: Vec<String>,

    /// Days of month, e.g. [1, 15]
    #[serde(default)]
    pub valid_dates: Vec<u32>,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub requires_registration: bool,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl RawRule {
    /// Validate and convert into a [`CardRule`].
    pub fn validate(self) -> Result<CardRule, RuleError> {
        if self.percentage < Decimal::ZERO {
            return Err(RuleError::NegativePercentage(self.id));
        }
        if self.cap.is_some_and(|c| c < Decimal::ZERO) {
            return Err(RuleError::NegativeCap(self.id));
        }
        if self.min_spend.is_some_and(|m| m < Decimal::ZERO) {
            return Err(RuleError::NegativeMinSpend(self.id));
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                return Err(RuleError::InvertedDateWindow(self.id));
            }
        }

        let condition = match self.match_type {
            MatchType::Base => MatchCondition::Base,
            MatchType::Category => {
                let categories: SmallVec<[String; 4]> = self
                    .categories
                    .iter()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect();
                if categories.is_empty() {
                    return Err(RuleError::EmptyConditionSet(self.id, MatchType::Category));
                }
                MatchCondition::Category(categories)
            }
            MatchType::Merchant => {
                let merchants: SmallVec<[String; 4]> = self
                    .merchants
                    .iter()
                    .map(|m| m.trim().to_lowercase())
                    .filter(|m| !m.is_empty())
                    .collect();
                if merchants.is_empty() {
                    return Err(RuleError::EmptyConditionSet(self.id, MatchType::Merchant));
                }
                MatchCondition::Merchant(merchants)
            }
            MatchType::Payment => {
                let mut methods: SmallVec<[PaymentMethod; 4]> = SmallVec::new();
                for raw in &self.payment_methods {
                    match PaymentMethod::from_str(raw) {
                        Some(m) => methods.push(m),
                        None => {
                            return Err(RuleError::UnknownPaymentMethod(self.id, raw.clone()))
                        }
                    }
                }
                if methods.is_empty() {
                    return Err(RuleError::EmptyConditionSet(self.id, MatchType::Payment));
                }
                MatchCondition::Payment(methods)
            }
        };

        let mut valid_days: SmallVec<[Weekday; 4]> = SmallVec::new();
        for raw in &self.valid_days {
            match raw.parse::<Weekday>() {
                Ok(day) => valid_days.push(day),
                Err(_) => return Err(RuleError::UnknownWeekday(self.id, raw.clone())),
            }
        }

        for &day in &self.valid_dates {
            if day == 0 || day > 31 {
                return Err(RuleError::DayOfMonthOutOfRange(self.id, day));
            }
        }

        let cap = self.cap.map(|amount| Cap {
            amount,
            cap_type: self.cap_type.unwrap_or(CapType::Reward),
            period: self.cap_period.unwrap_or(CapPeriod::Monthly),
        });

        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{}% {}", self.percentage, self.match_type));

        Ok(CardRule {
            id: self.id,
            description,
            condition,
            percentage: self.percentage,
            cap,
            min_spend: self.min_spend,
            exclude_categories: self
                .exclude_categories
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            valid_days,
            valid_dates: self.valid_dates.into_iter().collect(),
            priority: self.priority,
            requires_registration: self.requires_registration,
            is_active: self.is_active,
        })
    }
}
