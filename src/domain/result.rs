use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::card::CardId;
use super::rule::CapPeriod;

/// Warning that the winning rule's ceiling was hit for this amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverCapInfo {
    /// The ceiling that was applied
    #[serde(with = "rust_decimal::serde::str")]
    pub cap_amount: Decimal,

    /// Window the cap nominally resets in
    pub period: CapPeriod,
}

/// Hint that a day-restricted rule on the same card pays more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSuggestion {
    /// Rate obtainable on the qualifying days
    #[serde(with = "rust_decimal::serde::str")]
    pub percentage: Decimal,

    /// Qualifying weekdays, short names (e.g. "fri")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<String>,

    /// Qualifying days of month
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<u32>,
}

impl DateSuggestion {
    pub fn new(percentage: Decimal, days: &[Weekday], dates: &[u32]) -> Self {
        DateSuggestion {
            percentage,
            days: days.iter().map(weekday_short).collect(),
            dates: dates.to_vec(),
        }
    }
}

fn weekday_short(day: &Weekday) -> String {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
    .to_string()
}

/// Upsell hint: spend more to unlock a better rate on the same card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSuggestion {
    /// Minimum amount that unlocks the better rule
    #[serde(with = "rust_decimal::serde::str")]
    pub target_amount: Decimal,

    /// Rate at that spend level
    #[serde(with = "rust_decimal::serde::str")]
    pub new_percentage: Decimal,
}

/// One ranked card in a calculation response.
///
/// Built fresh per calculation; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardResult {
    /// 1-based position in the final ordering
    pub rank: u32,

    pub card_id: CardId,
    pub card_name: String,
    pub bank: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,

    /// Description of the rule that won for this card
    pub rule_description: String,

    /// Effective rate applied
    #[serde(with = "rust_decimal::serde::str")]
    pub percentage: Decimal,

    /// Cash reward (or cash-equivalent of points under the miles
    /// preference); this is the ranking key
    #[serde(with = "rust_decimal::serde::str")]
    pub reward_amount: Decimal,

    /// Points/miles earned, only under the miles preference for cards
    /// with a points program
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub points_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_currency: Option<String>,

    /// The winning rule requires prior registration
    pub requires_registration: bool,

    pub is_capped: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_cap_info: Option<OverCapInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_suggestion: Option<DateSuggestion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spending_suggestion: Option<SpendingSuggestion>,
}
