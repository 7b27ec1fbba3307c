use crate::domain::{
    CardRule, DateSuggestion, OverCapInfo, SpendingSuggestion, TxContext,
};

use super::calculator::RewardQuote;
use super::matcher::{self, Applicability};

/// Hints derived for one card's result. All best-effort: absence of a
/// suggestion is never an error, and nothing here can change the
/// ranking.
#[derive(Debug, Default)]
pub struct Suggestions {
    pub over_cap: Option<OverCapInfo>,
    pub date: Option<DateSuggestion>,
    pub spending: Option<SpendingSuggestion>,
}

/// Derive suggestions for a card given its winning rule and quote.
pub fn derive(
    selected: &CardRule,
    quote: &RewardQuote,
    rules: &[CardRule],
    ctx: &TxContext,
) -> Suggestions {
    Suggestions {
        over_cap: over_cap_info(quote),
        date: date_suggestion(selected, rules, ctx),
        spending: spending_suggestion(selected, rules, ctx),
    }
}

/// Surface the ceiling so the caller can warn the user they are at or
/// above it.
fn over_cap_info(quote: &RewardQuote) -> Option<OverCapInfo> {
    if !quote.is_capped {
        return None;
    }
    quote.applied_cap.map(|cap| OverCapInfo {
        cap_amount: cap.amount,
        period: cap.period,
    })
}

/// A different, day-restricted rule on the same card that would beat
/// the selected rate on its qualifying days.
fn date_suggestion(
    selected: &CardRule,
    rules: &[CardRule],
    ctx: &TxContext,
) -> Option<DateSuggestion> {
    rules
        .iter()
        .filter(|rule| rule.id != selected.id)
        .filter(|rule| rule.percentage > selected.percentage)
        .filter(|rule| matcher::evaluate(rule, ctx) == Applicability::WrongDay)
        .max_by_key(|rule| rule.percentage)
        .map(|rule| DateSuggestion::new(rule.percentage, &rule.valid_days, &rule.valid_dates))
}

/// A different rule whose higher spend threshold unlocks a better
/// rate; picks the nearest threshold above the current amount.
fn spending_suggestion(
    selected: &CardRule,
    rules: &[CardRule],
    ctx: &TxContext,
) -> Option<SpendingSuggestion> {
    rules
        .iter()
        .filter(|rule| rule.id != selected.id)
        .filter(|rule| rule.percentage > selected.percentage)
        .filter_map(|rule| match matcher::evaluate(rule, ctx) {
            Applicability::BelowMinSpend { min_spend } => Some((rule, min_spend)),
            _ => None,
        })
        .min_by_key(|(rule, min_spend)| (*min_spend, std::cmp::Reverse(rule.percentage)))
        .map(|(rule, min_spend)| SpendingSuggestion {
            target_amount: min_spend,
            new_percentage: rule.percentage,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cap, CapPeriod, CapType, MatchCondition, PaymentMethod, RewardPreference};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use smallvec::SmallVec;

    fn rule(id: &str, percentage: i64) -> CardRule {
        CardRule {
            id: id.to_string(),
            description: format!("{}% rule", percentage),
            condition: MatchCondition::Base,
            percentage: Decimal::new(percentage, 0),
            cap: None,
            min_spend: None,
            exclude_categories: SmallVec::new(),
            valid_from: None,
            valid_until: None,
            valid_days: SmallVec::new(),
            valid_dates: SmallVec::new(),
            priority: 0,
            requires_registration: false,
            is_active: true,
        }
    }

    fn ctx(amount: i64) -> TxContext {
        TxContext::new(
            "shop",
            None,
            Decimal::new(amount, 0),
            PaymentMethod::Card,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(), // Thursday
            RewardPreference::Cash,
        )
        .unwrap()
    }

    fn quote(capped: Option<Cap>) -> RewardQuote {
        RewardQuote {
            percentage: Decimal::new(2, 0),
            reward_amount: Decimal::new(2000, 2),
            points_amount: None,
            points_currency: None,
            is_capped: capped.is_some(),
            applied_cap: capped,
        }
    }

    #[test]
    fn test_over_cap_info_from_capped_quote() {
        let cap = Cap {
            amount: Decimal::new(400, 0),
            cap_type: CapType::Reward,
            period: CapPeriod::Monthly,
        };
        let suggestions = derive(&rule("r1", 2), &quote(Some(cap)), &[], &ctx(1000));

        let info = suggestions.over_cap.unwrap();
        assert_eq!(info.cap_amount, Decimal::new(400, 0));
        assert_eq!(info.period, CapPeriod::Monthly);
    }

    #[test]
    fn test_no_over_cap_when_not_capped() {
        let suggestions = derive(&rule("r1", 2), &quote(None), &[], &ctx(1000));
        assert!(suggestions.over_cap.is_none());
    }

    #[test]
    fn test_date_suggestion_from_day_restricted_rule() {
        let selected = rule("selected", 2);
        let mut weekend = rule("weekend", 8);
        weekend.valid_days = SmallVec::from_vec(vec![chrono::Weekday::Fri, chrono::Weekday::Sat]);

        let rules = vec![selected.clone(), weekend];
        let suggestions = derive(&selected, &quote(None), &rules, &ctx(1000));

        let date = suggestions.date.unwrap();
        assert_eq!(date.percentage, Decimal::new(8, 0));
        assert_eq!(date.days, vec!["fri", "sat"]);
    }

    #[test]
    fn test_no_date_suggestion_for_lower_rate() {
        let selected = rule("selected", 5);
        let mut weekend = rule("weekend", 3);
        weekend.valid_days = SmallVec::from_vec(vec![chrono::Weekday::Fri]);

        let rules = vec![selected.clone(), weekend];
        let suggestions = derive(&selected, &quote(None), &rules, &ctx(1000));
        assert!(suggestions.date.is_none());
    }

    #[test]
    fn test_spending_suggestion_surfaces_gap() {
        let selected = rule("selected", 2);
        let mut tiered = rule("tiered", 6);
        tiered.min_spend = Some(Decimal::new(500, 0));

        let rules = vec![selected.clone(), tiered];
        let suggestions = derive(&selected, &quote(None), &rules, &ctx(300));

        let spending = suggestions.spending.unwrap();
        assert_eq!(spending.target_amount, Decimal::new(500, 0));
        assert_eq!(spending.new_percentage, Decimal::new(6, 0));
    }

    #[test]
    fn test_spending_suggestion_picks_nearest_threshold() {
        let selected = rule("selected", 2);
        let mut mid = rule("mid", 4);
        mid.min_spend = Some(Decimal::new(500, 0));
        let mut high = rule("high", 8);
        high.min_spend = Some(Decimal::new(2000, 0));

        let rules = vec![selected.clone(), mid, high];
        let suggestions = derive(&selected, &quote(None), &rules, &ctx(300));

        assert_eq!(
            suggestions.spending.unwrap().target_amount,
            Decimal::new(500, 0)
        );
    }

    #[test]
    fn test_no_spending_suggestion_when_threshold_met() {
        let selected = rule("selected", 2);
        let mut tiered = rule("tiered", 6);
        tiered.min_spend = Some(Decimal::new(500, 0));

        let rules = vec![selected.clone(), tiered.clone()];
        // Amount already above the threshold: the tiered rule is simply
        // applicable (and would have been selected), not a suggestion
        let suggestions = derive(&selected, &quote(None), &rules, &ctx(800));
        assert!(suggestions.spending.is_none());
    }

    #[test]
    fn test_suggestions_empty_for_bare_card() {
        let selected = rule("selected", 2);
        let suggestions = derive(&selected, &quote(None), &[selected.clone()], &ctx(100));
        assert!(suggestions.over_cap.is_none());
        assert!(suggestions.date.is_none());
        assert!(suggestions.spending.is_none());
    }
}
