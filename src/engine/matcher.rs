use chrono::Datelike;
use rust_decimal::Decimal;

use crate::domain::{CardRule, MatchCondition, TxContext};

/// Minimum merchant entry length for containment matching; shorter
/// entries only match exactly to avoid noise hits.
const MIN_CONTAINMENT_LEN: usize = 3;

/// Outcome of testing one rule against a transaction.
///
/// The soft variants exist for the suggestion generator: a rule that
/// failed only its day restriction or only its spend threshold is a
/// candidate hint, while a hard-ineligible rule is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Applicability {
    Applicable,
    /// Every gate passed except the spend threshold
    BelowMinSpend { min_spend: Decimal },
    /// Every gate passed except the weekday/date restriction
    WrongDay,
    /// Inactive, out of window, excluded, or condition mismatch
    Ineligible,
}

impl Applicability {
    #[inline]
    pub fn is_applicable(&self) -> bool {
        matches!(self, Applicability::Applicable)
    }
}

/// Test a single rule against the transaction context.
pub fn evaluate(rule: &CardRule, ctx: &TxContext) -> Applicability {
    if !rule.is_active {
        return Applicability::Ineligible;
    }

    // Inclusive window; a missing bound is open on that side
    if rule.valid_from.is_some_and(|from| ctx.date < from)
        || rule.valid_until.is_some_and(|until| ctx.date > until)
    {
        return Applicability::Ineligible;
    }

    if let Some(category) = &ctx.merchant_category {
        if rule.exclude_categories.iter().any(|c| c == category) {
            return Applicability::Ineligible;
        }
    }

    if !condition_matches(&rule.condition, ctx) {
        return Applicability::Ineligible;
    }

    let day_ok = day_matches(rule, ctx);
    let below_min_spend = rule.min_spend.filter(|min| ctx.amount < *min);

    match (day_ok, below_min_spend) {
        (true, None) => Applicability::Applicable,
        (true, Some(min_spend)) => Applicability::BelowMinSpend { min_spend },
        (false, None) => Applicability::WrongDay,
        // Failing both gates disqualifies the rule as a hint source too
        (false, Some(_)) => Applicability::Ineligible,
    }
}

fn condition_matches(condition: &MatchCondition, ctx: &TxContext) -> bool {
    match condition {
        MatchCondition::Base => true,
        MatchCondition::Category(categories) => ctx
            .merchant_category
            .as_ref()
            .is_some_and(|category| categories.iter().any(|c| c == category)),
        MatchCondition::Merchant(merchants) => {
            let name = ctx.merchant_name.trim().to_lowercase();
            if name.is_empty() {
                return false;
            }
            merchants.iter().any(|entry| merchant_matches(entry, &name))
        }
        MatchCondition::Payment(methods) => methods.contains(&ctx.payment_method),
    }
}

/// Case-insensitive containment in either direction, so "McDonald's"
/// matches a rule entry "mcdonald". Entries are lowercased at
/// validation time.
fn merchant_matches(entry: &str, name: &str) -> bool {
    if entry.len() < MIN_CONTAINMENT_LEN || name.len() < MIN_CONTAINMENT_LEN {
        return entry == name;
    }
    name.contains(entry) || entry.contains(name)
}

fn day_matches(rule: &CardRule, ctx: &TxContext) -> bool {
    if !rule.valid_days.is_empty() && !rule.valid_days.contains(&ctx.date.weekday()) {
        return false;
    }
    if !rule.valid_dates.is_empty() && !rule.valid_dates.contains(&ctx.date.day()) {
        return false;
    }
    true
}

/// Pick "the" rule for a card: highest priority, then highest
/// percentage, then the more specific match type so a blanket base rule
/// never shadows a merchant-specific one.
pub fn select_rule<'a>(rules: &'a [CardRule], ctx: &TxContext) -> Option<&'a CardRule> {
    rules
        .iter()
        .filter(|rule| evaluate(rule, ctx).is_applicable())
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.percentage.cmp(&b.percentage))
                .then(a.condition.specificity().cmp(&b.condition.specificity()))
        })
}
