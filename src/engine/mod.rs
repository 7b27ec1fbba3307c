pub mod calculator;
pub mod matcher;
pub mod ranker;
pub mod suggestion;

pub use calculator::RewardQuote;
pub use matcher::{select_rule, Applicability};

use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::domain::{Card, CardResult, CardRule, EngineError, TxContext};

/// Resolve a free-text query into (merchant name, category).
///
/// A query naming a known category is treated as a category search;
/// anything else is a merchant name whose category comes from the
/// snapshot's merchant directory, when it is listed there.
pub fn resolve_query(query: &str, snapshot: &CatalogSnapshot) -> (String, Option<String>) {
    let trimmed = query.trim();
    if snapshot.is_known_category(trimmed) {
        return (trimmed.to_string(), Some(trimmed.to_lowercase()));
    }
    (trimmed.to_string(), snapshot.resolve_category(trimmed))
}

/// Rank every card in the snapshot for one simulated transaction.
///
/// Pure over the snapshot: no state survives the call and identical
/// inputs always produce identical output. A card with no applicable
/// rule falls back to its base percentage; a card with neither is left
/// out entirely, which can make the result list empty without being an
/// error.
pub fn calculate(
    ctx: &TxContext,
    snapshot: &CatalogSnapshot,
    limit: Option<usize>,
) -> Result<Vec<CardResult>, EngineError> {
    if ctx.amount < Decimal::ZERO {
        return Err(EngineError::NegativeAmount(ctx.amount));
    }

    let mut results = Vec::with_capacity(snapshot.card_count());

    for card in snapshot.cards() {
        let rules = snapshot.rules_for_card(&card.id);

        let fallback;
        let selected = match matcher::select_rule(rules, ctx) {
            Some(rule) => rule,
            None if card.base_percentage > Decimal::ZERO => {
                fallback = CardRule::implicit_base(card);
                &fallback
            }
            None => {
                debug!(card_id = %card.id, "No applicable rule and no base rate, skipping card");
                continue;
            }
        };

        let quote = calculator::compute(card, selected, ctx.amount, ctx.reward_preference)?;
        let hints = suggestion::derive(selected, &quote, rules, ctx);

        results.push(build_result(card, selected, quote, hints));
    }

    Ok(ranker::rank(results, limit))
}

fn build_result(
    card: &Card,
    rule: &CardRule,
    quote: RewardQuote,
    hints: suggestion::Suggestions,
) -> CardResult {
    CardResult {
        rank: 0, // assigned by the ranker
        card_id: card.id.clone(),
        card_name: card.name.clone(),
        bank: card.bank.clone(),
        image_url: card.image_url.clone(),
        apply_url: card.apply_url.clone(),
        rule_description: rule.description.clone(),
        percentage: quote.percentage,
        reward_amount: quote.reward_amount,
        points_amount: quote.points_amount,
        points_currency: quote.points_currency,
        requires_registration: rule.requires_registration,
        is_capped: quote.is_capped,
        over_cap_info: hints.over_cap,
        date_suggestion: hints.date,
        spending_suggestion: hints.spending,
    }
}
