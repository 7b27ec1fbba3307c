use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::domain::{Card, CardId, CardRule, RawRule};

/// Minimum length for a merchant directory entry to participate in
/// containment matching; shorter entries must match exactly.
const MIN_CONTAINMENT_LEN: usize = 3;

/// Immutable, validated view of the card catalog for one calculation.
///
/// Raw rules are validated on construction; a rule that violates its
/// invariants is dropped with a warning and never reaches the matcher.
/// A bad rule must not take down the ranking for every card.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Catalog version identifier
    pub version: String,

    cards: Vec<Card>,
    rules_by_card: AHashMap<CardId, Vec<CardRule>>,
    merchant_directory: AHashMap<String, String>,
    categories: AHashSet<String>,
}

impl CatalogSnapshot {
    /// Build a snapshot from upstream data.
    ///
    /// `merchant_directory` maps lowercase merchant names to category
    /// identifiers. Rules referencing unknown cards are dropped.
    pub fn from_parts(
        version: impl Into<String>,
        cards: Vec<Card>,
        raw_rules: Vec<RawRule>,
        merchant_directory: AHashMap<String, String>,
    ) -> Self {
        let card_ids: AHashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();

        let mut rules_by_card: AHashMap<CardId, Vec<CardRule>> = AHashMap::new();
        for raw in raw_rules {
            if !card_ids.contains(raw.card_id.as_str()) {
                warn!(rule_id = %raw.id, card_id = %raw.card_id, "Dropping rule for unknown card");
                continue;
            }
            let card_id = CardId::new(raw.card_id.clone());
            match raw.validate() {
                Ok(rule) => rules_by_card.entry(card_id).or_default().push(rule),
                Err(e) => warn!(error = %e, "Dropping invalid rule"),
            }
        }

        let mut categories: AHashSet<String> =
            merchant_directory.values().map(|c| c.to_lowercase()).collect();
        for rules in rules_by_card.values() {
            for rule in rules {
                if let crate::domain::MatchCondition::Category(cats) = &rule.condition {
                    categories.extend(cats.iter().cloned());
                }
            }
        }

        CatalogSnapshot {
            version: version.into(),
            cards,
            rules_by_card,
            merchant_directory,
            categories,
        }
    }

    /// Empty snapshot used before the first successful load.
    pub fn empty() -> Self {
        CatalogSnapshot {
            version: "0.0.0".to_string(),
            cards: Vec::new(),
            rules_by_card: AHashMap::new(),
            merchant_directory: AHashMap::new(),
            categories: AHashSet::new(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Active validated rules for a card; empty when none exist.
    pub fn rules_for_card(&self, card_id: &CardId) -> &[CardRule] {
        self.rules_by_card
            .get(card_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules_by_card.values().map(Vec::len).sum()
    }

    /// True when the query names a category the catalog knows about.
    pub fn is_known_category(&self, query: &str) -> bool {
        self.categories.contains(&query.trim().to_lowercase())
    }

    /// Resolve a merchant name to its category via the directory.
    ///
    /// Exact lookup first, then case-insensitive containment in either
    /// direction so "McDonald's" finds a directory entry "mcdonald".
    /// When several entries match, the longest wins, with a lexicographic
    /// tie-break; map iteration order never decides the category.
    pub fn resolve_category(&self, merchant_name: &str) -> Option<String> {
        let needle = merchant_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(category) = self.merchant_directory.get(&needle) {
            return Some(category.clone());
        }

        self.merchant_directory
            .iter()
            .filter(|(entry, _)| entry.len() >= MIN_CONTAINMENT_LEN)
            .filter(|(entry, _)| needle.contains(entry.as_str()) || entry.contains(&needle))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, category)| category.clone())
    }
}
