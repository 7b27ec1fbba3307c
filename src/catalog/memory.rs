use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Card, CardId, RawRule};

use super::source::CatalogSource;

/// In-memory catalog source for tests.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    version: Mutex<String>,
    cards: Mutex<Vec<Card>>,
    rules: Mutex<AHashMap<String, Vec<RawRule>>>,
    directory: Mutex<AHashMap<String, String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        let catalog = MemoryCatalog::default();
        *catalog.version.lock() = "memory-v1".to_string();
        catalog
    }

    pub fn set_version(&self, version: impl Into<String>) {
        *self.version.lock() = version.into();
    }

    pub fn add_card(&self, card: Card) {
        self.cards.lock().push(card);
    }

    pub fn add_rule(&self, rule: RawRule) {
        self.rules
            .lock()
            .entry(rule.card_id.clone())
            .or_default()
            .push(rule);
    }

    pub fn add_merchant(&self, merchant: impl Into<String>, category: impl Into<String>) {
        self.directory
            .lock()
            .insert(merchant.into().to_lowercase(), category.into());
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch_version(&self) -> anyhow::Result<String> {
        Ok(self.version.lock().clone())
    }

    async fn fetch_cards(&self) -> anyhow::Result<Vec<Card>> {
        Ok(self.cards.lock().clone())
    }

    async fn fetch_rules(&self, card_id: &CardId) -> anyhow::Result<Vec<RawRule>> {
        Ok(self
            .rules
            .lock()
            .get(card_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_merchant_directory(&self) -> anyhow::Result<AHashMap<String, String>> {
        Ok(self.directory.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchType;
    use rust_decimal::Decimal;

    fn raw_base_rule(id: &str, card_id: &str) -> RawRule {
        RawRule {
            id: id.to_string(),
            card_id: card_id.to_string(),
            description: None,
            match_type: MatchType::Base,
            categories: vec![],
            merchants: vec![],
            payment_methods: vec![],
            percentage: Decimal::new(2, 0),
            cap: None,
            cap_type: None,
            cap_period: None,
            min_spend: None,
            exclude_categories: vec![],
            valid_from: None,
            valid_until: None,
            valid_days: vec![],
            valid_dates: vec![],
            priority: 0,
            requires_registration: false,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_snapshot_assembly() {
        let catalog = MemoryCatalog::new();
        catalog.add_card(Card::new("c1", "Card One", "Bank", Decimal::new(4, 1)));
        catalog.add_rule(raw_base_rule("r1", "c1"));
        catalog.add_merchant("McDonald", "dining");

        let snapshot = catalog.load_snapshot().await.unwrap();

        assert_eq!(snapshot.version, "memory-v1");
        assert_eq!(snapshot.card_count(), 1);
        assert_eq!(snapshot.rules_for_card(&CardId::new("c1")).len(), 1);
        assert_eq!(snapshot.resolve_category("mcdonald"), Some("dining".to_string()));
    }

    #[tokio::test]
    async fn test_card_with_no_rules() {
        let catalog = MemoryCatalog::new();
        catalog.add_card(Card::new("c1", "Card One", "Bank", Decimal::new(4, 1)));

        let rules = catalog.fetch_rules(&CardId::new("c1")).await.unwrap();
        assert!(rules.is_empty());
    }
}
