use ahash::AHashMap;
use async_trait::async_trait;

use crate::domain::{Card, CardId, RawRule};

use super::snapshot::CatalogSnapshot;

/// Read-only access to an upstream catalog store.
///
/// Writes (rule create/update/delete) belong entirely to the admin
/// side; this engine only ever reads. Per-card rule fetches are
/// independent, so implementations are free to serve them concurrently.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Current upstream catalog version.
    async fn fetch_version(&self) -> anyhow::Result<String>;

    /// All card reference data.
    async fn fetch_cards(&self) -> anyhow::Result<Vec<Card>>;

    /// Raw rules for one card; empty when the card has none.
    async fn fetch_rules(&self, card_id: &CardId) -> anyhow::Result<Vec<RawRule>>;

    /// Merchant name to category directory, lowercase keys.
    async fn fetch_merchant_directory(&self) -> anyhow::Result<AHashMap<String, String>>;

    /// Assemble a validated snapshot from the upstream store.
    async fn load_snapshot(&self) -> anyhow::Result<CatalogSnapshot> {
        let version = self.fetch_version().await?;
        let cards = self.fetch_cards().await?;
        let directory = self.fetch_merchant_directory().await?;

        let mut raw_rules = Vec::new();
        for card in &cards {
            raw_rules.extend(self.fetch_rules(&card.id).await?);
        }

        Ok(CatalogSnapshot::from_parts(version, cards, raw_rules, directory))
    }
}
