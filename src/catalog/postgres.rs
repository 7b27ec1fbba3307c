use ahash::AHashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::domain::{Card, CardId, MatchType, PointsProgram, RawRule};

use super::source::CatalogSource;

/// Read-only PostgreSQL catalog source.
///
/// All writes to these tables belong to the admin application; this
/// engine issues SELECTs only.
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a catalog source with a connection pool.
    pub async fn connect(
        database_url: &str,
        min_connections: u32,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Strict: an unrecognized match type must drop the row, never default
/// to base, or a malformed specific rule would apply to everything.
fn parse_match_type(s: &str) -> Option<MatchType> {
    match s {
        "base" => Some(MatchType::Base),
        "category" => Some(MatchType::Category),
        "merchant" => Some(MatchType::Merchant),
        "payment" => Some(MatchType::Payment),
        _ => None,
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    async fn fetch_version(&self) -> anyhow::Result<String> {
        let row = sqlx::query(
            r#"
            SELECT version
            FROM catalog_meta
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| r.get::<String, _>("version"))
            .unwrap_or_else(|| "0.0.0".to_string()))
    }

    async fn fetch_cards(&self) -> anyhow::Result<Vec<Card>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, bank, base_percentage, image_url, apply_url,
                   points_currency, points_per_unit, point_value
            FROM cards
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let cards = rows
            .into_iter()
            .map(|row| {
                let points_currency: Option<String> = row.get("points_currency");
                let points_per_unit: Option<Decimal> = row.get("points_per_unit");
                let point_value: Option<Decimal> = row.get("point_value");

                let points_program = match (points_currency, points_per_unit, point_value) {
                    (Some(currency), Some(per_unit), Some(value)) => {
                        Some(PointsProgram::new(currency, per_unit, value))
                    }
                    _ => None,
                };

                Card {
                    id: CardId::new(row.get::<String, _>("id")),
                    name: row.get("name"),
                    bank: row.get("bank"),
                    base_percentage: row.get("base_percentage"),
                    image_url: row.get("image_url"),
                    apply_url: row.get("apply_url"),
                    points_program,
                }
            })
            .collect();

        Ok(cards)
    }

    async fn fetch_rules(&self, card_id: &CardId) -> anyhow::Result<Vec<RawRule>> {
        let rows = sqlx::query(
            r#"
            SELECT id, card_id, description, match_type, categories, merchants,
                   payment_methods, percentage, cap, cap_type, cap_period,
                   min_spend, exclude_categories, valid_from, valid_until,
                   valid_days, valid_dates, priority, requires_registration,
                   is_active
            FROM card_rules
            WHERE card_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(card_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let rules = rows
            .into_iter()
            .filter_map(|row| {
                let cap_type: Option<String> = row.get("cap_type");
                let cap_period: Option<String> = row.get("cap_period");
                let valid_dates: Option<Vec<i32>> = row.get("valid_dates");

                let raw_match_type: String = row.get("match_type");
                let Some(match_type) = parse_match_type(&raw_match_type) else {
                    warn!(
                        rule_id = %row.get::<String, _>("id"),
                        match_type = %raw_match_type,
                        "Dropping rule with unknown match type"
                    );
                    return None;
                };

                Some(RawRule {
                    id: row.get("id"),
                    card_id: row.get("card_id"),
                    description: row.get("description"),
                    match_type,
                    categories: row
                        .get::<Option<Vec<String>>, _>("categories")
                        .unwrap_or_default(),
                    merchants: row
                        .get::<Option<Vec<String>>, _>("merchants")
                        .unwrap_or_default(),
                    payment_methods: row
                        .get::<Option<Vec<String>>, _>("payment_methods")
                        .unwrap_or_default(),
                    percentage: row.get("percentage"),
                    cap: row.get("cap"),
                    cap_type: cap_type.and_then(|t| match t.as_str() {
                        "reward" => Some(crate::domain::CapType::Reward),
                        "spending" => Some(crate::domain::CapType::Spending),
                        _ => None,
                    }),
                    cap_period: cap_period.and_then(|p| match p.as_str() {
                        "monthly" => Some(crate::domain::CapPeriod::Monthly),
                        "quarterly" => Some(crate::domain::CapPeriod::Quarterly),
                        "annual" => Some(crate::domain::CapPeriod::Annual),
                        "transaction" => Some(crate::domain::CapPeriod::Transaction),
                        _ => None,
                    }),
                    min_spend: row.get("min_spend"),
                    exclude_categories: row
                        .get::<Option<Vec<String>>, _>("exclude_categories")
                        .unwrap_or_default(),
                    valid_from: row.get::<Option<NaiveDate>, _>("valid_from"),
                    valid_until: row.get::<Option<NaiveDate>, _>("valid_until"),
                    valid_days: row
                        .get::<Option<Vec<String>>, _>("valid_days")
                        .unwrap_or_default(),
                    valid_dates: valid_dates
                        .unwrap_or_default()
                        .into_iter()
                        .map(|d| d.max(0) as u32)
                        .collect(),
                    priority: row.get("priority"),
                    requires_registration: row.get("requires_registration"),
                    is_active: row.get("is_active"),
                })
            })
            .collect();

        Ok(rules)
    }

    async fn fetch_merchant_directory(&self) -> anyhow::Result<AHashMap<String, String>> {
        let rows = sqlx::query(
            r#"
            SELECT merchant, category
            FROM merchant_categories
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut directory = AHashMap::new();
        for row in rows {
            let merchant: String = row.get("merchant");
            let category: String = row.get("category");
            directory.insert(merchant.to_lowercase(), category.to_lowercase());
        }

        Ok(directory)
    }
}
