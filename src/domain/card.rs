use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unique card identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        CardId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Points/miles program attached to a card.
///
/// Used when the caller asks for the `miles` reward preference: earned
/// points are `spend * points_per_unit`, and their estimated cash value
/// (the ranking key) is `points * point_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsProgram {
    /// Display name of the points currency (e.g. "Asia Miles", "RewardCash")
    pub currency: String,

    /// Points earned per unit of currency spent
    pub points_per_unit: Decimal,

    /// Estimated cash value of a single point
    pub point_value: Decimal,
}

impl PointsProgram {
    pub fn new(
        currency: impl Into<String>,
        points_per_unit: Decimal,
        point_value: Decimal,
    ) -> Self {
        PointsProgram {
            currency: currency.into(),
            points_per_unit,
            point_value,
        }
    }
}

/// Credit card reference data.
///
/// Immutable within a calculation; created and updated only by the
/// admin side, which is not this crate's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique card identifier
    pub id: CardId,

    /// Display name (e.g. "EarnMORE UnionPay")
    pub name: String,

    /// Issuing bank
    pub bank: String,

    /// Fallback reward rate in percent when no rule matches (e.g. 0.4)
    #[serde(with = "rust_decimal::serde::str")]
    pub base_percentage: Decimal,

    /// Card artwork reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Application landing page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,

    /// Points program, present only for miles-earning cards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_program: Option<PointsProgram>,
}

impl Card {
    /// Create a cash-only card with no optional fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        bank: impl Into<String>,
        base_percentage: Decimal,
    ) -> Self {
        Card {
            id: CardId::new(id),
            name: name.into(),
            bank: bank.into(),
            base_percentage,
            image_url: None,
            apply_url: None,
            points_program: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserialization() {
        let yaml = r#"
id: earnmore
name: "EarnMORE UnionPay"
bank: "Hang Seng"
base_percentage: "2"
apply_url: "https://example.com/earnmore"
"#;
        let card: Card = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(card.id.as_str(), "earnmore");
        assert_eq!(card.base_percentage, Decimal::new(2, 0));
        assert!(card.image_url.is_none());
        assert!(card.points_program.is_none());
    }

    #[test]
    fn test_points_program_deserialization() {
        let yaml = r#"
id: cx-elite
name: "Cathay Elite"
bank: "Standard Chartered"
base_percentage: "0.4"
points_program:
  currency: "Asia Miles"
  points_per_unit: "0.25"
  point_value: "0.1"
"#;
        let card: Card = serde_yaml::from_str(yaml).unwrap();
        let program = card.points_program.unwrap();
        assert_eq!(program.currency, "Asia Miles");
        assert_eq!(program.points_per_unit, Decimal::new(25, 2));
    }
}
