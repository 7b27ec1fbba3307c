use ahash::AHashMap;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Card, RawRule};

use super::snapshot::CatalogSnapshot;

/// Errors that can occur during catalog loading.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// On-disk catalog shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    pub catalog_version: String,

    #[serde(default)]
    pub cards: Vec<Card>,

    #[serde(default)]
    pub rules: Vec<RawRule>,
}

/// Load the catalog YAML file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<CatalogFile, CatalogError> {
    let content = fs::read_to_string(path)?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

/// Load the merchant directory from a YAML file.
///
/// Expected format: a map of category id to merchant name list. Names
/// are normalized to lowercase for lookup.
pub fn load_merchants(path: impl AsRef<Path>) -> Result<AHashMap<String, String>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let by_category: BTreeMap<String, Vec<String>> = serde_yaml::from_str(&content)?;

    let mut directory = AHashMap::new();
    for (category, merchants) in by_category {
        let category = category.trim().to_lowercase();
        for merchant in merchants {
            let merchant = merchant.trim().to_lowercase();
            if merchant.is_empty() {
                continue;
            }
            directory.insert(merchant, category.clone());
        }
    }

    Ok(directory)
}

/// Structural validation; per-rule invariants are checked later when
/// rules are compiled into the snapshot.
fn validate_catalog(catalog: &CatalogFile) -> Result<(), CatalogError> {
    if catalog.catalog_version.is_empty() {
        return Err(CatalogError::Validation(
            "Catalog version cannot be empty".to_string(),
        ));
    }

    let mut seen_cards = HashSet::new();
    for card in &catalog.cards {
        if !seen_cards.insert(card.id.as_str()) {
            return Err(CatalogError::Validation(format!(
                "Duplicate card ID: {}",
                card.id
            )));
        }
    }

    let mut seen_rules = HashSet::new();
    for rule in &catalog.rules {
        if !seen_rules.insert(&rule.id) {
            return Err(CatalogError::Validation(format!(
                "Duplicate rule ID: {}",
                rule.id
            )));
        }
    }

    Ok(())
}

/// Catalog loader that manages catalog and merchant directory loading.
pub struct CatalogLoader {
    catalog_path: String,
    merchants_path: String,
}

impl CatalogLoader {
    pub fn new(catalog_path: impl Into<String>, merchants_path: impl Into<String>) -> Self {
        CatalogLoader {
            catalog_path: catalog_path.into(),
            merchants_path: merchants_path.into(),
        }
    }

    /// Load catalog and merchant directory into a snapshot.
    pub fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let catalog = load_catalog(&self.catalog_path)?;
        let directory = load_merchants(&self.merchants_path)?;

        Ok(CatalogSnapshot::from_parts(
            catalog.catalog_version,
            catalog.cards,
            catalog.rules,
            directory,
        ))
    }

    /// Read only the catalog version (cheap change detection).
    pub fn load_version(&self) -> Result<String, CatalogError> {
        let catalog = load_catalog(&self.catalog_path)?;
        Ok(catalog.catalog_version)
    }

    pub fn catalog_path(&self) -> &str {
        &self.catalog_path
    }

    pub fn merchants_path(&self) -> &str {
        &self.merchants_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_CATALOG: &str = r#"
catalog_version: "2026-08-01.1"
cards:
  - id: earnmore
    name: "EarnMORE UnionPay"
    bank: "Hang Seng"
    base_percentage: "2"
  - id: hsbc-red
    name: "HSBC Red"
    bank: "HSBC"
    base_percentage: "1"
rules:
  - id: hsbc-red-online
    card_id: hsbc-red
    match_type: category
    categories: [online]
    percentage: "4"
    cap: "400"
    cap_type: reward
    cap_period: monthly
  - id: earnmore-base
    card_id: earnmore
    match_type: base
    percentage: "2"
"#;

    const TEST_MERCHANTS: &str = r#"
dining:
  - mcdonald
  - starbucks
online:
  - hktvmall
  - amazon
"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_catalog() {
        let catalog_file = write_temp(TEST_CATALOG);
        let merchants_file = write_temp(TEST_MERCHANTS);

        let loader = CatalogLoader::new(
            catalog_file.path().to_string_lossy(),
            merchants_file.path().to_string_lossy(),
        );

        let snapshot = loader.load().unwrap();
        assert_eq!(snapshot.version, "2026-08-01.1");
        assert_eq!(snapshot.card_count(), 2);
        assert_eq!(snapshot.rule_count(), 2);
        assert_eq!(snapshot.resolve_category("starbucks"), Some("dining".to_string()));
    }

    #[test]
    fn test_duplicate_card_id_rejected() {
        let yaml = r#"
catalog_version: "v1"
cards:
  - { id: c1, name: "A", bank: "B", base_percentage: "1" }
  - { id: c1, name: "C", bank: "D", base_percentage: "2" }
"#;
        let file = write_temp(yaml);
        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_duplicate_rule_id_rejected() {
        let yaml = r#"
catalog_version: "v1"
cards:
  - { id: c1, name: "A", bank: "B", base_percentage: "1" }
rules:
  - { id: r1, card_id: c1, match_type: base, percentage: "1" }
  - { id: r1, card_id: c1, match_type: base, percentage: "2" }
"#;
        let file = write_temp(yaml);
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_empty_version_rejected() {
        let yaml = r#"
catalog_version: ""
cards: []
"#;
        let file = write_temp(yaml);
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_load_version_only() {
        let catalog_file = write_temp(TEST_CATALOG);
        let loader = CatalogLoader::new(catalog_file.path().to_string_lossy(), "unused");
        assert_eq!(loader.load_version().unwrap(), "2026-08-01.1");
    }
}
