//! Product entity type - a reusable template for pieces in an order

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// One filament requirement of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRequirement {
    /// Part label (e.g. "body", "lid")
    pub label: String,

    /// Optional free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Grams of filament one unit needs for this part
    pub grams: f64,
}

/// Product pricing: either one price for every unit, or a price per size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prices {
    /// Single per-unit price
    Single(f64),
    /// Price keyed by size/variant name
    BySize(BTreeMap<String, f64>),
}

impl Default for Prices {
    fn default() -> Self {
        Prices::BySize(BTreeMap::new())
    }
}

impl Prices {
    /// The unambiguous per-unit price, when the product has exactly one
    pub fn single(&self) -> Option<f64> {
        match self {
            Prices::Single(price) => Some(*price),
            Prices::BySize(_) => None,
        }
    }

    /// Resolve a price: a single price ignores `size`, a size map
    /// requires one
    pub fn resolve(&self, size: Option<&str>) -> Option<f64> {
        match (self, size) {
            (Prices::Single(price), _) => Some(*price),
            (Prices::BySize(map), Some(key)) => map.get(key).copied(),
            (Prices::BySize(_), None) => None,
        }
    }

    /// Whether any non-zero price has been declared at all
    pub fn has_any(&self) -> bool {
        match self {
            Prices::Single(price) => *price > 0.0,
            Prices::BySize(map) => map.values().any(|price| *price > 0.0),
        }
    }

    /// Size names for a size-priced product
    pub fn sizes(&self) -> Vec<&str> {
        match self {
            Prices::Single(_) => Vec::new(),
            Prices::BySize(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// A Product entity - template snapshot source for order pieces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: EntityId,

    /// Product title
    pub title: String,

    /// Estimated print time for one unit
    #[serde(default)]
    pub print_time_hours: f64,

    /// Filament requirements, one per part
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<PartRequirement>,

    /// Per-unit pricing
    #[serde(default, skip_serializing_if = "prices_is_empty")]
    pub prices: Prices,

    /// Owner id, if created by a known user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Soft-delete flag
    #[serde(default)]
    pub hidden: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

fn prices_is_empty(prices: &Prices) -> bool {
    matches!(prices, Prices::BySize(map) if map.is_empty())
}

impl Product {
    /// Create a new product with the given parameters
    pub fn new(title: impl Into<String>, print_time_hours: f64, owner: Option<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prod),
            title: title.into(),
            print_time_hours,
            parts: Vec::new(),
            prices: Prices::default(),
            owner,
            hidden: false,
            created: Utc::now(),
        }
    }

    /// Append a filament requirement
    pub fn add_part(&mut self, label: impl Into<String>, grams: f64) {
        self.parts.push(PartRequirement {
            label: label.into(),
            description: None,
            grams,
        });
    }
}

impl Entity for Product {
    const PREFIX: EntityPrefix = EntityPrefix::Prod;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_creation() {
        let mut prod = Product::new("Dragon egg", 4.5, Some("alice".to_string()));
        prod.add_part("shell", 42.0);
        prod.add_part("stand", 12.0);
        prod.prices = Prices::Single(15.0);

        assert!(prod.id.to_string().starts_with("PROD-"));
        assert_eq!(prod.parts.len(), 2);
        assert_eq!(prod.parts[0].label, "shell");
        assert_eq!(prod.prices.single(), Some(15.0));
    }

    #[test]
    fn test_single_price_serializes_as_number() {
        let mut prod = Product::new("Coaster", 0.5, None);
        prod.prices = Prices::Single(4.0);

        let yaml = serde_yml::to_string(&prod).unwrap();
        assert!(yaml.contains("prices: 4.0"));

        let parsed: Product = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.prices, Prices::Single(4.0));
    }

    #[test]
    fn test_size_prices_roundtrip() {
        let mut prod = Product::new("Planter", 3.0, None);
        prod.prices = Prices::BySize(BTreeMap::from([
            ("small".to_string(), 8.0),
            ("large".to_string(), 14.0),
        ]));

        let yaml = serde_yml::to_string(&prod).unwrap();
        let parsed: Product = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.prices.resolve(Some("small")), Some(8.0));
        assert_eq!(parsed.prices.resolve(Some("large")), Some(14.0));
        assert_eq!(parsed.prices.resolve(Some("medium")), None);
        assert_eq!(parsed.prices.resolve(None), None);
        assert_eq!(parsed.prices.single(), None);
    }

    #[test]
    fn test_has_any_price() {
        assert!(Prices::Single(5.0).has_any());
        assert!(!Prices::Single(0.0).has_any());
        assert!(!Prices::default().has_any());
        assert!(Prices::BySize(BTreeMap::from([("s".to_string(), 1.0)])).has_any());
    }

    #[test]
    fn test_product_roundtrip() {
        let mut prod = Product::new("Benchy", 2.0, None);
        prod.add_part("hull", 16.0);

        let yaml = serde_yml::to_string(&prod).unwrap();
        let parsed: Product = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.id, prod.id);
        assert_eq!(parsed.parts, prod.parts);
        assert_eq!(parsed.print_time_hours, 2.0);
    }
}
