//! Order entity type - a costed batch of product pieces for one customer
//!
//! An order snapshots product templates into pieces at add-time, so later
//! catalog edits never alter existing orders. Derived totals and the
//! fulfillment status are stored on the record and maintained by the
//! engine; they are never edited directly.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Totals bucket key for parts with no filament selected
pub const UNASSIGNED_KEY: &str = "unassigned";

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum FulfillmentStatus {
    /// Nothing printed yet
    #[default]
    NotStarted,
    /// Some, but not all, copies printed
    Printing,
    /// Every copy printed
    Printed,
    /// Handed over / closed out (explicit action only)
    Done,
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStatus::NotStarted => write!(f, "Not Started"),
            FulfillmentStatus::Printing => write!(f, "Printing"),
            FulfillmentStatus::Printed => write!(f, "Printed"),
            FulfillmentStatus::Done => write!(f, "Done"),
        }
    }
}

impl std::str::FromStr for FulfillmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "not started" => Ok(FulfillmentStatus::NotStarted),
            "printing" => Ok(FulfillmentStatus::Printing),
            "printed" => Ok(FulfillmentStatus::Printed),
            "done" => Ok(FulfillmentStatus::Done),
            _ => Err(format!(
                "Invalid status: {}. Use not-started, printing, printed, or done",
                s
            )),
        }
    }
}

/// One filament requirement inside a piece, copied from the product
/// template and unassigned until a filament id is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSlot {
    /// Label copied from the template (e.g. "body", "lid")
    pub label: String,

    /// Grams of filament one copy of the piece needs for this part
    pub required_grams: f64,

    /// Chosen filament id, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament_id: Option<String>,
}

/// One product instance (with quantity) inside an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Id of the product template this piece was created from
    pub product_id: String,

    /// Title snapshot taken at add-time
    pub product_title: String,

    /// How many copies of the product this piece represents
    pub quantity: u32,

    /// Per-unit sale price, if one has been set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Filament requirements, in template order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<PartSlot>,
}

/// Derived consumption and cost for one filament across the whole order
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilamentTotal {
    pub total_grams: f64,
    pub total_cost: f64,
}

/// An Order entity - the persisted aggregate of pieces, derived totals,
/// and fulfillment progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: EntityId,

    /// Order title
    pub title: String,

    /// Optional delivery date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Owner id, if the order was created by a known user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Soft-delete flag; hidden orders stay on disk and addressable by id
    #[serde(default)]
    pub hidden: bool,

    /// Fulfillment status, maintained by the state machine
    #[serde(default)]
    pub status: FulfillmentStatus,

    /// The piece tree, maintained by the composer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pieces: Vec<Piece>,

    /// Derived per-filament totals ("unassigned" collects unselected parts)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub totals_by_filament: BTreeMap<String, FilamentTotal>,

    /// Derived: sum of unit_price * quantity over priced pieces
    #[serde(default)]
    pub revenue: f64,

    /// Derived filament cost; None means "unknown" (no part has an
    /// assigned filament with a known cost), which is not the same as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<f64>,

    /// Derived: revenue minus expenses when expenses are known
    #[serde(default)]
    pub profit: f64,

    /// Copies printed so far, keyed by piece position
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub printed_counts: BTreeMap<usize, u32>,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Order {
    /// Create an empty order: Not Started, no pieces, zeroed totals
    pub fn new(title: impl Into<String>, owner: Option<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ord),
            title: title.into(),
            due_date: None,
            owner,
            hidden: false,
            status: FulfillmentStatus::default(),
            pieces: Vec::new(),
            totals_by_filament: BTreeMap::new(),
            revenue: 0.0,
            expenses: None,
            profit: 0.0,
            printed_counts: BTreeMap::new(),
            created: Utc::now(),
        }
    }

    /// Copies printed for the piece at `index` (0 when never recorded)
    pub fn printed_count(&self, index: usize) -> u32 {
        self.printed_counts.get(&index).copied().unwrap_or(0)
    }
}

impl Entity for Order {
    const PREFIX: EntityPrefix = EntityPrefix::Ord;

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
    fn test_new_order_defaults() {
        let order = Order::new("Craft fair batch", Some("alice".to_string()));

        assert!(order.id.to_string().starts_with("ORD-"));
        assert_eq!(order.status, FulfillmentStatus::NotStarted);
        assert!(order.pieces.is_empty());
        assert!(order.printed_counts.is_empty());
        assert!(order.totals_by_filament.is_empty());
        assert_eq!(order.revenue, 0.0);
        assert_eq!(order.expenses, None);
        assert_eq!(order.profit, 0.0);
        assert!(!order.hidden);
    }

    #[test]
    fn test_status_serialization() {
        let mut order = Order::new("Test", None);
        order.status = FulfillmentStatus::NotStarted;

        let yaml = serde_yml::to_string(&order).unwrap();
        assert!(yaml.contains("status: not_started"));
    }

    #[test]
    fn test_status_parse_accepts_separators() {
        assert_eq!(
            "not-started".parse::<FulfillmentStatus>().unwrap(),
            FulfillmentStatus::NotStarted
        );
        assert_eq!(
            "Not Started".parse::<FulfillmentStatus>().unwrap(),
            FulfillmentStatus::NotStarted
        );
        assert_eq!(
            "done".parse::<FulfillmentStatus>().unwrap(),
            FulfillmentStatus::Done
        );
        assert!("finished".parse::<FulfillmentStatus>().is_err());
    }

    #[test]
    fn test_order_roundtrip() {
        let mut order = Order::new("Dragon eggs", None);
        order.pieces.push(Piece {
            product_id: "PROD-TEST".to_string(),
            product_title: "Dragon egg".to_string(),
            quantity: 3,
            unit_price: Some(12.5),
            parts: vec![PartSlot {
                label: "shell".to_string(),
                required_grams: 42.0,
                filament_id: None,
            }],
        });
        order.printed_counts.insert(0, 2);
        order.status = FulfillmentStatus::Printing;

        let yaml = serde_yml::to_string(&order).unwrap();
        let parsed: Order = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.id, order.id);
        assert_eq!(parsed.pieces, order.pieces);
        assert_eq!(parsed.printed_counts, order.printed_counts);
        assert_eq!(parsed.status, FulfillmentStatus::Printing);
    }

    #[test]
    fn test_printed_count_defaults_to_zero() {
        let order = Order::new("Empty", None);
        assert_eq!(order.printed_count(0), 0);
        assert_eq!(order.printed_count(7), 0);
    }
}
