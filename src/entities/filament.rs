//! Filament entity type - spool inventory with a per-kilogram cost

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::engine::totals::CostLookup;

/// Categorical filament attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum FilamentType {
    #[default]
    Normal,
    Multicolor,
    Silk,
    Matte,
    Speed,
}

impl std::fmt::Display for FilamentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilamentType::Normal => write!(f, "normal"),
            FilamentType::Multicolor => write!(f, "multicolor"),
            FilamentType::Silk => write!(f, "silk"),
            FilamentType::Matte => write!(f, "matte"),
            FilamentType::Speed => write!(f, "speed"),
        }
    }
}

impl std::str::FromStr for FilamentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(FilamentType::Normal),
            "multicolor" => Ok(FilamentType::Multicolor),
            "silk" => Ok(FilamentType::Silk),
            "matte" => Ok(FilamentType::Matte),
            "speed" => Ok(FilamentType::Speed),
            _ => Err(format!(
                "Invalid filament type: {}. Use normal, multicolor, silk, matte, or speed",
                s
            )),
        }
    }
}

/// A Filament entity - one spool type the shop can consume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filament {
    /// Unique identifier
    pub id: EntityId,

    /// Filament title (e.g. "Galaxy Black PLA")
    pub title: String,

    /// Manufacturer
    pub brand: String,

    /// Hex colors, or the special value "rainbow"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    /// Categorical attributes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<FilamentType>,

    /// Product page or reorder link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Cost per kilogram
    pub price_per_kilo: f64,

    /// Spools currently on the shelf
    #[serde(default)]
    pub num_spools_owned: u32,

    /// Cumulative kilograms used across prints
    #[serde(default)]
    pub total_used_kg: f64,

    /// Owner id, if created by a known user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Soft-delete flag
    #[serde(default)]
    pub hidden: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Filament {
    /// Create a new filament with the given parameters
    pub fn new(
        title: impl Into<String>,
        brand: impl Into<String>,
        price_per_kilo: f64,
        owner: Option<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Fil),
            title: title.into(),
            brand: brand.into(),
            colors: Vec::new(),
            types: Vec::new(),
            url: None,
            price_per_kilo,
            num_spools_owned: 0,
            total_used_kg: 0.0,
            owner,
            hidden: false,
            created: Utc::now(),
        }
    }
}

impl Entity for Filament {
    const PREFIX: EntityPrefix = EntityPrefix::Fil;

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

/// A loaded set of filaments; the inventory catalog the engine prices
/// against
#[derive(Debug, Clone, Default)]
pub struct FilamentCatalog {
    filaments: Vec<Filament>,
}

impl FilamentCatalog {
    pub fn new(filaments: Vec<Filament>) -> Self {
        Self { filaments }
    }

    /// Look up a filament by its full id string
    pub fn get(&self, id: &str) -> Option<&Filament> {
        self.filaments.iter().find(|f| f.id.to_string() == id)
    }

    /// Display title for a filament id, falling back to the raw id when
    /// the filament is unknown
    pub fn title_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|f| f.title.as_str()).unwrap_or(id)
    }

    /// Filaments that should appear in pickers and listings
    pub fn visible(&self) -> impl Iterator<Item = &Filament> {
        self.filaments.iter().filter(|f| !f.hidden)
    }

    pub fn is_empty(&self) -> bool {
        self.filaments.is_empty()
    }
}

impl CostLookup for FilamentCatalog {
    fn cost_per_kilo(&self, filament_id: &str) -> Option<f64> {
        self.get(filament_id).map(|f| f.price_per_kilo)
    }
}
