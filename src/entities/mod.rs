//! Entity type definitions

pub mod filament;
pub mod order;
pub mod product;

pub use filament::{Filament, FilamentCatalog, FilamentType};
pub use order::{FulfillmentStatus, Order, PartSlot, Piece};
pub use product::{PartRequirement, Prices, Product};
