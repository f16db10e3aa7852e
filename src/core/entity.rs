//! Entity trait - common interface for all entity types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all printdesk entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (FIL, PROD, ORD)
    const PREFIX: EntityPrefix;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's title
    fn title(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Whether the entity is soft-deleted
    fn hidden(&self) -> bool;

    /// Mark or unmark the entity as soft-deleted
    fn set_hidden(&mut self, hidden: bool);
}
