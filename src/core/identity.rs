//! Entity identity - prefixed ULID identifiers
//!
//! Every entity id is a type prefix joined to a ULID, e.g.
//! `FIL-01J8ZK3V9W5X2Y7Q4R6T8U0A1B`. The prefix makes ids self-describing
//! in listings, files, and cross-references.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    /// Filament spool type (inventory)
    Fil,
    /// Product template
    Prod,
    /// Customer order
    Ord,
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityPrefix::Fil => write!(f, "FIL"),
            EntityPrefix::Prod => write!(f, "PROD"),
            EntityPrefix::Ord => write!(f, "ORD"),
        }
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIL" => Ok(EntityPrefix::Fil),
            "PROD" => Ok(EntityPrefix::Prod),
            "ORD" => Ok(EntityPrefix::Ord),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

/// Errors from parsing an entity id string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("entity id '{0}' is missing a prefix (expected PREFIX-ULID)")]
    MissingPrefix(String),

    #[error("unknown entity prefix '{0}' (expected FIL, PROD, or ORD)")]
    UnknownPrefix(String),

    #[error("entity id '{0}' does not contain a valid ULID")]
    InvalidUlid(String),
}

/// A unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh id for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Parse a full `PREFIX-ULID` id string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        let prefix = prefix.parse::<EntityPrefix>()?;
        let ulid =
            Ulid::from_string(rest).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }

    /// The entity type prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntityId::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_has_prefix() {
        let id = EntityId::new(EntityPrefix::Fil);
        assert!(id.to_string().starts_with("FIL-"));
        assert_eq!(id.prefix(), EntityPrefix::Fil);
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = EntityId::new(EntityPrefix::Ord);
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert_eq!(
            EntityId::parse("01J8ZK3V9W5X2Y7Q4R6T8U0A1B"),
            Err(IdParseError::MissingPrefix(
                "01J8ZK3V9W5X2Y7Q4R6T8U0A1B".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        let err = EntityId::parse("XYZ-01J8ZK3V9W5X2Y7Q4R6T8U0A1B").unwrap_err();
        assert_eq!(err, IdParseError::UnknownPrefix("XYZ".to_string()));
    }

    #[test]
    fn test_parse_rejects_bad_ulid() {
        let err = EntityId::parse("FIL-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_)));
    }

    #[test]
    fn test_serde_as_string() {
        let id = EntityId::new(EntityPrefix::Prod);
        let yaml = serde_yml::to_string(&id).unwrap();
        assert!(yaml.trim().starts_with("PROD-"));
        let parsed: EntityId = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(id, parsed);
    }
}
