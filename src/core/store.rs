//! Entity store - the persistence collaborator
//!
//! Typed save/load/list over the project's entity directories, plus the
//! per-user index that records which filaments, products, and orders an
//! owner has created. Writes are whole-file rewrites; the last writer wins
//! at the record level.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, ENTITY_FILE_SUFFIX};
use crate::yaml::{self, YamlError};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no {kind} found matching '{query}'")]
    NotFound { kind: &'static str, query: String },

    #[error("ambiguous {kind} query '{query}' ({count} matches); use a longer id prefix")]
    Ambiguous {
        kind: &'static str,
        query: String,
        count: usize,
    },

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn kind_name(prefix: EntityPrefix) -> &'static str {
    match prefix {
        EntityPrefix::Fil => "filament",
        EntityPrefix::Prod => "product",
        EntityPrefix::Ord => "order",
    }
}

/// Path an entity is stored at
fn entity_path<T: Entity>(project: &Project, entity: &T) -> PathBuf {
    project
        .entity_dir(T::PREFIX)
        .join(format!("{}{}", entity.id(), ENTITY_FILE_SUFFIX))
}

/// Write an entity to its file, creating or overwriting it
pub fn save<T: Entity>(project: &Project, entity: &T) -> Result<PathBuf, StoreError> {
    let path = entity_path(project, entity);
    yaml::write_yaml_file(&path, entity)?;
    Ok(path)
}

/// Load every parsable entity of one type, warning on files that fail to
/// parse rather than aborting the whole listing
pub fn list<T: Entity>(project: &Project) -> Vec<T> {
    let mut entities = Vec::new();
    for path in project.iter_entity_files(T::PREFIX) {
        match yaml::parse_yaml_file::<T>(&path) {
            Ok(entity) => entities.push(entity),
            Err(e) => eprintln!("! skipping {}: {}", path.display(), e),
        }
    }
    entities
}

/// Find one entity by id prefix, or fall back to a case-insensitive title
/// substring match. Exactly one match is required.
pub fn load<T: Entity>(project: &Project, query: &str) -> Result<(T, PathBuf), StoreError> {
    let kind = kind_name(T::PREFIX);
    let mut matches: Vec<(T, PathBuf)> = Vec::new();

    for path in project.iter_entity_files(T::PREFIX) {
        let stem = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(ENTITY_FILE_SUFFIX))
            .unwrap_or("");
        if stem.starts_with(query) {
            matches.push((yaml::parse_yaml_file::<T>(&path)?, path));
        }
    }

    // No id match: fall back to fuzzy title search
    if matches.is_empty() {
        let needle = query.to_lowercase();
        for path in project.iter_entity_files(T::PREFIX) {
            if let Ok(entity) = yaml::parse_yaml_file::<T>(&path) {
                if entity.title().to_lowercase().contains(&needle) {
                    matches.push((entity, path));
                }
            }
        }
    }

    match matches.len() {
        0 => Err(StoreError::NotFound {
            kind,
            query: query.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(StoreError::Ambiguous {
            kind,
            query: query.to_string(),
            count,
        }),
    }
}

/// Soft-delete an entity: rewrite it with `hidden: true`
pub fn hide<T: Entity>(project: &Project, query: &str) -> Result<(T, PathBuf), StoreError> {
    let (mut entity, path) = load::<T>(project, query)?;
    entity.set_hidden(true);
    yaml::write_yaml_file(&path, &entity)?;
    Ok((entity, path))
}

// =========================================================================
// Per-user index
// =========================================================================

/// The entity ids one owner has created, in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filaments: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<String>,
}

/// Index of owners to the entities they created. Appends are idempotent:
/// an id is never listed twice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserIndex {
    pub users: BTreeMap<String, UserRecord>,
}

impl UserIndex {
    /// Load the index, or start empty if the file does not exist
    pub fn load(project: &Project) -> Result<Self, StoreError> {
        let path = project.users_file();
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(yaml::parse_yaml_file(&path)?)
    }

    /// Write the index back to the project
    pub fn save(&self, project: &Project) -> Result<(), StoreError> {
        yaml::write_yaml_file(&project.users_file(), self)?;
        Ok(())
    }

    /// Record an entity id under its owner
    pub fn append(&mut self, owner: &str, prefix: EntityPrefix, id: &str) {
        let record = self.users.entry(owner.to_string()).or_default();
        let list = match prefix {
            EntityPrefix::Fil => &mut record.filaments,
            EntityPrefix::Prod => &mut record.products,
            EntityPrefix::Ord => &mut record.orders,
        };
        if !list.iter().any(|existing| existing == id) {
            list.push(id.to_string());
        }
    }

    /// The order ids recorded for an owner
    pub fn orders_of(&self, owner: &str) -> &[String] {
        self.users
            .get(owner)
            .map(|record| record.orders.as_slice())
            .unwrap_or(&[])
    }
}
