//! Project discovery and directory layout
//!
//! A printdesk project is any directory containing a `.printdesk/` marker.
//! Entities live as `<ID>.pd.yaml` files under `filaments/`, `products/`,
//! and `orders/` at the project root.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::identity::EntityPrefix;

/// Marker directory that identifies a project root
const MARKER_DIR: &str = ".printdesk";

/// File suffix for entity files
pub const ENTITY_FILE_SUFFIX: &str = ".pd.yaml";

/// Errors from project discovery and initialization
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not inside a printdesk project (no .printdesk directory found above {})", .0.display())]
    NotFound(PathBuf),

    #[error("a printdesk project already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered printdesk project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Initialize a new project at `dir`, creating the marker and entity
    /// directories and a commented default config file.
    pub fn init(dir: &Path) -> Result<Self, ProjectError> {
        let marker = dir.join(MARKER_DIR);
        if marker.exists() {
            return Err(ProjectError::AlreadyInitialized(dir.to_path_buf()));
        }

        fs::create_dir_all(&marker)?;
        for prefix in [EntityPrefix::Fil, EntityPrefix::Prod, EntityPrefix::Ord] {
            let project = Self {
                root: dir.to_path_buf(),
            };
            fs::create_dir_all(project.entity_dir(prefix))?;
        }

        let config = marker.join("config.yaml");
        if !config.exists() {
            fs::write(
                &config,
                "# printdesk project configuration\n\
                 # author: your-name\n\
                 # editor: nvim\n",
            )?;
        }

        Ok(Self {
            root: dir.to_path_buf(),
        })
    }

    /// Discover the project containing the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Discover the project containing `start`, walking up its ancestors
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        for dir in start.ancestors() {
            if dir.join(MARKER_DIR).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
        }
        Err(ProjectError::NotFound(start.to_path_buf()))
    }

    /// The project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the project config file
    pub fn config_file(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("config.yaml")
    }

    /// Path to the per-user entity index
    pub fn users_file(&self) -> PathBuf {
        self.root.join(MARKER_DIR).join("users.yaml")
    }

    /// Storage directory for an entity type
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        let dir = match prefix {
            EntityPrefix::Fil => "filaments",
            EntityPrefix::Prod => "products",
            EntityPrefix::Ord => "orders",
        };
        self.root.join(dir)
    }

    /// All entity files of one type, sorted by path for stable listings
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> Vec<PathBuf> {
        let dir = self.entity_dir(prefix);
        if !dir.exists() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(ENTITY_FILE_SUFFIX))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(tmp.path().join(".printdesk/config.yaml").exists());
        assert!(project.entity_dir(EntityPrefix::Fil).exists());
        assert!(project.entity_dir(EntityPrefix::Prod).exists());
        assert!(project.entity_dir(EntityPrefix::Ord).exists());
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = tempfile::tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        assert!(matches!(
            Project::init(tmp.path()),
            Err(ProjectError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        let sub = tmp.path().join("orders");

        let project = Project::discover_from(&sub).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound(_))
        ));
    }
}
