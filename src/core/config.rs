//! User and project configuration
//!
//! Project config lives at `.printdesk/config.yaml`; a user-level fallback
//! lives in the platform config directory. Environment variables win over
//! both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// Printdesk configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Author/owner id stamped onto created entities
    pub author: Option<String>,

    /// Editor command for `edit` subcommands
    pub editor: Option<String>,
}

impl Config {
    /// Load configuration: user-level config overlaid with project config
    pub fn load() -> Self {
        let mut config = Self::load_user().unwrap_or_default();
        if let Ok(project) = Project::discover() {
            if let Some(project_config) = Self::load_file(&project.config_file()) {
                config = config.merge(project_config);
            }
        }
        config
    }

    fn load_user() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "printdesk")?;
        Self::load_file(&dirs.config_dir().join("config.yaml"))
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    fn merge(self, over: Config) -> Config {
        Config {
            author: over.author.or(self.author),
            editor: over.editor.or(self.editor),
        }
    }

    /// The author id for new entities
    pub fn author(&self) -> String {
        std::env::var("PRINTDESK_AUTHOR")
            .ok()
            .or_else(|| self.author.clone())
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    /// The editor command
    pub fn editor(&self) -> String {
        std::env::var("EDITOR")
            .ok()
            .or_else(|| self.editor.clone())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Open `path` in the configured editor
    pub fn run_editor(&self, path: &Path) -> std::io::Result<()> {
        let status = std::process::Command::new(self.editor()).arg(path).status()?;
        if !status.success() {
            return Err(std::io::Error::other("editor exited with a failure status"));
        }
        Ok(())
    }
}

/// Path of the user-level config file, if the platform exposes one
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "printdesk")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
