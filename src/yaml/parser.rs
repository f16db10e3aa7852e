//! YAML parsing with error handling

use std::path::Path;

use miette::Diagnostic;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors from reading or writing entity YAML
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error("failed to parse {filename}: {message}")]
    Syntax { filename: String, message: String },

    #[error("failed to serialize {filename}: {message}")]
    Serialize { filename: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse YAML content into a typed value with the filename kept for messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| YamlError::Syntax {
        filename: filename.to_string(),
        message: e.to_string(),
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}

/// Serialize a value and write it to a file path
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let content = serde_yml::to_string(value).map_err(|e| YamlError::Serialize {
        filename: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, content)?;
    Ok(())
}
