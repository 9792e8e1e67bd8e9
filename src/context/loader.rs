//! Declarative context files: discovery and parsing.

use super::definition::ContextDefinition;
use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Structured-data formats accepted for context files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFileFormat {
    Yaml,
    Json,
    Toml,
}

impl ContextFileFormat {
    /// Format for a path, by extension (case-insensitive). None when unrecognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ContextFileFormat::Yaml),
            "json" => Some(ContextFileFormat::Json),
            "toml" => Some(ContextFileFormat::Toml),
            _ => None,
        }
    }

    pub fn parse(&self, content: &str) -> Result<ContextDefinition, String> {
        match self {
            ContextFileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ContextFileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ContextFileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// List context files in a directory (non-recursive), sorted by file name.
///
/// Files without a recognized extension are skipped.
pub fn context_files(directory: &Path) -> Result<Vec<PathBuf>, ApiError> {
    let entries = std::fs::read_dir(directory).map_err(|e| {
        ApiError::load_failure(directory, format!("Failed to read contexts directory: {}", e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ApiError::load_failure(directory, format!("Failed to read directory entry: {}", e))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if ContextFileFormat::from_path(&path).is_none() {
            tracing::debug!("Skipping non-context file {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Read and parse a single context file.
pub fn parse_context_file(path: &Path) -> Result<ContextDefinition, ApiError> {
    let format = ContextFileFormat::from_path(path)
        .ok_or_else(|| ApiError::load_failure(path, "Unrecognized context file extension"))?;

    let content = std::fs::read_to_string(path)
        .map_err(|e| ApiError::load_failure(path, format!("Failed to read file: {}", e)))?;

    format
        .parse(&content)
        .map_err(|e| ApiError::load_failure(path, format!("Failed to parse file: {}", e)))
}
