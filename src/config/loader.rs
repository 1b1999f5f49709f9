// ABOUTME: Loads methodology and athlete profile documents from JSON or YAML files
// ABOUTME: Picks the parser by file extension and schema-validates every document before returning it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use tri_planner_core::errors::{AppError, AppResult};
use tri_planner_core::models::{MethodologyConfig, UserProfile};

/// Document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Format implied by the path's extension
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a missing or unsupported extension
    pub fn from_path(path: &Path) -> AppResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(AppError::invalid_input(format!(
                "unsupported document format for {}: expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }

    /// Decode a document
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the text does not match the schema shape
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> AppResult<T> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| {
                AppError::serialization(format!("invalid JSON document: {e}")).with_source(e)
            }),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| {
                AppError::serialization(format!("invalid YAML document: {e}")).with_source(e)
            }),
        }
    }

    /// Encode a document
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails
    pub fn render<T: Serialize>(self, value: &T) -> AppResult<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| {
                AppError::serialization(format!("failed to encode YAML: {e}")).with_source(e)
            }),
        }
    }
}

/// Read a file, mapping a missing file to `ResourceNotFound`
pub(crate) fn read_document(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| {
        let error = if e.kind() == ErrorKind::NotFound {
            AppError::not_found(format!("document {}", path.display()))
        } else {
            AppError::storage(format!("failed to read {}: {e}", path.display())).with_source(e)
        };
        error.with_resource_id(path.display().to_string())
    })
}

/// Parse and schema-validate a methodology document
///
/// # Errors
///
/// Returns a serialization error for malformed text and a schema violation
/// when the document breaks a schema bound
pub fn parse_methodology_str(text: &str, format: DocumentFormat) -> AppResult<MethodologyConfig> {
    let methodology: MethodologyConfig = format.parse(text)?;
    methodology
        .validate()
        .map_err(|e| AppError::from(e).with_methodology_id(&methodology.id))?;
    Ok(methodology)
}

/// Parse and schema-validate an athlete profile document
///
/// # Errors
///
/// Returns a serialization error for malformed text and a schema violation
/// when the document breaks a schema bound
pub fn parse_profile_str(text: &str, format: DocumentFormat) -> AppResult<UserProfile> {
    let profile: UserProfile = format.parse(text)?;
    profile
        .validate()
        .map_err(|e| AppError::from(e).with_athlete_id(&profile.athlete_id))?;
    Ok(profile)
}

/// Load a methodology document from disk
///
/// # Errors
///
/// Returns `ResourceNotFound` for a missing file, and the errors of
/// [`parse_methodology_str`] for an invalid one
pub fn load_methodology(path: &Path) -> AppResult<MethodologyConfig> {
    let format = DocumentFormat::from_path(path)?;
    let methodology = parse_methodology_str(&read_document(path)?, format)?;
    debug!(
        path = %path.display(),
        methodology_id = %methodology.id,
        version = %methodology.version,
        "Loaded methodology"
    );
    Ok(methodology)
}

/// Load an athlete profile document from disk
///
/// # Errors
///
/// Returns `ResourceNotFound` for a missing file, and the errors of
/// [`parse_profile_str`] for an invalid one
pub fn load_profile(path: &Path) -> AppResult<UserProfile> {
    let format = DocumentFormat::from_path(path)?;
    let profile = parse_profile_str(&read_document(path)?, format)?;
    debug!(path = %path.display(), athlete_id = %profile.athlete_id, "Loaded profile");
    Ok(profile)
}

/// Methodology found in a directory
#[derive(Debug, Clone)]
pub struct MethodologyEntry {
    /// Source file
    pub path: PathBuf,
    /// Parsed document
    pub methodology: MethodologyConfig,
}

/// Load every valid methodology document in `dir`, sorted by id
///
/// Files that fail to parse are skipped with a warning.
///
/// # Errors
///
/// Returns a storage error if the directory cannot be read
pub fn list_methodologies(dir: &Path) -> AppResult<Vec<MethodologyEntry>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AppError::storage(format!("failed to read {}: {e}", dir.display())).with_source(e)
    })?;

    let mut found: Vec<MethodologyEntry> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| DocumentFormat::from_path(path).is_ok())
        .filter_map(|path| match load_methodology(&path) {
            Ok(methodology) => Some(MethodologyEntry { path, methodology }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping invalid methodology document");
                None
            }
        })
        .collect();
    found.sort_by(|a, b| a.methodology.id.cmp(&b.methodology.id));
    Ok(found)
}

/// Find a methodology by id in `dir`
///
/// # Errors
///
/// Returns `ResourceNotFound` when no valid document carries `id`
pub fn find_methodology(dir: &Path, id: &str) -> AppResult<MethodologyEntry> {
    list_methodologies(dir)?
        .into_iter()
        .find(|entry| entry.methodology.id == id)
        .ok_or_else(|| AppError::not_found(format!("methodology '{id}' in {}", dir.display())))
}
