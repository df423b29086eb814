// SPDX-License-Identifier: MIT OR Apache-2.0
//! Designer settings and configuration.
//!
//! Settings live in a RON file next to the designs:
//! - Application metadata used when a design carries none
//! - Validation root types
//! - Model options
//! - Export defaults
//! - Sensor catalog location

use crate::error::{DesignerError, Result};
use crate::export::ExportFormat;
use openiot_request_graph::node::SOURCE;
use openiot_request_graph::Validator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "designer.ron";

/// Application metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    /// Application name
    pub name: String,
    /// Application description
    pub description: String,
}

impl Default for ApplicationMetadata {
    fn default() -> Self {
        Self {
            name: "Untitled application".to_string(),
            description: String::new(),
        }
    }
}

/// Validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Node types that may stand alone without an orphan warning
    pub root_types: Vec<String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            root_types: vec![SOURCE.to_string()],
        }
    }
}

/// Graph model settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Accept edges from a node to itself
    pub allow_self_loops: bool,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Format used when the command line names none
    pub default_format: ExportFormat,
    /// Directory receiving exports when no output path is given.
    /// Exports go to stdout when unset.
    pub output_dir: Option<PathBuf>,
}

/// Complete designer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignerSettings {
    /// Format version
    pub version: u32,
    /// Application metadata
    #[serde(default)]
    pub metadata: ApplicationMetadata,
    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSettings,
    /// Model settings
    #[serde(default)]
    pub model: ModelSettings,
    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,
    /// Sensor catalog used by the palette
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

impl Default for DesignerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            metadata: ApplicationMetadata::default(),
            validation: ValidationSettings::default(),
            model: ModelSettings::default(),
            export: ExportSettings::default(),
            catalog: None,
        }
    }
}

impl DesignerSettings {
    /// Parse and version-check settings
    pub fn parse(content: &str) -> Result<Self> {
        let settings: DesignerSettings = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(DesignerError::UnsupportedSettingsVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Encode settings as pretty RON
    pub fn encode(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::parse(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.encode()?)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Validator configured from these settings
    pub fn validator(&self) -> Validator {
        Validator::with_root_types(self.validation.root_types.iter().cloned())
    }
}
