// SPDX-License-Identifier: MIT OR Apache-2.0
//! Designer error type.

use openiot_request_graph::catalog::CatalogError;
use openiot_request_graph::document::DocumentError;
use openiot_request_graph::GraphError;

/// Error raised by a designer command
#[derive(Debug, thiserror::Error)]
pub enum DesignerError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Invalid settings: {0}")]
    SettingsDecode(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("RON error: {0}")]
    RonEncode(#[from] ron::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedSettingsVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Refused to replace an existing file
    #[error("{0:?} already exists, pass --force to overwrite")]
    AlreadyExists(std::path::PathBuf),

    /// Design document could not be loaded
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Sensor catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Design violates a graph invariant
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result alias for designer commands
pub type Result<T> = std::result::Result<T, DesignerError>;
