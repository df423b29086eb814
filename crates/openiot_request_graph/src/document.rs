// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable snapshot of a graph model.
//!
//! Loading always rebuilds the model from scratch: nodes are re-added and
//! every edge is replayed through [`GraphModel::connect`], so structural
//! invariants are checked again and connection counters are recomputed.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::graph::GraphModel;
use crate::node::GraphNode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Error saving or loading a graph document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON decoding failed
    #[error("RON error: {0}")]
    RonDecode(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("RON error: {0}")]
    RonEncode(#[from] ron::Error),

    /// Written by a newer version
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// File extension is neither `.json` nor `.ron`
    #[error("Unknown document format: {0:?}")]
    UnknownFormat(std::path::PathBuf),

    /// Document content violates a graph invariant
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// On-disk encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON
    Json,
    /// RON
    Ron,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            _ => Err(DocumentError::UnknownFormat(path.to_path_buf())),
        }
    }
}

/// Saved application design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Application name
    #[serde(default)]
    pub name: String,
    /// Application description
    #[serde(default)]
    pub description: String,
    /// Whether the model accepts self-loops
    #[serde(default)]
    pub allow_self_loops: bool,
    /// Nodes, in insertion order
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// Edges, in insertion order
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Default for GraphDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            name: String::new(),
            description: String::new(),
            allow_self_loops: false,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl GraphDocument {
    /// Parse and version-check a document
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        let document: GraphDocument = match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Ron => ron::from_str(content)?,
        };

        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    /// Encode the document
    pub fn encode(&self, format: DocumentFormat) -> Result<String, DocumentError> {
        Ok(match format {
            DocumentFormat::Json => serde_json::to_string_pretty(self)?,
            DocumentFormat::Ron => {
                let config = ron::ser::PrettyConfig::default()
                    .struct_names(true)
                    .enumerate_arrays(false);
                ron::ser::to_string_pretty(self, config)?
            }
        })
    }

    /// Load a document, format chosen by extension
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let format = DocumentFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let document = Self::parse(&content, format)?;
        tracing::info!("Loaded design '{}' from {:?}", document.name, path);
        Ok(document)
    }

    /// Save a document, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let format = DocumentFormat::from_path(path)?;
        std::fs::write(path, self.encode(format)?)?;
        tracing::info!("Saved design '{}' to {:?}", self.name, path);
        Ok(())
    }
}

impl GraphModel {
    /// Snapshot the model
    pub fn to_document(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> GraphDocument {
        GraphDocument {
            version: DOCUMENT_FORMAT_VERSION,
            name: name.into(),
            description: description.into(),
            allow_self_loops: self.allows_self_loops(),
            nodes: self
                .nodes()
                .map(|node| {
                    let mut node = node.clone();
                    node.reset_connections();
                    node
                })
                .collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Rebuild a model from a document
    pub fn from_document(document: &GraphDocument) -> Result<Self, GraphError> {
        let mut graph = if document.allow_self_loops {
            GraphModel::with_self_loops()
        } else {
            GraphModel::new()
        };

        for node in &document.nodes {
            graph.add_node(node.clone())?;
        }
        for edge in &document.edges {
            graph.connect(
                &edge.source_node,
                &edge.source_endpoint,
                &edge.target_node,
                &edge.target_endpoint,
            )?;
        }
        Ok(graph)
    }
}
