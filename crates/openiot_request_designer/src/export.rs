// SPDX-License-Identifier: MIT OR Apache-2.0
//! Specification export.

use crate::error::Result;
use openiot_request_graph::Specification;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output encoding of an exported specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ExportFormat {
    /// Human-readable statement listing
    #[default]
    Text,
    /// JSON document
    Json,
    /// RON document
    Ron,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Ron => "ron",
        }
    }
}

/// Encode a specification
pub fn render(spec: &Specification, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Text => spec.render(),
        ExportFormat::Json => spec.to_json()?,
        ExportFormat::Ron => spec.to_ron()?,
    })
}

/// Export path for a design inside an output directory
pub fn output_path(dir: &Path, design: &Path, format: ExportFormat) -> PathBuf {
    let stem = design.file_stem().map_or_else(|| "specification".into(), |s| s.to_string_lossy());
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Write an encoded specification to a file, or to `out` when no path is given
pub fn write(
    spec: &Specification,
    format: ExportFormat,
    path: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let content = render(spec, format)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            tracing::info!("Exported '{}' to {:?}", spec.name, path);
        }
        None => writeln!(out, "{content}")?,
    }
    Ok(())
}
