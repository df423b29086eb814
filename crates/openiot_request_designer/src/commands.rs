// SPDX-License-Identifier: MIT OR Apache-2.0
//! Designer command implementations.
//!
//! Each command writes its report to the given stream and returns whether
//! the design it looked at was acceptable.

use crate::error::{DesignerError, Result};
use crate::export::{self, ExportFormat};
use crate::settings::DesignerSettings;
use openiot_request_graph::builtin::builtin_registry;
use openiot_request_graph::catalog::{LocationFilter, SensorCatalog};
use openiot_request_graph::{DesignSession, GenerateError, GraphDocument, ValidationReport};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of a command that inspects a design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed
    Success,
    /// The design has validation errors
    Invalid,
}

/// Options of the `generate` command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Output format, settings default when unset
    pub format: Option<ExportFormat>,
    /// Output file, settings output directory or stdout when unset
    pub output: Option<PathBuf>,
}

/// Options of the `palette` command
#[derive(Debug, Clone, Default)]
pub struct PaletteOptions {
    /// Sensor catalog, settings catalog when unset
    pub catalog: Option<PathBuf>,
    /// Location filter applied to sensor sources
    pub filter: LocationFilter,
}

/// Session configured from settings and loaded with a design
fn open_session(settings: &DesignerSettings, document: &GraphDocument) -> Result<DesignSession> {
    let mut document = document.clone();
    document.allow_self_loops |= settings.model.allow_self_loops;
    if document.name.is_empty() {
        document.name.clone_from(&settings.metadata.name);
    }
    if document.description.is_empty() {
        document.description.clone_from(&settings.metadata.description);
    }

    let mut session = DesignSession::new(builtin_registry(), settings.validator());
    session.load_document(&document)?;
    Ok(session)
}

fn print_report(report: &ValidationReport, out: &mut dyn Write) -> Result<()> {
    for diagnostic in report.iter() {
        writeln!(out, "{diagnostic}")?;
    }
    writeln!(
        out,
        "{} error(s), {} warning(s)",
        report.errors().len(),
        report.warnings().len()
    )?;
    Ok(())
}

/// Validate a loaded design
pub fn validate_document(
    settings: &DesignerSettings,
    document: &GraphDocument,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let mut session = open_session(settings, document)?;
    let report = session.validate();
    print_report(report, out)?;
    Ok(if report.has_errors() { Outcome::Invalid } else { Outcome::Success })
}

/// Validate a design file
pub fn validate(
    settings: &DesignerSettings,
    design: &Path,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let document = GraphDocument::load(design)?;
    validate_document(settings, &document, out)
}

/// Generate and export the specification of a loaded design
pub fn generate_document(
    settings: &DesignerSettings,
    document: &GraphDocument,
    output: Option<&Path>,
    format: ExportFormat,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let mut session = open_session(settings, document)?;
    let name = session.name.clone();
    match session.generate() {
        Ok(spec) => {
            for warning in &spec.warnings {
                tracing::warn!("{warning}");
            }
            export::write(spec, format, output, out)?;
            Ok(Outcome::Success)
        }
        Err(GenerateError::ValidationFailed { errors }) => {
            tracing::error!("Generation of '{}' failed with {} error(s)", name, errors.len());
            for error in &errors {
                writeln!(out, "{error}")?;
            }
            Ok(Outcome::Invalid)
        }
    }
}

/// Generate and export the specification of a design file
pub fn generate(
    settings: &DesignerSettings,
    design: &Path,
    options: &GenerateOptions,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let document = GraphDocument::load(design)?;
    let format = options.format.unwrap_or(settings.export.default_format);
    let output = options.output.clone().or_else(|| {
        settings
            .export
            .output_dir
            .as_deref()
            .map(|dir| export::output_path(dir, design, format))
    });
    generate_document(settings, &document, output.as_deref(), format, out)
}

/// List the node palette
pub fn palette(
    settings: &DesignerSettings,
    options: &PaletteOptions,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let mut session = DesignSession::new(builtin_registry(), settings.validator());
    session.set_location_filter(options.filter);
    if let Some(path) = options.catalog.as_ref().or(settings.catalog.as_ref()) {
        let catalog = SensorCatalog::load(path)?;
        session.update_available_sensors(&catalog);
    }
    write_palette(&session, out)?;
    Ok(Outcome::Success)
}

fn write_palette(session: &DesignSession, out: &mut dyn Write) -> Result<()> {
    for (node_type, items) in session.palette() {
        if items.is_empty() {
            continue;
        }
        writeln!(out, "{node_type}")?;
        for item in items {
            writeln!(out, "  {:<28} {:<24} {}", item.key, item.label, item.description)?;
        }
    }
    Ok(())
}

/// Write default settings
pub fn init(path: &Path, force: bool, out: &mut dyn Write) -> Result<Outcome> {
    if path.exists() && !force {
        return Err(DesignerError::AlreadyExists(path.to_path_buf()));
    }
    DesignerSettings::default().save(path)?;
    writeln!(out, "Wrote default settings to {}", path.display())?;
    Ok(Outcome::Success)
}
