// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OpenIoT` request designer
//!
//! Command-line front end for application designs:
//! - Validate a saved design and list its diagnostics
//! - Generate and export the specification of a design
//! - List the node palette, including sensor sources from a catalog
//! - Write default designer settings
//!
//! ## Architecture
//!
//! Designs are loaded into a `DesignSession` from `openiot_request_graph`,
//! which owns all graph semantics. This binary only handles settings, files
//! and output.

mod commands;
mod error;
mod export;
mod settings;

use clap::{Parser, Subcommand};
use commands::{GenerateOptions, Outcome, PaletteOptions};
use export::ExportFormat;
use openiot_request_graph::catalog::LocationFilter;
use settings::DesignerSettings;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "openiot-designer")]
#[command(author, version, about = "Design, validate and generate OpenIoT applications")]
struct Cli {
    /// Designer settings file
    #[arg(long, global = true, default_value = settings::SETTINGS_FILE_NAME)]
    settings: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a design and print errors then warnings
    Validate {
        /// Design file (`.json` or `.ron`)
        design: PathBuf,
    },

    /// Generate the specification of a design
    Generate {
        /// Design file (`.json` or `.ron`)
        design: PathBuf,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List node templates grouped by type
    Palette {
        /// Sensor catalog (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Latitude of the location filter
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the location filter
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lon: f64,
        /// Radius of the location filter
        #[arg(long, default_value_t = 0.0)]
        radius: f64,
    },

    /// Write default settings
    Init {
        /// Settings file, `--settings` when omitted
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn run(cli: Cli) -> error::Result<Outcome> {
    let mut stdout = std::io::stdout().lock();
    let load_settings = || DesignerSettings::load_or_default(&cli.settings);

    match cli.command {
        Command::Validate { design } => commands::validate(&load_settings()?, &design, &mut stdout),
        Command::Generate { design, format, output } => {
            let options = GenerateOptions { format, output };
            commands::generate(&load_settings()?, &design, &options, &mut stdout)
        }
        Command::Palette { catalog, lat, lon, radius } => {
            let options = PaletteOptions {
                catalog,
                filter: LocationFilter { lat, lon, radius },
            };
            commands::palette(&load_settings()?, &options, &mut stdout)
        }
        Command::Init { path, force } => {
            let path = path.as_ref().unwrap_or(&cli.settings);
            commands::init(path, force, &mut stdout)
        }
    }
}

fn main() {
    // Logs go to stderr so exported specifications can be piped from stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "warn,openiot_request_designer=info,openiot_request_graph=info",
        )
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting OpenIoT designer v{}", env!("CARGO_PKG_VERSION"));

    match run(Cli::parse()) {
        Ok(Outcome::Success) => {}
        Ok(Outcome::Invalid) => std::process::exit(2),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
