//! ZSF Export - command-line entry point
//!
//! Loads a TOML/JSON scene description and writes it as a Zaphod Scene File
//! manifest with one `.obj` sidecar per mesh object.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zsf_core::{ExportOptions, Exporter, FilenamePolicy, GeometryFormat, LensRadiusSource, Scene};

#[derive(Parser, Debug)]
#[command(name = "zsf-export")]
#[command(about = "Export a scene description as a Zaphod Scene File")]
#[command(version)]
struct Args {
    /// Scene description (.toml or .json)
    scene: PathBuf,

    /// Output manifest path (.zsf); sidecars are written next to it
    output: PathBuf,

    /// Path to configuration file
    #[arg(short, long, default_value = "zsf-export.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Sidecar body format
    #[arg(long, value_enum)]
    geometry: Option<GeometryArg>,

    /// Source of the camera lens radius
    #[arg(long, value_enum)]
    lens_radius: Option<LensRadiusArg>,

    /// Sidecar file naming policy
    #[arg(long, value_enum)]
    filenames: Option<FilenamesArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeometryArg {
    Empty,
    Obj,
}

impl From<GeometryArg> for GeometryFormat {
    fn from(arg: GeometryArg) -> Self {
        match arg {
            GeometryArg::Empty => Self::Empty,
            GeometryArg::Obj => Self::Obj,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LensRadiusArg {
    ActiveCamera,
    PerObject,
}

impl From<LensRadiusArg> for LensRadiusSource {
    fn from(arg: LensRadiusArg) -> Self {
        match arg {
            LensRadiusArg::ActiveCamera => Self::ActiveCamera,
            LensRadiusArg::PerObject => Self::PerObject,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilenamesArg {
    Verbatim,
    Reject,
    PercentEncode,
}

impl From<FilenamesArg> for FilenamePolicy {
    fn from(arg: FilenamesArg) -> Self {
        match arg {
            FilenamesArg::Verbatim => Self::Verbatim,
            FilenamesArg::Reject => Self::Reject,
            FilenamesArg::PercentEncode => Self::PercentEncode,
        }
    }
}

/// Command-line flags take precedence over the config file
fn resolve_options(config: &config::Config, args: &Args) -> ExportOptions {
    let mut options = config.export;
    if let Some(geometry) = args.geometry {
        options.geometry = geometry.into();
    }
    if let Some(lens_radius) = args.lens_radius {
        options.lens_radius = lens_radius.into();
    }
    if let Some(filenames) = args.filenames {
        options.filenames = filenames.into();
    }
    options
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("ZSF Export v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;
    let options = resolve_options(&config, &args);

    info!(
        geometry = ?options.geometry,
        lens_radius = ?options.lens_radius,
        filenames = ?options.filenames,
        "Export options resolved"
    );

    let scene = Scene::from_file(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let summary = Exporter::new(options)
        .export(&scene, &args.output)
        .with_context(|| format!("Failed to export to {}", args.output.display()))?;

    println!(
        "Wrote {}: {} materials, {} objects ({} meshes, {} cameras, {} other)",
        summary.manifest.display(),
        summary.materials,
        summary.objects(),
        summary.meshes,
        summary.cameras,
        summary.others
    );

    Ok(())
}
