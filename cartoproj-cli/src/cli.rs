//! Définition et implémentation des commandes CLI
//!
//! - `forward`: GeoJSON géographique (degrés) → coordonnées projetées
//! - `inverse`: coordonnées projetées → GeoJSON géographique (degrés)
//! - `describe`: WKT et paramètres d'une projection
//! - `ellipsoids`: registre des ellipsoïdes

use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;

use cartoproj::{format_projection, Direction, Ellipsoid, Family, Projection};
use cartoproj_cli::config::{load_wkt, parse_line_type, Config, ProjectionConfig};
use cartoproj_cli::export::{geojson::write_feature_collection, wkt::write_wkt_lines};
use cartoproj_cli::export::{export_to_geojson, export_to_wkt};
use cartoproj_cli::transform::{read_features, transform_features};

#[derive(Subcommand)]
pub enum Commands {
    /// Project geographic GeoJSON (degrees) to planar coordinates
    Forward(TransformArgs),

    /// Unproject planar GeoJSON back to geographic coordinates (degrees)
    Inverse(TransformArgs),

    /// Print the WKT and the parameters of a projection
    Describe {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the known ellipsoids
    Ellipsoids,
}

/// Source de la projection : WKT, preset ou fichier de configuration
#[derive(Args)]
pub struct SourceArgs {
    /// Path to a .prj file, or a literal WKT string
    #[arg(long, group = "source")]
    wkt: Option<String>,

    /// Built-in preset (world-mercator, world-miller, world-equal-area, world-robinson,
    /// utm-31n, europe-omerc, north-polar-ortho, south-polar-stereo, europe-lcc, usa-albers)
    #[arg(long, group = "source")]
    preset: Option<String>,

    /// Path to a JSON file of named projections (use with --name)
    #[arg(long, group = "source", requires = "name")]
    config: Option<PathBuf>,

    /// Entry to use in the --config file
    #[arg(long)]
    name: Option<String>,

    /// Segment interpretation: straight, rhumb or great-circle
    #[arg(long)]
    line_type: Option<String>,
}

#[derive(Args)]
pub struct TransformArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Input GeoJSON file ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
    format: OutputFormat,

    /// Coordinate precision (decimal places). Default: 7 for degrees (~1cm), 2 for projected units
    #[arg(long)]
    precision: Option<u8>,

    /// Write the JSON transform report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Geojson,
    Wkt,
}

impl SourceArgs {
    /// Construit la projection demandée, avec l'éventuel type de ligne
    pub fn projection(&self) -> Result<Projection> {
        let projection = if let Some(wkt) = &self.wkt {
            load_wkt(wkt)?
        } else if let Some(preset) = &self.preset {
            ProjectionConfig::from_preset(preset)?.build()?
        } else if let Some(path) = &self.config {
            let name = self
                .name
                .as_deref()
                .context("--name is required with --config")?;
            Config::load(path)?.get(name)?.build()?
        } else {
            anyhow::bail!("A projection is required: use --wkt, --preset or --config");
        };

        match &self.line_type {
            Some(line_type) => Ok(projection.with_line_type(parse_line_type(line_type)?)),
            None => Ok(projection),
        }
    }
}

/// Exécute `forward` ou `inverse`
pub fn cmd_transform(args: &TransformArgs, direction: Direction) -> Result<()> {
    let projection = args.source.projection()?;

    // Degrés : 7 décimales ≈ 1 cm ; unités projetées : 2 décimales
    let angular_output = direction == Direction::Inverse || projection.family() == Family::Geographic;
    let precision = args
        .precision
        .unwrap_or_else(|| if angular_output { 7 } else { 2 });

    let text = read_input(&args.input)?;
    let features = read_features(&text)?;

    let (output, report) = transform_features(features, &projection, direction, precision);

    match (&args.output, args.format) {
        (Some(path), OutputFormat::Geojson) => export_to_geojson(&output, path)?,
        (Some(path), OutputFormat::Wkt) => export_to_wkt(&output, path)?,
        (None, format) => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            match format {
                OutputFormat::Geojson => {
                    write_feature_collection(&mut writer, &output)?;
                    writeln!(writer)?;
                }
                OutputFormat::Wkt => write_wkt_lines(&mut writer, &output)?,
            }
            writer.flush()?;
        }
    }

    if let Some(path) = &args.report {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
    }

    info!("{}", report.summary());
    if args.output.is_some() {
        report.display();
    }

    Ok(())
}

/// Exécute `describe`
pub fn cmd_describe(source: &SourceArgs) -> Result<()> {
    let projection = source.projection()?;
    let params = projection.parameters();
    let ellipsoid = projection.ellipsoid();

    let parameters: serde_json::Map<String, serde_json::Value> = params
        .iter()
        .map(|(name, value)| (name.to_string(), json!(value)))
        .collect();
    let description = json!({
        "name": projection.name(),
        "family": format!("{:?}", projection.family()),
        "ellipsoid": {
            "name": ellipsoid.name(),
            "semi_major_axis": ellipsoid.semi_major_axis(),
            "inverse_flattening": ellipsoid.inverse_flattening(),
        },
        "angular_unit": params.angular_unit().name(),
        "linear_unit": projection.linear_unit().map(|u| u.name()),
        "line_type": projection.line_type().name(),
        "parameters": parameters,
    });

    println!("{}", format_projection(&projection)?);
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}

/// Exécute `ellipsoids`
pub fn cmd_ellipsoids() -> Result<()> {
    for ellipsoid in Ellipsoid::all() {
        let inverse_flattening = if ellipsoid.is_sphere() {
            "sphere".to_string()
        } else {
            format!("{:.9}", ellipsoid.inverse_flattening())
        };
        println!(
            "{:<32} a={:<14.3} 1/f={}",
            ellipsoid.name(),
            ellipsoid.semi_major_axis(),
            inverse_flattening
        );
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).context(format!("Failed to read input: {}", path.display()))
}
