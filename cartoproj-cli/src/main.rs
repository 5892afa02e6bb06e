//! Point d'entrée CLI pour cartoproj

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use cartoproj::Direction;

// Charger .env au démarrage ; l'échec est journalisé une fois le logging prêt
fn load_env() -> Option<dotenvy::Error> {
    // Chercher .env dans le répertoire courant ou parent
    let Err(cwd_error) = dotenvy::dotenv() else {
        return None;
    };
    // Essayer depuis le répertoire du binaire
    match std::env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => load_env_from(dir),
            None => Some(cwd_error),
        },
        Err(_) => Some(cwd_error),
    }
}

fn load_env_from(dir: &Path) -> Option<dotenvy::Error> {
    dotenvy::from_path(dir.join(".env")).err()
}

mod cli;

use cli::Commands;

/// Projeter des données GeoJSON entre coordonnées géographiques et projections cartographiques
#[derive(Parser)]
#[command(name = "cartoproj")]
#[command(author, version)]
#[command(about = "Projeter des données GeoJSON (forward/inverse) avec une projection WKT, un preset ou une configuration JSON")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    let env_error = load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);
    if let Some(e) = env_error {
        debug!(error = %e, "No .env file loaded");
    }

    match &cli.command {
        Commands::Forward(args) => {
            debug!("Forward transform");
            cli::cmd_transform(args, Direction::Forward)?;
        }
        Commands::Inverse(args) => {
            debug!("Inverse transform");
            cli::cmd_transform(args, Direction::Inverse)?;
        }
        Commands::Describe { source } => cli::cmd_describe(source)?,
        Commands::Ellipsoids => cli::cmd_ellipsoids()?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Les logs vont sur stderr : stdout porte les données
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
