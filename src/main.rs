use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghost_points::plugin::{ActionId, ActionOutcome, GhostPoints};
use ghost_points::status::StatusReport;
use ghost_points::terminal::TerminalNotifier;
use ghost_points::{shell, PluginConfig};
use ghost_points_core::db::Database;
use ghost_points_core::layer::MapLayer;
use ghost_points_core::models::{FeatureId, GeometryKind};
use ghost_points_core::{SqliteLayer, VisibilityManager};

#[derive(Parser)]
#[command(name = "ghost-points")]
#[command(about = "Hide selected point features and reveal them later")]
struct Cli {
    /// Database file holding the layers (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Geometry {
    Point,
    Line,
    Polygon,
}

impl From<Geometry> for GeometryKind {
    fn from(value: Geometry) -> Self {
        match value {
            Geometry::Point => Self::Point,
            Geometry::Line => Self::Line,
            Geometry::Polygon => Self::Polygon,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a layer table
    Init {
        table: String,

        #[arg(short, long, value_enum, default_value = "point")]
        geometry: Geometry,
    },
    /// Add a feature and print its id
    Add {
        table: String,
        x: f64,
        y: f64,
    },
    /// Ghost the given features
    Hide {
        table: String,

        #[arg(required = true)]
        ids: Vec<FeatureId>,

        /// Adopt features flagged hidden by earlier runs first
        #[arg(long)]
        resume: bool,
    },
    /// Reveal all ghosted features (add --resume to reset flags from earlier runs)
    Reveal {
        table: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Adopt features flagged hidden by earlier runs first
        #[arg(long)]
        resume: bool,
    },
    /// Show fields, filter and hidden features of a layer
    Status {
        table: String,

        #[arg(long)]
        json: bool,
    },
    /// List the layers in the database
    Layers,
    /// Start an interactive session on a layer
    Shell {
        table: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "ghost_points=info,ghost_points_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let db = match &cli.db {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    match cli.command {
        Commands::Init { table, geometry } => {
            db.create_layer(&table, geometry.into())?;
            println!("Created layer {}", table);
        }
        Commands::Add { table, x, y } => {
            let id = db.add_feature(&table, x, y)?;
            println!("{}", id);
        }
        Commands::Hide { table, ids, resume } => {
            let mut layer = db.layer(&table)?;
            layer.select(ids)?;
            let outcome = run_action(&mut layer, ActionId::SummonGhost, false, resume)?;
            if let ActionOutcome::Hidden { ghosted } = outcome {
                println!("{} feature(s) ghosted", ghosted);
            }
            return Ok(exit_code(outcome));
        }
        Commands::Reveal { table, yes, resume } => {
            let mut layer = db.layer(&table)?;
            let outcome = run_action(&mut layer, ActionId::BanishGhost, yes, resume)?;
            match outcome {
                ActionOutcome::Revealed { count } => println!("{} feature(s) revealed", count),
                ActionOutcome::Cancelled => println!("Reveal cancelled"),
                _ => {}
            }
            return Ok(exit_code(outcome));
        }
        Commands::Status { table, json } => {
            let layer = db.layer(&table)?;
            let report = StatusReport::collect(&layer, &VisibilityManager::new())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Layers => {
            for info in db.list_layers()? {
                println!(
                    "{}\t{}\t{} feature(s)\t{}",
                    info.name,
                    info.geometry_kind.as_str(),
                    info.feature_count,
                    info.subset_string
                );
            }
        }
        Commands::Shell { table, yes } => {
            let mut layer = db.layer(&table)?;
            let mut plugin = GhostPoints::new(PluginConfig::discover()?);
            let stdin = io::stdin();
            let mut term = TerminalNotifier::new(stdin.lock(), io::stdout()).assume_yes(yes);
            tracing::info!("Starting session on layer {}", layer.name());
            shell::run(&mut layer, &mut plugin, &mut term)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Runs one toolbar action as a single-command session.
fn run_action(
    layer: &mut SqliteLayer<'_>,
    action: ActionId,
    assume_yes: bool,
    resume: bool,
) -> anyhow::Result<ActionOutcome> {
    let mut plugin = GhostPoints::new(PluginConfig::discover()?);
    if resume {
        let restored = plugin.manager_mut().restore_from_layer(&*layer)?;
        tracing::info!("Resumed {} ghosted feature(s)", restored);
    }

    let stdin = io::stdin();
    let mut term = TerminalNotifier::new(stdin.lock(), io::stdout()).assume_yes(assume_yes);
    let active: &mut dyn MapLayer = layer;
    let outcome = plugin.trigger(action, Some(active), &mut term);
    term.output().flush()?;
    Ok(outcome)
}

fn exit_code(outcome: ActionOutcome) -> ExitCode {
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn reveal_help_mentions_resume() {
        let cli = Cli::command();
        let reveal = cli.find_subcommand("reveal").unwrap();
        let about = reveal.get_about().unwrap().to_string();

        assert!(about.contains("--resume"));
    }

    #[test]
    fn reveal_accepts_resume_flag() {
        let cli = Cli::try_parse_from(["ghost-points", "reveal", "trees", "--yes", "--resume"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Reveal { yes: true, resume: true, .. }
        ));
    }
}
