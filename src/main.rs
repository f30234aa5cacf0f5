//! Colony Labor - Entry Point
//!
//! Computes work priorities for a colony and submits the minimal change-set,
//! either against a JSON snapshot file or a colony's REST endpoint.

use clap::{Parser, Subcommand, ValueEnum};
use colony_labor::backend::{HttpBackend, SnapshotBackend};
use colony_labor::core::error::Result;
use colony_labor::core::LaborConfig;
use colony_labor::optimizer::{OptimizeOutcome, Optimizer};
use colony_labor::skills::WorkCategory;
use std::path::PathBuf;
use std::process::ExitCode;

/// Skill-ranked work priority optimizer
#[derive(Parser, Debug)]
#[command(name = "colony-labor")]
#[command(about = "Assign work priorities by skill, passion and load, then submit the minimal diff")]
struct Args {
    /// TOML config with [optimizer] and [skill_map] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dry run against a snapshot file
    Plan {
        #[arg(long)]
        snapshot: PathBuf,

        /// Comma-separated categories, in processing order (default: full catalogue)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Optimize a snapshot file and write the result
    Apply {
        #[arg(long)]
        snapshot: PathBuf,

        /// Where to write the updated snapshot (default: in place)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Optimize a live colony over HTTP (COLONY_API_URL, COLONY_API_TOKEN)
    Remote {
        /// Overrides COLONY_API_URL
        #[arg(long)]
        url: Option<String>,

        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Compute the change-set without submitting it
        #[arg(long)]
        dry_run: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the effective skill map
    Skills,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("colony_labor=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let file = match &args.config {
        Some(path) => LaborConfig::load(path)?,
        None => LaborConfig::default(),
    };
    let optimizer = Optimizer::from_config(&file)?;

    match args.command {
        Command::Plan {
            snapshot,
            categories,
            format,
        } => {
            let backend = SnapshotBackend::open(&snapshot)?;
            let outcome = optimizer.preview(&backend, &resolve(&optimizer, &categories))?;
            print_outcome(&outcome, format)
        }
        Command::Apply {
            snapshot,
            output,
            categories,
            format,
        } => {
            let output = output.unwrap_or_else(|| snapshot.clone());
            let mut backend = SnapshotBackend::open_with_output(&snapshot, &output)?;
            let outcome = optimizer.run(&mut backend, &resolve(&optimizer, &categories))?;
            print_outcome(&outcome, format)
        }
        Command::Remote {
            url,
            categories,
            dry_run,
            format,
        } => {
            let mut backend = match url {
                Some(url) => HttpBackend::with_url(url)?,
                None => HttpBackend::from_env()?,
            };
            let categories = resolve(&optimizer, &categories);
            let outcome = if dry_run {
                optimizer.preview(&backend, &categories)?
            } else {
                optimizer.run(&mut backend, &categories)?
            };
            print_outcome(&outcome, format)
        }
        Command::Skills => {
            for category in optimizer.skill_map().categories() {
                let skills = if category.is_basic() {
                    "(basic)".to_string()
                } else {
                    category.relevant_skills.join(", ")
                };
                println!("{:<16} {}", category.label, skills);
            }
            Ok(())
        }
    }
}

/// Explicit list in the given order, or the whole catalogue
fn resolve(optimizer: &Optimizer, names: &[String]) -> Vec<WorkCategory> {
    if names.is_empty() {
        optimizer.skill_map().categories()
    } else {
        optimizer.categories(names)
    }
}

fn print_outcome(outcome: &OptimizeOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
        }
        OutputFormat::Text => {
            for (category, assignments) in &outcome.assignments {
                let active: Vec<String> = assignments
                    .iter()
                    .filter(|a| a.priority.is_active())
                    .map(|a| format!("{}={}", display_name(&a.worker_name, a.worker_id.as_str()), a.priority))
                    .collect();
                println!("{:<16} {}", category, active.join(" "));
            }
            println!();
            println!("{} changes", outcome.change_count());
            for change in &outcome.changes {
                println!("  {} {} -> {}", change.worker_id, change.work_type, change.priority);
            }
        }
    }
    Ok(())
}

fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}
