//! tidemark CLI
//!
//! Command-line tool for inspecting and diffing stored schema snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tidemark::dialect::{self, Database};
use tidemark::prelude::*;

/// Dialect-aware schema diffing.
#[derive(Parser)]
#[command(name = "tidemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a stored snapshot in readable form.
    Snapshot {
        /// Snapshot file (JSON).
        file: PathBuf,
    },

    /// Print the changes that turn the comparison into the reference.
    Diff {
        /// Snapshot describing the desired schema.
        reference: PathBuf,

        /// Snapshot describing the current schema.
        comparison: PathBuf,

        /// Qualify changes with catalog names.
        #[arg(long)]
        include_catalog: bool,

        /// Qualify changes with schema names.
        #[arg(long)]
        include_schema: bool,

        /// Print the SQL for each change instead of its description.
        #[arg(long)]
        sql: bool,

        /// Target dialect (generic, postgresql, sqlite).
        #[arg(short, long, env = "TIDEMARK_DIALECT", default_value = "generic")]
        dialect: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Snapshot { file } => {
            let snapshot = DatabaseSnapshot::load(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            print!("{}", SnapshotSerializer::new().serialize(&snapshot));
        }

        Commands::Diff {
            reference,
            comparison,
            include_catalog,
            include_schema,
            sql,
            dialect: dialect_name,
        } => {
            let target = dialect::by_short_name(&dialect_name)
                .with_context(|| format!("unknown dialect '{dialect_name}'"))?;
            let reference = DatabaseSnapshot::load(&reference)
                .with_context(|| format!("failed to load {}", reference.display()))?;
            let comparison = DatabaseSnapshot::load(&comparison)
                .with_context(|| format!("failed to load {}", comparison.display()))?;
            let source = dialect::by_short_name(&reference.database().short_name)
                .unwrap_or_else(|| Arc::clone(&target));
            debug!(
                reference = source.short_name(),
                comparison = target.short_name(),
                "Resolved dialects"
            );

            let control = DiffOutputControl::new()
                .include_catalog(include_catalog)
                .include_schema(include_schema);
            let context = GeneratorContext::new(
                &reference,
                &comparison,
                source.as_ref(),
                target.as_ref(),
            )
            .control(control);
            let changes = DiffEngine::with_core_generators()?.diff_snapshots(&context)?;

            if changes.is_empty() {
                info!("No differences found.");
                return Ok(());
            }
            if sql {
                print_sql(&changes, target)?;
            } else {
                for change in &changes {
                    println!("{}", change.description());
                }
            }
        }
    }

    Ok(())
}

fn print_sql(changes: &[Change], database: Arc<dyn Database>) -> anyhow::Result<()> {
    let engine = ActionEngine::default();
    let scope = Scope::new(database);
    for change in changes {
        println!("-- {}", change.description());
        for action in change.to_actions() {
            match engine.execute(&action, &scope) {
                Ok(result) => {
                    for statement in result.statements {
                        println!("{statement};");
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(action = %action, error = %e, "Skipping action");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
