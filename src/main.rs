//! Skrapa main entry point
//!
//! This is the command-line interface for the Skrapa web-extraction engine:
//! `collect` runs a script and persists the collected columns, `export`
//! turns a collect database into a CSV or JSON file.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use skrapa::engine::Engine;
use skrapa::export::{export_csv, export_json};
use skrapa::script::{load_script_with_hash, Action, Script};
use skrapa::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Skrapa: declarative web extraction
///
/// Skrapa runs small TOML scripts that describe a start URL and a pipeline
/// of selector rules, collects matched values into named columns, and
/// exports them later as row-aligned CSV or JSON.
#[derive(Parser, Debug)]
#[command(name = "skrapa")]
#[command(version = "1.0.0")]
#[command(about = "Declarative web extraction", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a script and persist the collected columns
    Collect {
        /// Path to the TOML script
        script: PathBuf,

        /// Where to store collected data
        #[arg(long, default_value = "./skrapa.db")]
        database: PathBuf,

        /// Validate the script and show the pipeline without fetching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Export a collect database as CSV or JSON
    Export {
        /// Output format
        format: ExportFormat,

        /// Path to a database written by `collect`
        database: PathBuf,

        /// Output file (defaults to ./export.csv or ./export.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Export formats selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Collect {
            script,
            database,
            dry_run,
        } => handle_collect(&script, &database, dry_run).await,
        Command::Export {
            format,
            database,
            output,
        } => handle_export(format, &database, output.as_deref()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skrapa=info,warn"),
            1 => EnvFilter::new("skrapa=debug,info"),
            2 => EnvFilter::new("skrapa=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `collect`: run the script's pipeline and persist the result
async fn handle_collect(script_path: &Path, db_path: &Path, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!("Loading script from: {}", script_path.display());
    let (script, raw_script, script_hash) = load_script_with_hash(script_path)
        .with_context(|| format!("failed to load script {}", script_path.display()))?;
    tracing::info!("Script loaded (hash: {})", script_hash);

    if dry_run {
        print_dry_run(&script);
        return Ok(());
    }

    // The script is written up front so even an aborted run records what
    // it was asked to do; column data lands only after a complete run.
    let mut storage = SqliteStorage::create(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    storage.save_script(&raw_script, &script_hash)?;
    tracing::info!("Wrote script settings to database");

    let engine = Engine::new(script)?;
    let store = engine.run().await?;
    tracing::info!("Run complete, saving data");

    if store.is_empty() {
        tracing::warn!("Nothing was collected; export will fail on this database");
    }

    storage.save(&store.snapshot())?;
    tracing::info!("Data saved to {}", db_path.display());

    Ok(())
}

/// Handles `export`: load, reconstruct, serialize
fn handle_export(
    format: ExportFormat,
    db_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let storage = SqliteStorage::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let data = storage.load_all()?;

    let default_output = match format {
        ExportFormat::Csv => Path::new("./export.csv"),
        ExportFormat::Json => Path::new("./export.json"),
    };
    let output = output.unwrap_or(default_output);

    match format {
        ExportFormat::Csv => export_csv(&data, output)?,
        ExportFormat::Json => export_json(&data, output)?,
    }

    println!("Exported {} columns to {}", data.len(), output.display());
    Ok(())
}

/// Prints what a script would do, without fetching
fn print_dry_run(script: &Script) {
    println!("=== Skrapa Dry Run ===\n");

    println!("Entry point: {}", script.main.url);
    println!("User agent:  {}", script.user_agent());
    println!(
        "Output:      {} ({})",
        script.main.file,
        script.main.format.extension()
    );

    if let Some(delay) = script.main.delay {
        println!("Delay:       {}s", delay);
    }
    if let Some(random_delay) = script.main.random_delay {
        println!("Random delay: up to {}s extra", random_delay);
    }
    if !script.main.allowed_domains.is_empty() {
        println!("Allowed domains: {}", script.main.allowed_domains.join(", "));
    }

    println!("\nPipeline ({} rules):", script.pipeline.len());
    for (i, rule) in script.pipeline.iter().enumerate() {
        match rule.action {
            Action::Collect => println!(
                "  {}. collect {:?} from {:?} into column {:?}",
                i + 1,
                rule.attr,
                rule.selector,
                rule.column.as_deref().unwrap_or_default()
            ),
            Action::Follow => println!(
                "  {}. follow {:?} links from {:?}{}",
                i + 1,
                rule.attr,
                rule.selector,
                if rule.visit_once { " (visit once)" } else { "" }
            ),
        }
    }

    println!("\n✓ Script is valid");
}
