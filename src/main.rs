use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stepflow::recovery::{AutosaveConfig, CrashRecovery};
use stepflow::storage::GuideStore;

#[derive(Parser)]
#[command(name = "stepflow")]
#[command(about = "Manage recorded step-by-step guides", version)]
struct Cli {
    /// Library location (defaults to the platform config directory)
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List guides in the library, most recently updated first
    List,
    /// Print a guide as JSON with screenshots embedded
    Show {
        /// Guide id
        id: String,
    },
    /// Export a guide to a standalone JSON file
    Export {
        /// Guide id
        id: String,
        /// Output file path
        output: PathBuf,
    },
    /// Import a guide from a standalone JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },
    /// Delete a guide and its assets
    Delete {
        /// Guide id
        id: String,
    },
    /// List sessions recoverable after a crash
    Sessions,
    /// Recover a crashed session into the library
    Recover {
        /// Guide id of the crashed session
        id: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let base_path = cli
        .base_path
        .unwrap_or_else(GuideStore::default_base_path);
    let store = GuideStore::new(base_path);
    store.initialize().context("failed to initialize library")?;

    match cli.command {
        Commands::List => {
            let guides = store.list_guides();
            if guides.is_empty() {
                println!("No guides in library.");
                return Ok(());
            }
            for summary in guides {
                println!(
                    "{}  {:<40}  {} steps  updated {}",
                    summary.id,
                    summary.title,
                    summary.step_count,
                    summary.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Show { id } => {
            let guide = store.load_guide(&id, true)?;
            println!("{}", stepflow::document::serialize_guide(&guide)?);
        }
        Commands::Export { id, output } => {
            store.export_guide_json(&id, &output)?;
            println!("Exported {id} to {}", output.display());
        }
        Commands::Import { path } => {
            let guide = store.import_guide_json(&path)?;
            println!("Imported \"{}\" as {}", guide.title, guide.id);
        }
        Commands::Delete { id } => {
            store.delete_guide(&id)?;
            println!("Deleted {id}");
        }
        Commands::Sessions => {
            let recovery = CrashRecovery::new(Arc::new(store), AutosaveConfig::default());
            recovery.initialize()?;
            let sessions = recovery.list_recoverable_sessions();
            if sessions.is_empty() {
                println!("No recoverable sessions.");
                return Ok(());
            }
            for session in sessions {
                println!(
                    "{}  \"{}\"  snapshot {}",
                    session.guide_id,
                    session.guide.title,
                    session.timestamp.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        Commands::Recover { id } => {
            let recovery = CrashRecovery::new(Arc::new(store), AutosaveConfig::default());
            recovery.initialize()?;
            match recovery.recover_session(&id)? {
                Some(guide) => println!("Recovered \"{}\" ({} steps)", guide.title, guide.steps.len()),
                None => println!("No recoverable session for {id}"),
            }
        }
    }

    Ok(())
}
