//! tanker-admin: index lifecycle commands for a Tanker search service
//!
//! Operates on index names directly; model-level reindexing needs the
//! application's record stores and is driven from the application itself.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tanker::{config, IndexAdmin, ModelRegistry};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "tanker-admin", version, about = "Manage Tanker search indexes")]
struct Cli {
    /// Settings file (defaults to tanker.yml, config/tanker.yml or the user config dir)
    #[arg(short, long, global = true, env = "TANKER_SETTINGS_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether an index exists
    Exists { index: String },
    /// Create an index and wait until it is running
    Create { index: String },
    /// Delete an index if it exists
    Delete { index: String },
    /// Delete and recreate an index
    Rebuild { index: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = match cli.config {
        Some(ref path) => config::load_from(path)?,
        None => config::load()?,
    };

    let admin = IndexAdmin::from_settings(&settings, Arc::new(ModelRegistry::from_settings(&settings)))?;

    match cli.command {
        Command::Exists { index } => {
            let exists = admin.index_exists(&index).await;
            println!("{}: {}", index, if exists { "exists" } else { "missing" });
        }
        Command::Create { index } => admin.build_index(&index).await,
        Command::Delete { index } => admin.delete_index(&index).await,
        Command::Rebuild { index } => {
            admin.delete_index(&index).await;
            admin.build_index(&index).await;
        }
    }

    info!("Done");
    Ok(())
}
