use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collections_agent::config::Config;
use collections_agent::server;
use collections_core::{AgentKind, Prompts};
use tracing_subscriber::fmt::time::ChronoLocal;

/// Voice agents for a general assistant and for inbound and outbound
/// collections calls.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host call rooms and the HTTP API.
    Serve,
    /// Talk to an agent through the local microphone and speaker.
    Console {
        /// assistant, collections or outbound
        kind: AgentKind,
        /// Room metadata JSON, e.g. the customer for an outbound call.
        #[arg(long)]
        metadata: Option<String>,
    },
    /// List audio devices.
    Devices,
}

fn load_prompts(dir: Option<&Path>) -> Result<Prompts> {
    match dir {
        Some(dir) => Prompts::with_overrides(dir).context("Failed to load prompt overrides"),
        None => Ok(Prompts::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Arc::new(Config::from_env().context("Failed to load application configuration")?);

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let cli = Cli::parse();

    // --- 4. Load Prompts ---
    let prompts = load_prompts(config.prompts_dir.as_deref())?;

    // --- 5. Run ---
    match cli.command {
        Command::Serve => server::serve(config, prompts).await,
        #[cfg(feature = "console")]
        Command::Console { kind, metadata } => {
            collections_agent::console::run(kind, metadata, config, prompts).await
        }
        #[cfg(feature = "console")]
        Command::Devices => collections_agent::console::list_devices(),
        #[cfg(not(feature = "console"))]
        Command::Console { .. } | Command::Devices => {
            anyhow::bail!("built without audio device support; rebuild with --features console")
        }
    }
}
