//! inkmath CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config directory
//! - `gateway` — Start the HTTP solving server
//! - `doctor`  — Diagnose configuration and connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "inkmath",
    about = "inkmath — solve hand-drawn math over HTTP",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose configuration and generator connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
