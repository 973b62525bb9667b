//! Rescueline CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Initialize config directory
//! - `serve`   — Start the HTTP gateway server
//! - `ask`     — Answer a single question from the command line
//! - `ingest`  — Load a text document into the store
//! - `status`  — Show system status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rescueline",
    about = "Rescueline — disaster-response information backend",
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
    /// Initialize configuration directory
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,
    },

    /// Ingest a plain-text document into the store
    Ingest {
        /// Path to the text file
        path: std::path::PathBuf,

        /// Override the stored document name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show system status
    Status,
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
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { question } => commands::ask::run(&question).await?,
        Commands::Ingest { path, name } => commands::ingest::run(&path, name).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
