//! docchat CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP gateway and static client
//! - `ask`     — Answer one question on the terminal
//! - `context` — Print the context built from the source directory
//! - `doctor`  — Diagnose configuration and environment
//! - `init`    — Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docchat",
    about = "docchat — chat with your documents, answers streamed with citations",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.docchat/config.toml)
    #[arg(short, long, global = true, env = "DOCCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the source documents directory
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Override the static client directory
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Ask a single question and stream the answer
    Ask {
        /// The question (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Print the context that would be sent to the model
    Context,

    /// Diagnose configuration and environment
    Doctor,

    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve {
            port,
            source_dir,
            static_dir,
        } => commands::serve::run(config_path, port, source_dir, static_dir).await?,
        Commands::Ask { question } => commands::ask::run(config_path, &question.join(" ")).await?,
        Commands::Context => commands::context::run(config_path)?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Init => commands::init::run(config_path)?,
    }

    Ok(())
}
