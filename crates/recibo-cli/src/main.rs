//! CLI application for receipt ingestion and sync.

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, delete, edit, ingest, list, pull, show};

/// recibo - scan receipts into structured data and keep them in sync
#[derive(Parser)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a receipt document (PDF or image)
    Ingest(ingest::IngestArgs),

    /// Fetch the remote receipt list and reconcile it locally
    Pull(pull::PullArgs),

    /// List stored receipts
    List(list::ListArgs),

    /// Show one receipt by its number
    Show(show::ShowArgs),

    /// Edit a receipt and push the change upstream
    Edit(edit::EditArgs),

    /// Delete receipts
    Delete(delete::DeleteArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, cli.config.as_deref()).await,
        Commands::Pull(args) => pull::run(args, cli.config.as_deref()).await,
        Commands::List(args) => list::run(args, cli.config.as_deref()).await,
        Commands::Show(args) => show::run(args, cli.config.as_deref()).await,
        Commands::Edit(args) => edit::run(args, cli.config.as_deref()).await,
        Commands::Delete(args) => delete::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args).await,
    }
}
