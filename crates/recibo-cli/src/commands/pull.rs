//! Pull command - reconcile the remote receipt list into the local store.

use clap::Args;
use console::style;
use tracing::info;

use super::build_context;

/// Arguments for the pull command.
#[derive(Args)]
pub struct PullArgs {
    /// Only print the summary counters
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: PullArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let ctx = build_context(config_path).await?;

    if !args.quiet {
        println!("Pulling from {}...", ctx.config.sync.api.base_url);
    }

    let summary = ctx.orchestrator.pull().await?;
    info!(?summary, "Pull complete");

    println!(
        "{} {} inserted, {} merged, {} kept",
        style("✓").green(),
        summary.inserted,
        summary.merged,
        summary.kept
    );
    if summary.skipped > 0 {
        println!(
            "{} {} remote records skipped (no receipt number)",
            style("ℹ").blue(),
            summary.skipped
        );
    }
    if summary.failed > 0 {
        println!(
            "{} {} records failed to persist",
            style("!").yellow(),
            summary.failed
        );
    }

    Ok(())
}
