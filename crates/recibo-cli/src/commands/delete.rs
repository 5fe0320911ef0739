//! Delete command - remove receipts locally and remotely.

use clap::Args;
use console::style;

use super::build_context;

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Receipt number to delete
    number: Option<String>,

    /// Delete every local receipt (local store only)
    #[arg(long, conflicts_with = "number")]
    all: bool,

    /// Required with --all
    #[arg(long)]
    force: bool,
}

pub async fn run(args: DeleteArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let ctx = build_context(config_path).await?;

    if args.all {
        if !args.force {
            anyhow::bail!("Refusing to delete all receipts without --force");
        }
        ctx.store.delete_all().await?;
        println!("{} Deleted all local receipts", style("✓").green());
        return Ok(());
    }

    let Some(number) = args.number else {
        anyhow::bail!("Provide a receipt number, or --all --force");
    };

    let Some(record) = ctx.store.find_by_number(&number).await? else {
        anyhow::bail!("No receipt with number {}", number);
    };

    // Local delete plus best-effort remote propagation.
    ctx.orchestrator.delete(&record).await?;
    println!("{} Deleted receipt #{}", style("✓").green(), number);

    Ok(())
}
