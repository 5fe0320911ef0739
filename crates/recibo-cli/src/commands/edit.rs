//! Edit command - update a receipt locally and push the edit upstream.

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use super::build_context;

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Receipt number
    #[arg(required = true)]
    number: String,

    /// Replace the free-text notes
    #[arg(long)]
    notes: Option<String>,

    /// Replace the store location
    #[arg(long)]
    location: Option<String>,

    /// Correct the subtotal
    #[arg(long)]
    subtotal: Option<Decimal>,

    /// Correct the tax amount
    #[arg(long)]
    tax: Option<Decimal>,

    /// Correct the total
    #[arg(long)]
    total: Option<Decimal>,
}

pub async fn run(args: EditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let ctx = build_context(config_path).await?;

    let Some(mut record) = ctx.store.find_by_number(&args.number).await? else {
        anyhow::bail!("No receipt with number {}", args.number);
    };

    let mut changed = false;
    if let Some(notes) = args.notes {
        record.notes = notes;
        changed = true;
    }
    if let Some(location) = args.location {
        record.store_location = location;
        changed = true;
    }
    if let Some(subtotal) = args.subtotal {
        record.subtotal = subtotal;
        changed = true;
    }
    if let Some(tax) = args.tax {
        record.tax = tax;
        changed = true;
    }
    if let Some(total) = args.total {
        record.total = total;
        changed = true;
    }

    if !changed {
        anyhow::bail!("Nothing to change; pass at least one field flag");
    }

    // Persists locally first, then pushes upstream and folds the server's
    // answer back through the merge policy.
    ctx.orchestrator.push_update(&mut record).await?;

    println!("{} Updated receipt #{}", style("✓").green(), args.number);
    Ok(())
}
