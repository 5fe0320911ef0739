//! List command - show stored receipts.

use clap::Args;
use console::style;

use super::build_context;
use super::ingest::OutputFormat;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Filter text matched against vendor, number, notes, location, and
    /// item names
    filter: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let ctx = build_context(config_path).await?;
    let records = ctx.store.list(args.filter.as_deref()).await?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("{} No receipts found.", style("ℹ").blue());
                return Ok(());
            }

            println!(
                "{:<12} {:<12} {:<28} {:>10}  {}",
                "DATE", "NUMBER", "VENDOR", "TOTAL", "STATUS"
            );
            for record in &records {
                let date = record
                    .transaction_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let number = record.receipt_number.as_deref().unwrap_or("-");
                println!(
                    "{:<12} {:<12} {:<28} {:>10}  {}",
                    date,
                    number,
                    record.vendor_name,
                    record.total.to_string(),
                    record.status.as_str()
                );
            }
            println!("\n{} receipt(s)", records.len());
        }
    }

    Ok(())
}
