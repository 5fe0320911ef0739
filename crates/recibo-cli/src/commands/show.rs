//! Show command - display one receipt by its number.

use clap::Args;

use super::build_context;
use super::ingest::{format_record, OutputFormat};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Receipt number
    #[arg(required = true)]
    number: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ShowArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let ctx = build_context(config_path).await?;

    let Some(record) = ctx.store.find_by_number(&args.number).await? else {
        anyhow::bail!("No receipt with number {}", args.number);
    };

    println!("{}", format_record(&record, args.format)?);
    Ok(())
}
