//! Ingest command - process a single receipt document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use recibo_core::models::receipt::{DocumentHint, RawDocument};
use recibo_sync::ReceiptRecord;

use super::build_context;

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let hint = match extension.as_str() {
        "pdf" => DocumentHint::Unknown,
        "png" | "jpg" | "jpeg" | "tiff" | "bmp" => DocumentHint::Image,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    info!("Ingesting file: {}", args.input.display());

    let ctx = build_context(config_path).await?;
    let data = fs::read(&args.input)?;
    let document = RawDocument::new(data, hint);

    // Mirror the acquirer's published progress onto a terminal bar.
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("Processing receipt...");

    let ticker = {
        let pb = pb.clone();
        let progress = ctx.progress.clone();
        tokio::spawn(async move {
            loop {
                pb.set_position((progress.get() * 100.0) as u64);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
    };

    let result = ctx.orchestrator.ingest(document).await;
    ticker.abort();

    let record = match result {
        Ok(record) => {
            pb.finish_with_message("Done");
            record
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };

    let output = format_record(&record, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total ingest time: {:?}", start.elapsed());
    Ok(())
}

pub fn format_record(record: &ReceiptRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_text(record: &ReceiptRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor:  {}\n", record.vendor_name));
    if !record.store_location.is_empty() {
        output.push_str(&format!("Store:   {}\n", record.store_location));
    }
    if let Some(number) = &record.receipt_number {
        output.push_str(&format!("Receipt: #{}\n", number));
    }
    if let Some(date) = record.transaction_date {
        output.push_str(&format!("Date:    {}\n", date));
    }
    output.push_str(&format!("Status:  {}\n", record.status.as_str()));

    if !record.line_items.is_empty() {
        output.push('\n');
        output.push_str("Items:\n");
        for item in &record.line_items {
            output.push_str(&format!(
                "  {:<40} {:>8}  x{}\n",
                item.name, item.unit_price, item.quantity
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!("Subtotal: {:>8}\n", record.subtotal.to_string()));
    output.push_str(&format!("Tax:      {:>8}\n", record.tax.to_string()));
    output.push_str(&format!("Total:    {:>8}\n", record.total.to_string()));

    if !record.notes.is_empty() {
        output.push_str(&format!("\nNotes: {}\n", record.notes));
    }

    output
}
