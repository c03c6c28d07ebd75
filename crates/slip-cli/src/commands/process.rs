//! Process command - extract orders from a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use slip_core::models::config::SlipConfig;
use slip_core::pdf::{PageTextSource, PdfPageSource, TextPageSource};
use slip_core::pipeline::{parse_document, DocumentResult};
use slip_core::{export, OrderRecord};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text with form-feed page breaks)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write the CSV export to the configured export directory
    #[arg(long)]
    export: bool,

    /// Report extraction warnings and total mismatches
    #[arg(long)]
    validate: bool,

    /// Treat the input as form-feed separated text regardless of extension
    #[arg(long)]
    text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Flat CSV export, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// How a document is turned into page text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

impl InputKind {
    /// Detect the input kind from the file extension.
    pub fn detect(path: &Path, force_text: bool) -> anyhow::Result<Self> {
        if force_text {
            return Ok(InputKind::Text);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(InputKind::Pdf),
            "txt" | "text" => Ok(InputKind::Text),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.validate {
        config.extraction.validate_totals = true;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = InputKind::detect(&args.input, args.text)?;
    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Reading pages...");

    // Page text extraction is blocking work
    let input = args.input.clone();
    let worker_config = config.clone();
    let result =
        tokio::task::spawn_blocking(move || load_document(&input, kind, &worker_config)).await??;

    pb.finish_and_clear();

    if args.validate {
        report_warnings(&result);
    }

    let output = format_orders(&result.orders, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }

    if args.export {
        let path = write_export(&result.orders, &config)?;
        eprintln!(
            "{} Exported {} rows to {}",
            style("✓").green(),
            result.item_count(),
            path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read a document and extract its orders.
pub fn load_document(path: &Path, kind: InputKind, config: &SlipConfig) -> anyhow::Result<DocumentResult> {
    let data = fs::read(path)?;

    let result = match kind {
        InputKind::Pdf => {
            let mut source = PdfPageSource::with_config(config.pdf.clone());
            source.load(&data)?;
            parse_document(&source, &config.extraction)?
        }
        InputKind::Text => {
            let mut source = TextPageSource::new();
            source.load(&data)?;
            parse_document(&source, &config.extraction)?
        }
    };

    debug!(
        "{}: {} pages, {} orders, {} items in {}ms",
        path.display(),
        result.page_count,
        result.orders.len(),
        result.item_count(),
        result.processing_time_ms
    );

    Ok(result)
}

/// Write the CSV export under the configured directory and return its path.
pub fn write_export(orders: &[OrderRecord], config: &SlipConfig) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(&config.export.output_dir)?;

    let file_name = export::suggested_filename(&config.export.file_prefix, Utc::now());
    let path = config.export.output_dir.join(file_name);

    let file = fs::File::create(&path)?;
    export::write_delimited(file, orders)?;

    Ok(path)
}

pub fn report_warnings(result: &DocumentResult) {
    if result.warnings.is_empty() {
        return;
    }

    eprintln!("{}", style("Extraction issues:").yellow());
    for warning in &result.warnings {
        eprintln!("  - {}", warning);
    }
}

pub fn format_orders(orders: &[OrderRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(orders)?),
        OutputFormat::Csv => Ok(export::to_delimited_string(orders)?),
        OutputFormat::Text => Ok(format_text(orders)),
    }
}

fn format_text(orders: &[OrderRecord]) -> String {
    let mut output = String::new();

    for (idx, order) in orders.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }

        output.push_str(&format!(
            "Order: {}\n",
            order.order_number.as_deref().unwrap_or("(unknown)")
        ));
        output.push_str(&format!(
            "Date: {}\n",
            order.order_date.as_deref().unwrap_or("(unknown)")
        ));

        if order.items.is_empty() {
            output.push_str("  (no items)\n");
        }
        for item in &order.items {
            output.push_str(&format!(
                "  {} x {} @ {} = {}\n",
                item.quantity, item.description, item.unit_price, item.line_total_price
            ));
        }

        output.push_str(&format!(
            "Total: {} units, {}\n",
            order.declared_total_quantity, order.declared_total_price
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind_detection() {
        assert_eq!(InputKind::detect(Path::new("a.PDF"), false).unwrap(), InputKind::Pdf);
        assert_eq!(InputKind::detect(Path::new("a.txt"), false).unwrap(), InputKind::Text);
        assert_eq!(InputKind::detect(Path::new("a.pdf"), true).unwrap(), InputKind::Text);
        assert!(InputKind::detect(Path::new("a.png"), false).is_err());
    }

    #[test]
    fn test_format_text() {
        let orders = slip_core::parse_pages(&[
            "Order Number: 123\nOrder Date: Shipping Method: Buyer Name: Seller Name: 01/02/2023\nQuantity Description Price Total Price\n2 Widget $5.00 $10.00\n2 Total $10.00 Total",
        ]);
        assert_eq!(
            format_text(&orders),
            "Order: 123\nDate: 01/02/2023\n  2 x Widget @ 5.00 = 10.00\nTotal: 2 units, 10.00\n"
        );
    }
}
