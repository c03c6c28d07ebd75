//! Batch command: run the pipeline over every document a glob matches.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use futures_util::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use slip_core::models::config::SlipConfig;
use slip_core::pipeline::DocumentResult;
use slip_core::OrderRecord;

use super::config::load_config;
use super::process::{format_orders, load_document, write_export, InputKind, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting the slips, e.g. "slips/*.pdf"
    #[arg(required = true)]
    pattern: String,

    /// Directory for per-document output, summary and export
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Format of the per-document output files
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write summary.csv with one line per document
    #[arg(long)]
    summary: bool,

    /// Write one CSV export holding the orders of every document
    #[arg(long)]
    export: bool,

    /// Documents read concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Keep going when a document cannot be read
    #[arg(long)]
    continue_on_error: bool,

    /// Read every match as form-feed separated text
    #[arg(long)]
    text: bool,
}

enum Outcome {
    Parsed(DocumentResult),
    Failed(String),
}

/// What happened to one matched document.
struct FileReport {
    path: PathBuf,
    outcome: Outcome,
    elapsed: Duration,
}

impl FileReport {
    fn document(&self) -> Option<&DocumentResult> {
        match &self.outcome {
            Outcome::Parsed(document) => Some(document),
            Outcome::Failed(_) => None,
        }
    }

    fn failure(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Parsed(_) => None,
            Outcome::Failed(message) => Some(message),
        }
    }

    fn file_name(&self) -> &str {
        self.path.file_name().and_then(|s| s.to_str()).unwrap_or("")
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = collect_inputs(&args.pattern, args.text)?;
    eprintln!("{} {} documents matched", style("ℹ").blue(), files.len());

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let reports = process_all(files, &config, args.text, args.jobs).await?;

    for report in &reports {
        let Some(message) = report.failure() else {
            continue;
        };
        if !args.continue_on_error {
            error!("{}: {}", report.path.display(), message);
            anyhow::bail!("Could not process {}: {}", report.path.display(), message);
        }
        warn!("Skipping {}: {}", report.path.display(), message);
    }

    if let Some(dir) = &args.output_dir {
        write_outputs(dir, &reports, args.format)?;
    }

    if args.summary {
        let path = args
            .output_dir
            .as_deref()
            .unwrap_or(Path::new("."))
            .join("summary.csv");
        write_summary(&path, &reports)?;
        eprintln!("{} Summary: {}", style("✓").green(), path.display());
    }

    if args.export {
        let mut export_config = config.clone();
        if let Some(dir) = &args.output_dir {
            export_config.export.output_dir = dir.clone();
        }

        let orders: Vec<OrderRecord> = reports
            .iter()
            .filter_map(FileReport::document)
            .flat_map(|d| d.orders.iter().cloned())
            .collect();

        let path = write_export(&orders, &export_config)?;
        eprintln!(
            "{} Exported {} orders to {}",
            style("✓").green(),
            orders.len(),
            path.display()
        );
    }

    print_report(&reports, start.elapsed());
    Ok(())
}

/// Expand the pattern, keeping only files with a supported kind.
fn collect_inputs(pattern: &str, force_text: bool) -> anyhow::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file() && InputKind::detect(path, force_text).is_ok())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", pattern);
    }
    Ok(files)
}

async fn process_all(
    files: Vec<PathBuf>,
    config: &SlipConfig,
    force_text: bool,
    jobs: usize,
) -> anyhow::Result<Vec<FileReport>> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    // `buffered` yields in input order, so reports line up with the glob
    let reports = stream::iter(files)
        .map(|path| {
            let config = config.clone();
            async move {
                let started = Instant::now();
                let worker_path = path.clone();
                let joined = tokio::task::spawn_blocking(move || -> anyhow::Result<DocumentResult> {
                    let kind = InputKind::detect(&worker_path, force_text)?;
                    load_document(&worker_path, kind, &config)
                })
                .await;

                let outcome = match joined {
                    Ok(Ok(document)) => Outcome::Parsed(document),
                    Ok(Err(e)) => Outcome::Failed(e.to_string()),
                    Err(e) => Outcome::Failed(format!("worker failed: {}", e)),
                };
                FileReport {
                    path,
                    outcome,
                    elapsed: started.elapsed(),
                }
            }
        })
        .buffered(jobs.max(1))
        .inspect(|report| {
            pb.set_message(report.file_name().to_string());
            pb.inc(1);
        })
        .collect::<Vec<_>>()
        .await;

    pb.finish_and_clear();
    Ok(reports)
}

fn write_outputs(dir: &Path, reports: &[FileReport], format: OutputFormat) -> anyhow::Result<()> {
    for report in reports {
        let Some(document) = report.document() else {
            continue;
        };
        let stem = report
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("orders");

        let path = dir.join(format!("{}.{}", stem, format.extension()));
        fs::write(&path, format_orders(&document.orders, format)?)?;
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_summary(path: &Path, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "pages",
        "orders",
        "items",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for report in reports {
        let elapsed_ms = report.elapsed.as_millis().to_string();
        match &report.outcome {
            Outcome::Parsed(document) => wtr.write_record([
                report.file_name(),
                "success",
                &document.page_count.to_string(),
                &document.orders.len().to_string(),
                &document.item_count().to_string(),
                &document.warnings.len().to_string(),
                &elapsed_ms,
                "",
            ])?,
            Outcome::Failed(message) => wtr.write_record([
                report.file_name(),
                "error",
                "",
                "",
                "",
                "",
                &elapsed_ms,
                message.as_str(),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

fn print_report(reports: &[FileReport], elapsed: Duration) {
    let failed: Vec<&FileReport> = reports.iter().filter(|r| r.failure().is_some()).collect();
    let orders: usize = reports
        .iter()
        .filter_map(FileReport::document)
        .map(|d| d.orders.len())
        .sum();

    eprintln!();
    eprintln!(
        "{} {} documents, {} orders in {:?}",
        style("✓").green(),
        reports.len(),
        orders,
        elapsed
    );
    eprintln!(
        "   {} successful, {} failed",
        style(reports.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!("{}", style("Failed documents:").red());
        for report in failed {
            eprintln!(
                "  - {}: {}",
                report.path.display(),
                report.failure().unwrap_or_default()
            );
        }
    }
}
