//! Process command - extract transactions from a single statement file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use stmt_core::{StatementPipeline, StatementResult};

use super::{format_result, load_config, read_document, BankArg, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (statement PDF or ingested document JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip detection and use this bank's rules
    #[arg(short, long, value_enum)]
    bank: Option<BankArg>,

    /// Fail when nothing was extracted or validation reports errors
    #[arg(long)]
    strict: bool,

    /// Print the validation report and drop diagnostics
    #[arg(long)]
    show_report: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(10);
    let document = read_document(&args.input, &config)?;
    debug!("Document has {} pages", document.page_count());

    pb.set_message("Extracting transactions...");
    pb.set_position(50);
    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from(config.output.format));
    let pipeline = StatementPipeline::from_config(config).with_bank(args.bank.map(Into::into));
    let result = pipeline.process(&document)?;

    pb.set_position(100);
    pb.finish_and_clear();

    if args.show_report {
        print_report(&result);
    }

    if args.strict {
        result.check()?;
    }

    let output = format_result(&result, format)?;

    if let Some(output_path) = &args.output {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, &output)?;
        eprintln!(
            "{} {} records written to {}",
            style("✓").green(),
            result.records.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Report goes to stderr so it never mixes with exported data.
fn print_report(result: &StatementResult) {
    let report = &result.report;
    let stats = &result.stats;

    eprintln!(
        "{} Bank: {} | {} candidates, {} accepted, {} dropped, {} duplicates ({}ms)",
        style("ℹ").blue(),
        result.bank.display_name(),
        stats.attempted,
        stats.accepted,
        stats.dropped,
        stats.duplicates,
        result.processing_time_ms
    );

    if report.valid {
        eprintln!("{} Validation passed", style("✓").green());
    } else {
        eprintln!("{}", style("Validation errors:").red());
        for error in &report.errors {
            eprintln!("  - {}", error);
        }
    }

    if !report.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &report.warnings {
            eprintln!("  - {}", warning);
        }
    }

    if !result.diagnostics.is_empty() {
        eprintln!("{}", style("Skipped rows:").yellow());
        for diagnostic in &result.diagnostics {
            eprintln!("  - {}", diagnostic);
        }
    }
}
