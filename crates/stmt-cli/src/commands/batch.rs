//! Batch processing command for multiple statement files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use stmt_core::models::config::StmtConfig;
use stmt_core::{StatementPipeline, StatementResult};

use super::{format_result, is_supported, load_config, read_document, BankArg, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (default: from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip detection and use this bank's rules for every file
    #[arg(short, long, value_enum)]
    bank: Option<BankArg>,

    /// Write every output directly into the output directory
    #[arg(long)]
    flat: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Treat files with no records or validation errors as failures
    #[arg(long)]
    strict: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<StatementResult>,
    output: Option<PathBuf>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.base_dir.clone());
    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from(config.output.format));
    let organize = config.output.organize_by_bank && !args.flat;
    fs::create_dir_all(&output_dir)?;

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // The pipeline holds only configuration, so workers share one instance
    let pipeline = Arc::new(
        StatementPipeline::from_config(config.clone()).with_bank(args.bank.map(Into::into)),
    );
    let config = Arc::new(config);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let strict = args.strict;

    let mut tasks = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let pipeline = Arc::clone(&pipeline);
        let config = Arc::clone(&config);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = process_single_file(&path, &pipeline, &config, strict);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            (index, path, outcome, processing_time_ms)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, path, outcome, processing_time_ms) = joined?;
        let entry = match outcome {
            Ok(result) => ProcessResult {
                path,
                result: Some(result),
                output: None,
                error: None,
                processing_time_ms,
            },
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                ProcessResult {
                    path,
                    result: None,
                    output: None,
                    error: Some(error_msg),
                    processing_time_ms,
                }
            }
        };
        results.push((index, entry));
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    // Report in input order regardless of completion order
    results.sort_by_key(|(index, _)| *index);
    let mut results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    let mut taken = HashSet::new();
    for entry in &mut results {
        if let Some(result) = &entry.result {
            let output_path = claim_path(
                output_path_for(&entry.path, result, &output_dir, organize, format),
                &mut taken,
            );
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, format_result(result, format)?)?;
            debug!("Wrote output to {}", output_path.display());
            entry.output = Some(output_path);
        }
    }

    if args.summary {
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.result.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for entry in &failed {
            eprintln!(
                "  - {}: {}",
                entry.path.display(),
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    pipeline: &StatementPipeline,
    config: &StmtConfig,
    strict: bool,
) -> anyhow::Result<StatementResult> {
    let document = read_document(path, config)?;
    let result = pipeline.process(&document)?;
    if strict {
        result.check()?;
    }
    Ok(result)
}

/// `<out>/<bank>/<YYYY-MM>/<stem>.<ext>`, or `<out>/<stem>.<ext>` when flat.
/// Directory names come from the bank identifier and parsed dates only.
fn output_path_for(
    input: &Path,
    result: &StatementResult,
    output_dir: &Path,
    organize: bool,
    format: OutputFormat,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");
    let file_name = format!("{}.{}", stem, format.extension());

    if organize {
        let month = result.month_key().unwrap_or_else(|| "unknown".to_string());
        output_dir.join(result.bank.slug()).join(month).join(file_name)
    } else {
        output_dir.join(file_name)
    }
}

/// Reserve `path` for this run. Inputs sharing a stem would land on the
/// same file, so later ones get `-2`, `-3`, ... before the extension.
fn claim_path(path: PathBuf, taken: &mut HashSet<PathBuf>) -> PathBuf {
    if taken.insert(path.clone()) {
        return path;
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement")
        .to_string();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut n = 2;
    loop {
        let candidate = path.with_file_name(format!("{}-{}{}", stem, n, extension));
        if taken.insert(candidate.clone()) {
            warn!("{} is already used by this batch, writing {}", path.display(), candidate.display());
            return candidate;
        }
        n += 1;
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "bank",
        "month",
        "records",
        "dropped",
        "duplicates",
        "valid",
        "total_debits",
        "total_credits",
        "output",
        "processing_time_ms",
        "error",
    ])?;

    for entry in results {
        let filename = entry
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        let output = entry
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        if let Some(result) = &entry.result {
            wtr.write_record([
                filename,
                "success".to_string(),
                result.bank.slug().to_string(),
                result.month_key().unwrap_or_default(),
                result.stats.accepted.to_string(),
                result.stats.dropped.to_string(),
                result.stats.duplicates.to_string(),
                result.report.valid.to_string(),
                result.summary.total_debits.to_string(),
                result.summary.total_credits.to_string(),
                output,
                entry.processing_time_ms.to_string(),
                String::new(),
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                output,
                entry.processing_time_ms.to_string(),
                entry.error.clone().unwrap_or_default(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stmt_core::{IngestedDocument, IngestedPage};

    fn result(text: &str) -> StatementResult {
        let doc = IngestedDocument::new(vec![IngestedPage::from_text(1, text)]);
        StatementPipeline::new().process(&doc).unwrap()
    }

    #[test]
    fn test_organized_output_path() {
        let result = result(
            "HDFC Bank\nStatement Period: 01/01/2025 to 31/01/2025\nDomestic Transactions\n\
             02/01/2025 AMAZON PAY INDIA 1,299.00 Dr\n",
        );
        let path = output_path_for(
            Path::new("in/jan.pdf"),
            &result,
            Path::new("out"),
            true,
            OutputFormat::Csv,
        );
        assert_eq!(path, PathBuf::from("out/hdfc/2025-01/jan.csv"));

        let flat = output_path_for(
            Path::new("in/jan.pdf"),
            &result,
            Path::new("out"),
            false,
            OutputFormat::Json,
        );
        assert_eq!(flat, PathBuf::from("out/jan.json"));
    }

    #[test]
    fn test_same_stem_inputs_get_distinct_outputs() {
        let result = result(
            "HDFC Bank\nDomestic Transactions\n02/01/2025 AMAZON PAY INDIA 1,299.00 Dr\n",
        );
        let mut taken = HashSet::new();
        let paths: Vec<PathBuf> = ["a/jan.pdf", "b/jan.json", "c/jan.pdf"]
            .iter()
            .map(|input| {
                claim_path(
                    output_path_for(Path::new(input), &result, Path::new("out"), false, OutputFormat::Json),
                    &mut taken,
                )
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("out/jan.json"),
                PathBuf::from("out/jan-2.json"),
                PathBuf::from("out/jan-3.json"),
            ]
        );

        // A generated name that a later input really has keeps both apart
        let next = claim_path(PathBuf::from("out/jan-2.json"), &mut taken);
        assert_eq!(next, PathBuf::from("out/jan-2-2.json"));
    }

    #[test]
    fn test_undated_result_goes_to_unknown_month() {
        let result = result("Some Credit Union\nno transactions here\n");
        let path = output_path_for(
            Path::new("x.json"),
            &result,
            Path::new("out"),
            true,
            OutputFormat::Text,
        );
        assert_eq!(path, PathBuf::from("out/generic/unknown/x.txt"));
    }
}
