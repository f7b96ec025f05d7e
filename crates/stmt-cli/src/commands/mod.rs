//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use stmt_core::models::config::StmtConfig;
use stmt_core::statement::rules::format_amount;
use stmt_core::{
    BankId, DocumentIngestor, IngestedDocument, JsonIngestor, PdfIngestor, StatementResult,
};

/// Output format selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV of the accepted records
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

impl From<stmt_core::OutputFormat> for OutputFormat {
    fn from(format: stmt_core::OutputFormat) -> Self {
        match format {
            stmt_core::OutputFormat::Json => OutputFormat::Json,
            stmt_core::OutputFormat::Csv => OutputFormat::Csv,
            stmt_core::OutputFormat::Text => OutputFormat::Text,
        }
    }
}

/// Bank forced on the command line instead of detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BankArg {
    Hdfc,
    Aubank,
    Icici,
    Sbi,
    Axis,
    Generic,
}

impl From<BankArg> for BankId {
    fn from(bank: BankArg) -> Self {
        match bank {
            BankArg::Hdfc => BankId::Hdfc,
            BankArg::Aubank => BankId::AuBank,
            BankArg::Icici => BankId::Icici,
            BankArg::Sbi => BankId::Sbi,
            BankArg::Axis => BankId::Axis,
            BankArg::Generic => BankId::Generic,
        }
    }
}

/// Load the `--config` file, or defaults when none was given.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StmtConfig> {
    match config_path {
        Some(path) => StmtConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e)),
        None => Ok(StmtConfig::default()),
    }
}

/// Whether a path has an extension the ingestors understand.
pub fn is_supported(path: &Path) -> bool {
    matches!(extension_of(path).as_str(), "pdf" | "json")
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a statement PDF, or a document that was ingested earlier and
/// saved as JSON.
pub fn read_document(path: &Path, config: &StmtConfig) -> anyhow::Result<IngestedDocument> {
    let extension = extension_of(path);
    let data = fs::read(path)?;

    let document = match extension.as_str() {
        "pdf" => PdfIngestor::from_config(&config.ingest).ingest(&data)?,
        "json" => JsonIngestor.ingest(&data)?,
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    Ok(document)
}

pub fn format_result(result: &StatementResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &StatementResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "description",
        "amount",
        "type",
        "balance",
        "bank",
        "confidence",
    ])?;

    for record in &result.records {
        wtr.write_record([
            record.date().to_string(),
            record.description().to_string(),
            record.amount().to_string(),
            record.txn_type().as_str().to_string(),
            record.balance().map(|b| b.to_string()).unwrap_or_default(),
            record.bank().slug().to_string(),
            record.confidence().as_str().to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &StatementResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bank: {}\n", result.bank.display_name()));
    if let Some(period) = &result.period {
        match period.start {
            Some(start) => output.push_str(&format!("Period: {} to {}\n", start, period.end)),
            None => output.push_str(&format!("Statement date: {}\n", period.end)),
        }
    }
    output.push('\n');

    output.push_str("Transactions:\n");
    for record in &result.records {
        let flag = if record.is_low_confidence() { " ?" } else { "" };
        output.push_str(&format!(
            "  {}  {:<40}  {:>14} {}{}\n",
            record.date(),
            record.description(),
            format_amount(record.amount().abs()),
            record.txn_type().marker(),
            flag
        ));
    }
    output.push('\n');

    let summary = &result.summary;
    output.push_str("Summary:\n");
    output.push_str(&format!(
        "  Records: {} ({} debit, {} credit)\n",
        summary.count, summary.debit_count, summary.credit_count
    ));
    output.push_str(&format!("  Debits:  {}\n", format_amount(summary.total_debits)));
    output.push_str(&format!("  Credits: {}\n", format_amount(summary.total_credits)));
    output.push_str(&format!("  Net:     {}\n", format_amount(summary.net)));
    if summary.low_confidence > 0 {
        output.push_str(&format!(
            "\n{} record(s) marked ? have an inferred debit/credit side\n",
            summary.low_confidence
        ));
    }

    output
}
