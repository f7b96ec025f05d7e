//! Statement pipeline: Detect → Extract → Normalize → Dedup → Validate.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::dedup::{dedup, DuplicateEntry};
use super::detector::BankDetector;
use super::normalize::FieldNormalizer;
use super::period::StatementPeriod;
use super::strategy::{ExtractionStrategy, Strategy};
use super::summary::StatementSummary;
use super::validate::{ValidationReport, Validator};
use crate::error::{Diagnostic, DropReason, Result, StmtError};
use crate::models::config::StmtConfig;
use crate::models::document::IngestedDocument;
use crate::models::transaction::{BankId, TransactionRecord};

/// Candidate accounting. `attempted == accepted + dropped + duplicates`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub attempted: usize,
    pub dropped: usize,
    pub accepted: usize,
    pub duplicates: usize,
}

/// Everything a pipeline run produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct StatementResult {
    pub bank: BankId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<StatementPeriod>,
    pub records: Vec<TransactionRecord>,
    pub report: ValidationReport,
    pub stats: PipelineStats,
    pub diagnostics: Vec<Diagnostic>,
    pub duplicates: Vec<DuplicateEntry>,
    pub summary: StatementSummary,
    pub processing_time_ms: u64,
}

impl StatementResult {
    /// Fail when nothing was extracted or the report is invalid. Callers
    /// that want to export anyway can skip this.
    pub fn check(&self) -> Result<()> {
        if self.stats.attempted == 0 {
            return Err(StmtError::NoCandidatesFound(self.bank));
        }
        if !self.report.valid {
            return Err(StmtError::ValidationFailed(self.report.errors.len()));
        }
        Ok(())
    }

    /// Month key ("YYYY-MM") for output placement: the statement period end
    /// when one was printed, else the latest transaction date.
    pub fn month_key(&self) -> Option<String> {
        self.period
            .map(|p| p.month_key())
            .or_else(|| self.summary.latest.map(|d| d.format("%Y-%m").to_string()))
    }
}

/// Runs one document through every stage. Holds only read-only
/// configuration, so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct StatementPipeline {
    config: StmtConfig,
    normalizer: FieldNormalizer,
    bank_override: Option<BankId>,
}

impl StatementPipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::from_config(StmtConfig::default())
    }

    pub fn from_config(config: StmtConfig) -> Self {
        let normalizer = FieldNormalizer::new(&config);
        Self {
            config,
            normalizer,
            bank_override: None,
        }
    }

    /// Skip detection and use this bank.
    pub fn with_bank(mut self, bank: Option<BankId>) -> Self {
        self.bank_override = bank;
        self
    }

    pub fn config(&self) -> &StmtConfig {
        &self.config
    }

    /// Process a document. Only a document without pages is an error;
    /// everything else is accounted for in the result.
    pub fn process(&self, document: &IngestedDocument) -> Result<StatementResult> {
        let start = Instant::now();

        if document.is_empty() {
            warn!("Document has no pages");
            return Err(StmtError::IngestionEmpty);
        }

        // Detect
        let detector = BankDetector::new(document);
        let bank = self.bank_override.unwrap_or_else(|| detector.detect());
        let period = StatementPeriod::detect(detector.text(), self.normalizer.dates());
        info!("Detected bank: {} ({} pages)", bank, document.page_count());
        if let Some(p) = &period {
            debug!("Statement period: {:?} to {}", p.start, p.end);
        }

        // Extract
        let strategy = Strategy::for_bank(bank, &self.config.extraction, self.normalizer.dates());
        let extraction = strategy.extract(document);
        let mut diagnostics = extraction.diagnostics;
        let attempted = extraction.candidates.len();
        debug!(
            "{} strategy: {} candidates, {} skipped rows",
            strategy.name(),
            attempted,
            diagnostics.len()
        );

        // Normalize
        let mut normalized = Vec::with_capacity(attempted);
        let mut dropped = 0;
        for candidate in extraction.candidates {
            let source = candidate.source;
            match self.normalizer.normalize(candidate, bank) {
                Ok(record) => normalized.push(record),
                Err(e) => {
                    debug!("Dropped candidate at {}: {}", source, e);
                    dropped += 1;
                    diagnostics.push(Diagnostic::new(source, e));
                }
            }
        }

        // Dedup
        let deduped = dedup(normalized);
        for entry in &deduped.duplicates {
            diagnostics.push(Diagnostic::new(
                entry.raw.source,
                DropReason::Duplicate {
                    kept_index: entry.kept_index,
                },
            ));
        }

        // Validate
        let report = Validator::new(self.normalizer.dates(), self.normalizer.placeholder())
            .with_period(period)
            .validate(&deduped.records);

        let stats = PipelineStats {
            attempted,
            dropped,
            accepted: deduped.records.len(),
            duplicates: deduped.duplicates.len(),
        };
        let summary = StatementSummary::from_records(&deduped.records);

        info!(
            "Extracted {} records ({} dropped, {} duplicates), valid: {}",
            stats.accepted, stats.dropped, stats.duplicates, report.valid
        );
        for error in &report.errors {
            warn!("{}", error);
        }

        Ok(StatementResult {
            bank,
            period,
            records: deduped.records,
            report,
            stats,
            diagnostics,
            duplicates: deduped.duplicates,
            summary,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for StatementPipeline {
    fn default() -> Self {
        Self::new()
    }
}
