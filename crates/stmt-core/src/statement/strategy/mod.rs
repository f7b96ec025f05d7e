//! Extraction strategies: one variant per bank layout plus a generic
//! fallback, selected by [`BankId`].

mod aubank;
mod generic;
mod hdfc;

pub use aubank::AuBankStrategy;
pub use generic::GenericStrategy;
pub use hdfc::HdfcStrategy;

use crate::error::Diagnostic;
use crate::models::config::ExtractionConfig;
use crate::models::document::IngestedDocument;
use crate::models::transaction::{BankId, RawCandidate};
use crate::statement::rules::DateParser;

/// Candidates found by a strategy, in document order, plus the rows it
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub candidates: Vec<RawCandidate>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put candidates and diagnostics back into document order. The sort is
    /// stable, so entries sharing a source line keep their relative order.
    pub fn sort_by_source(&mut self) {
        self.candidates.sort_by_key(|c| c.source);
        self.diagnostics.sort_by_key(|d| d.source);
    }
}

/// Trait for statement layout parsers.
///
/// Implementations never fail: rows that do not fit the layout are
/// recorded as diagnostics and the rest of the document is still read.
pub trait ExtractionStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Turn a document's text and tables into raw candidates.
    fn extract(&self, document: &IngestedDocument) -> Extraction;
}

/// Closed set of strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    Hdfc(HdfcStrategy),
    AuBank(AuBankStrategy),
    Generic(GenericStrategy),
}

impl Strategy {
    /// Pick the strategy for a detected bank. Banks without dedicated rules
    /// use the generic strategy.
    pub fn for_bank(bank: BankId, config: &ExtractionConfig, dates: &DateParser) -> Self {
        match bank {
            BankId::Hdfc => Strategy::Hdfc(HdfcStrategy::new(config.hdfc_section_gating)),
            BankId::AuBank => Strategy::AuBank(
                AuBankStrategy::new(dates.clone())
                    .with_continuation_merge(config.merge_continuation_rows)
                    .with_summary_lines(config.parse_summary_lines),
            ),
            BankId::Icici | BankId::Sbi | BankId::Axis | BankId::Generic => {
                Strategy::Generic(GenericStrategy::new(dates.clone()))
            }
        }
    }
}

impl ExtractionStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Hdfc(s) => s.name(),
            Strategy::AuBank(s) => s.name(),
            Strategy::Generic(s) => s.name(),
        }
    }

    fn extract(&self, document: &IngestedDocument) -> Extraction {
        match self {
            Strategy::Hdfc(s) => s.extract(document),
            Strategy::AuBank(s) => s.extract(document),
            Strategy::Generic(s) => s.extract(document),
        }
    }
}
