//! Error types for the stmt-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::transaction::{BankId, SourceRef};

/// Main error type for the stmt library.
#[derive(Error, Debug)]
pub enum StmtError {
    /// The ingested document has no pages at all.
    #[error("document has no pages")]
    IngestionEmpty,

    /// A bank was detected but no transaction candidates were found.
    #[error("no transaction candidates found for {0}")]
    NoCandidatesFound(BankId),

    /// The final record set broke a structural invariant.
    #[error("validation failed with {0} structural error(s)")]
    ValidationFailed(usize),

    /// Ingestion collaborator error.
    #[error("ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised at the ingestion boundary.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Failed to open/parse the source document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract page text.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The source has no pages.
    #[error("document has no pages")]
    NoPages,

    /// The OCR provider failed for a page.
    #[error("OCR failed on page {page}: {reason}")]
    Ocr { page: u32, reason: String },
}

/// Candidate-level normalization failures. Always recovered by dropping
/// the candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "token", rename_all = "snake_case")]
pub enum NormalizeError {
    /// No date format yielded a real calendar date.
    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),

    /// The amount token has non-numeric residue or ambiguous separators.
    #[error("unparseable amount: {0:?}")]
    UnparseableAmount(String),
}

/// Why a row or candidate did not reach the output set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The row did not match the strategy's shape.
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// A totals/opening/closing balance row.
    #[error("summary row skipped: {0}")]
    SummaryRow(String),

    /// Normalization failed.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Collapsed into an earlier record with the same key.
    #[error("duplicate of record #{kept_index}")]
    Duplicate { kept_index: usize },
}

/// A row or candidate that did not make it into the output, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub source: SourceRef,
    pub reason: DropReason,
}

impl Diagnostic {
    pub fn new(source: SourceRef, reason: impl Into<DropReason>) -> Self {
        Self {
            source,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// Result type for the stmt library.
pub type Result<T> = std::result::Result<T, StmtError>;
