//! Core library for bank statement extraction.
//!
//! This crate provides:
//! - Bank detection over ingested page text
//! - Per-bank extraction strategies (HDFC, AU Bank) and a generic fallback
//! - Field normalization for dates, amounts, descriptions and debit/credit sides
//! - Full-content deduplication and structural validation
//! - PDF ingestion (lopdf + pdf-extract) with an optional OCR capability

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{Diagnostic, DropReason, IngestError, NormalizeError, Result, StmtError};
pub use models::config::{OutputFormat, StmtConfig};
pub use models::document::{IngestedDocument, IngestedPage, TableGrid};
pub use models::transaction::{
    BankId, Confidence, RawCandidate, Side, SideHint, SourceRef, TransactionRecord,
};
pub use pdf::{DocumentIngestor, JsonIngestor, OcrProvider};
#[cfg(feature = "pdf")]
pub use pdf::PdfIngestor;
pub use statement::{
    BankDetector, FieldNormalizer, PipelineStats, StatementPeriod, StatementPipeline,
    StatementResult, StatementSummary, ValidationReport,
};
