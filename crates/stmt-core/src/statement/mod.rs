//! Bank statement extraction.

pub mod dedup;
pub mod detector;
pub mod normalize;
pub mod period;
mod pipeline;
pub mod rules;
pub mod strategy;
pub mod summary;
pub mod validate;

pub use dedup::{dedup, DedupKey, Deduplicated, DuplicateEntry};
pub use detector::BankDetector;
pub use normalize::FieldNormalizer;
pub use period::StatementPeriod;
pub use pipeline::{PipelineStats, StatementPipeline, StatementResult};
pub use strategy::{Extraction, ExtractionStrategy, Strategy};
pub use summary::StatementSummary;
pub use validate::{ValidationReport, Validator};
