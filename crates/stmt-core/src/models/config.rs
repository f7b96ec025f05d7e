//! Configuration structures for the statement pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::transaction::Side;

/// Main configuration for the stmt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtConfig {
    /// Ingestion collaborator configuration.
    pub ingest: IngestConfig,

    /// Extraction strategy configuration.
    pub extraction: ExtractionConfig,

    /// Field normalization configuration.
    pub normalization: NormalizationConfig,

    /// Output configuration (used by the CLI).
    pub output: OutputConfig,
}

/// PDF ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum pages to ingest (0 = unlimited).
    pub max_pages: usize,

    /// Pages with less embedded text than this are handed to the OCR
    /// provider, when one is configured.
    pub min_text_length: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 50,
        }
    }
}

/// Extraction strategy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Side assumed when neither a marker nor a column identifies it.
    /// Records using this fallback are flagged low-confidence.
    pub unmarked_side: Side,

    /// Restrict HDFC line matching to transaction sections when the page
    /// has section headings.
    pub hdfc_section_gating: bool,

    /// Merge dateless AU Bank table rows into the previous row's description.
    pub merge_continuation_rows: bool,

    /// Parse the AU Bank compressed "Transaction Summary" text block.
    pub parse_summary_lines: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            unmarked_side: Side::Credit,
            hdfc_section_gating: true,
            merge_continuation_rows: true,
            parse_summary_lines: true,
        }
    }
}

/// Field normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Description used when cleaning leaves nothing.
    pub description_placeholder: String,

    /// Two-digit years up to and including this value map to 20xx,
    /// larger values to 19xx.
    pub two_digit_year_pivot: u32,

    /// Earliest plausible transaction year.
    pub min_year: i32,

    /// Latest plausible transaction year.
    pub max_year: i32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            description_placeholder: "(no description)".to_string(),
            two_digit_year_pivot: 50,
            min_year: 1900,
            max_year: 2100,
        }
    }
}

/// Output format for exported records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,

    /// Place batch outputs under `<base_dir>/<bank>/<YYYY-MM>/`.
    pub organize_by_bank: bool,

    /// Base directory for organized outputs.
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            organize_by_bank: true,
            base_dir: PathBuf::from("outputs"),
        }
    }
}

impl StmtConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StmtConfig =
            serde_json::from_str(r#"{"extraction": {"unmarked_side": "debit"}}"#).unwrap();
        assert_eq!(config.extraction.unmarked_side, Side::Debit);
        assert!(config.extraction.hdfc_section_gating);
        assert_eq!(config.normalization.two_digit_year_pivot, 50);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_default_unmarked_side_is_credit() {
        assert_eq!(StmtConfig::default().extraction.unmarked_side, Side::Credit);
    }
}
