//! Documents handed in by the ingestion collaborator.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Content from a single statement page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestedPage {
    /// Page number (1-indexed).
    pub number: u32,

    /// Raw text extracted from this page (empty if none).
    #[serde(default)]
    pub text: String,

    /// Table grids on this page: tables -> rows -> cells.
    #[serde(default)]
    pub tables: Vec<TableGrid>,

    /// OCR text, when an OCR provider was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

/// Ordered rows of ordered cell strings.
pub type TableGrid = Vec<Vec<String>>;

impl IngestedPage {
    /// Create a text-only page.
    pub fn from_text(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            tables: Vec::new(),
            ocr_text: None,
        }
    }

    /// Add a table grid.
    pub fn with_table(mut self, table: TableGrid) -> Self {
        self.tables.push(table);
        self
    }

    /// Attach OCR text.
    pub fn with_ocr_text(mut self, text: impl Into<String>) -> Self {
        self.ocr_text = Some(text.into());
        self
    }

    /// Text that line-oriented strategies should read: the raw text, or the
    /// OCR text when the raw layer is blank.
    pub fn line_source(&self) -> &str {
        if self.text.trim().is_empty() {
            self.ocr_text.as_deref().unwrap_or("")
        } else {
            &self.text
        }
    }
}

/// An ordered sequence of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestedDocument {
    /// Pages in document order.
    #[serde(default)]
    pub pages: Vec<IngestedPage>,
}

impl IngestedDocument {
    pub fn new(pages: Vec<IngestedPage>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Load a pre-ingested document from JSON.
    pub fn from_json(content: &str) -> Result<Self, IngestError> {
        serde_json::from_str(content).map_err(|e| IngestError::Parse(e.to_string()))
    }
}
