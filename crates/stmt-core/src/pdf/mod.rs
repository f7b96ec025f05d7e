//! Ingestion collaborators: turn source bytes into an [`IngestedDocument`].

#[cfg(feature = "pdf")]
mod extractor;

#[cfg(feature = "pdf")]
pub use extractor::PdfIngestor;

use crate::error::IngestError;
use crate::models::document::IngestedDocument;

/// Result type for ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Trait for document sources.
pub trait DocumentIngestor {
    /// Convert raw bytes into pages of text and tables.
    fn ingest(&self, data: &[u8]) -> Result<IngestedDocument>;
}

/// Optical character recognition for pages without a text layer.
///
/// Passed explicitly to an ingestor; nothing looks one up globally.
pub trait OcrProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Recognize the text of one page (1-indexed) of a PDF.
    fn recognize_page(&self, pdf: &[u8], page: u32) -> Result<String>;
}

/// Reads documents that were ingested elsewhere and saved as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonIngestor;

impl DocumentIngestor for JsonIngestor {
    fn ingest(&self, data: &[u8]) -> Result<IngestedDocument> {
        let text = std::str::from_utf8(data).map_err(|e| IngestError::Parse(e.to_string()))?;
        IngestedDocument::from_json(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_ingestor() {
        let doc = JsonIngestor
            .ingest(br#"{"pages":[{"number":1,"text":"HDFC Bank"}]}"#)
            .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].text, "HDFC Bank");
    }

    #[test]
    fn test_json_ingestor_rejects_invalid_utf8() {
        assert!(matches!(
            JsonIngestor.ingest(&[0xff, 0xfe]),
            Err(IngestError::Parse(_))
        ));
    }
}
