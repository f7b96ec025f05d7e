//! PDF ingestion using lopdf and pdf-extract.

use std::borrow::Cow;
use std::sync::Arc;

use lopdf::Document;
use tracing::{debug, trace};

use super::{DocumentIngestor, OcrProvider, Result};
use crate::error::IngestError;
use crate::models::config::IngestConfig;
use crate::models::document::{IngestedDocument, IngestedPage};

/// Extracts per-page text from PDFs. Pages with too little embedded text
/// are sent to the OCR provider when one was supplied.
pub struct PdfIngestor {
    max_pages: usize,
    min_text_length: usize,
    ocr: Option<Arc<dyn OcrProvider>>,
}

impl PdfIngestor {
    pub fn new() -> Self {
        Self::from_config(&IngestConfig::default())
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            min_text_length: config.min_text_length,
            ocr: None,
        }
    }

    /// Enable OCR for textless pages.
    pub fn with_ocr(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.ocr = Some(provider);
        self
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Load the PDF, decrypting empty-password files. Returns the bytes
    /// pdf-extract should read and the page count.
    fn load<'a>(&self, data: &'a [u8]) -> Result<(Cow<'a, [u8]>, usize)> {
        let mut doc = Document::load_mem(data).map_err(|e| IngestError::Parse(e.to_string()))?;

        let bytes = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(IngestError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| IngestError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            Cow::Owned(decrypted)
        } else {
            Cow::Borrowed(data)
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(IngestError::NoPages);
        }
        Ok((bytes, page_count))
    }
}

impl Default for PdfIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentIngestor for PdfIngestor {
    fn ingest(&self, data: &[u8]) -> Result<IngestedDocument> {
        let (bytes, page_count) = self.load(data)?;

        let texts = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| IngestError::TextExtraction(e.to_string()))?;

        let limit = match self.max_pages {
            0 => page_count,
            n => n.min(page_count),
        };

        let mut pages = Vec::with_capacity(limit);
        for number in 1..=limit as u32 {
            // pdf-extract can report fewer pages than the page tree
            let text = texts.get(number as usize - 1).cloned().unwrap_or_default();

            let mut page = IngestedPage::from_text(number, text);
            if page.text.trim().len() < self.min_text_length {
                if let Some(ocr) = &self.ocr {
                    trace!("Page {} has little text, running {}", number, ocr.name());
                    page = page.with_ocr_text(ocr.recognize_page(&bytes, number)?);
                }
            }
            pages.push(page);
        }

        debug!(
            "Ingested PDF: {} of {} pages, {} chars of text",
            pages.len(),
            page_count,
            pages.iter().map(|p| p.text.len()).sum::<usize>()
        );
        Ok(IngestedDocument::new(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_are_a_parse_error() {
        let result = PdfIngestor::new().ingest(b"definitely not a pdf");
        assert!(matches!(result, Err(IngestError::Parse(_))));
    }

    struct FixedOcr;

    impl OcrProvider for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize_page(&self, _pdf: &[u8], page: u32) -> Result<String> {
            Ok(format!("page {}", page))
        }
    }

    #[test]
    fn test_ocr_is_an_explicit_capability() {
        assert!(!PdfIngestor::new().has_ocr());
        assert!(PdfIngestor::new().with_ocr(Arc::new(FixedOcr)).has_ocr());
    }
}
