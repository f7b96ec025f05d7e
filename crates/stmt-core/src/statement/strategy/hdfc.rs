//! HDFC credit card statements: one transaction per text line.

use tracing::trace;

use super::{Extraction, ExtractionStrategy};
use crate::error::{Diagnostic, DropReason};
use crate::models::document::IngestedDocument;
use crate::models::transaction::{RawCandidate, Side, SourceRef};
use crate::statement::rules::patterns::{
    HDFC_DATE_PREFIX, HDFC_LINE, HDFC_SECTION_END, HDFC_SECTION_START,
};

/// Line-oriented parser for `date [time] description amount [Dr/Cr]`.
#[derive(Debug, Clone)]
pub struct HdfcStrategy {
    section_gating: bool,
}

impl HdfcStrategy {
    pub fn new(section_gating: bool) -> Self {
        Self { section_gating }
    }
}

impl Default for HdfcStrategy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ExtractionStrategy for HdfcStrategy {
    fn name(&self) -> &'static str {
        "hdfc"
    }

    fn extract(&self, document: &IngestedDocument) -> Extraction {
        let mut out = Extraction::new();

        for page in &document.pages {
            let text = page.line_source();

            // Pages with section headings only yield lines inside them
            let gated = self.section_gating && text.lines().any(|l| HDFC_SECTION_START.is_match(l));
            let mut in_section = !gated;

            for (row, line) in text.lines().enumerate() {
                if gated {
                    if HDFC_SECTION_START.is_match(line) {
                        in_section = true;
                        continue;
                    }
                    if HDFC_SECTION_END.is_match(line) {
                        in_section = false;
                        continue;
                    }
                }
                if !in_section || line.trim().is_empty() {
                    continue;
                }

                let source = SourceRef::line(page.number, row);
                match HDFC_LINE.captures(line) {
                    Some(caps) => {
                        let marker = caps.name("marker").and_then(|m| Side::from_marker(m.as_str()));
                        out.candidates.push(
                            RawCandidate::new(&caps["date"], &caps["desc"], &caps["amount"], source)
                                .with_marker(marker),
                        );
                    }
                    None if HDFC_DATE_PREFIX.is_match(line) => {
                        trace!("Unmatched dated line at {}: {}", source, line);
                        out.diagnostics.push(Diagnostic::new(
                            source,
                            DropReason::MalformedRow(line.trim().to_string()),
                        ));
                    }
                    None => {}
                }
            }
        }

        out
    }
}
