//! Bank detection from statement header text.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::document::IngestedDocument;
use crate::models::transaction::BankId;

lazy_static! {
    // Matched against the uppercased document buffer. Bank names count only
    // as full phrases and IFSC masks only after an "IFSC" label; narrations
    // name counterparty banks and codes freely.
    static ref HDFC_SIGNATURE: Regex = Regex::new(
        r"\bHDFC\s+BANK\b|\bMILLENNIA\s+CREDIT\s+CARD\b|\bIFSC(?:\s+CODE)?\s*[:\-]?\s*HDFC0\d{6}\b"
    ).unwrap();

    static ref AU_BANK_SIGNATURE: Regex = Regex::new(
        r"\bAU\s+SMALL\s+FINANCE\s+BANK\b|\bAU\s+BANK\b|\bAUSFB\b|\bIFSC(?:\s+CODE)?\s*[:\-]?\s*AUBL0\d{6}\b"
    ).unwrap();

    static ref ICICI_SIGNATURE: Regex = Regex::new(
        r"\bICICI\s+BANK\b|\bIFSC(?:\s+CODE)?\s*[:\-]?\s*ICIC0\d{6}\b"
    ).unwrap();

    static ref SBI_SIGNATURE: Regex = Regex::new(
        r"\bSTATE\s+BANK\s+OF\s+INDIA\b|\bSBI\s+CARD\b|\bIFSC(?:\s+CODE)?\s*[:\-]?\s*SBIN0\d{6}\b"
    ).unwrap();

    static ref AXIS_SIGNATURE: Regex = Regex::new(
        r"\bAXIS\s+BANK\b|\bIFSC(?:\s+CODE)?\s*[:\-]?\s*UTIB0\d{6}\b"
    ).unwrap();
}

fn signature(bank: BankId) -> Option<&'static Regex> {
    match bank {
        BankId::Hdfc => Some(&HDFC_SIGNATURE),
        BankId::AuBank => Some(&AU_BANK_SIGNATURE),
        BankId::Icici => Some(&ICICI_SIGNATURE),
        BankId::Sbi => Some(&SBI_SIGNATURE),
        BankId::Axis => Some(&AXIS_SIGNATURE),
        BankId::Generic => None,
    }
}

/// Classifies a document into a [`BankId`].
///
/// All page text and OCR text is concatenated once into an uppercase
/// buffer; signatures are then tested in [`BankId::PRIORITY`] order.
#[derive(Debug, Clone)]
pub struct BankDetector {
    text: String,
}

impl BankDetector {
    /// Build the detector's text buffer for a document.
    pub fn new(document: &IngestedDocument) -> Self {
        let capacity = document
            .pages
            .iter()
            .map(|p| p.text.len() + p.ocr_text.as_ref().map_or(0, |t| t.len()) + 2)
            .sum();

        let mut text = String::with_capacity(capacity);
        for page in &document.pages {
            text.push_str(&page.text);
            text.push('\n');
            if let Some(ocr) = &page.ocr_text {
                text.push_str(ocr);
                text.push('\n');
            }
        }

        Self {
            text: text.to_uppercase(),
        }
    }

    /// Detect the bank. Never fails: unmatched text yields `Generic`.
    pub fn detect(&self) -> BankId {
        for bank in BankId::PRIORITY {
            if let Some(re) = signature(bank) {
                if re.is_match(&self.text) {
                    debug!("Bank signature matched: {}", bank);
                    return bank;
                }
            }
        }

        debug!("No bank signature matched, using generic extraction");
        BankId::Generic
    }

    /// The cached uppercase document text.
    pub fn text(&self) -> &str {
        &self.text
    }
}
