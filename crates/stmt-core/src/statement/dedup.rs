//! Duplicate removal by full-content key.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::transaction::{RawCandidate, TransactionRecord};

/// Identity of a transaction: date, digest of the whole description, and
/// the signed amount. The description is never truncated before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    date: NaiveDate,
    description: [u8; 32],
    amount: Decimal,
}

impl DedupKey {
    pub fn of(record: &TransactionRecord) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(record.description().as_bytes());
        Self {
            date: record.date(),
            description: hasher.finalize().into(),
            // 1.5 and 1.50 are the same amount
            amount: record.amount().normalize(),
        }
    }
}

/// A record dropped as a duplicate, kept for audit.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateEntry {
    /// Position of the surviving record in the deduplicated output.
    pub kept_index: usize,
    /// The dropped record's source data.
    pub raw: RawCandidate,
}

/// Output of [`dedup`].
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub records: Vec<TransactionRecord>,
    pub duplicates: Vec<DuplicateEntry>,
}

/// Keep the first record for each [`DedupKey`], in input order.
pub fn dedup(records: Vec<TransactionRecord>) -> Deduplicated {
    let mut seen: HashMap<DedupKey, usize> = HashMap::with_capacity(records.len());
    let mut out = Deduplicated {
        records: Vec::with_capacity(records.len()),
        duplicates: Vec::new(),
    };

    for record in records {
        let key = DedupKey::of(&record);
        match seen.get(&key) {
            Some(&kept_index) => {
                debug!(
                    "Duplicate at {} collapsed into record #{}",
                    record.raw().source,
                    kept_index
                );
                out.duplicates.push(DuplicateEntry {
                    kept_index,
                    raw: record.raw().clone(),
                });
            }
            None => {
                seen.insert(key, out.records.len());
                out.records.push(record);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::StmtConfig;
    use crate::models::transaction::{BankId, Side, SourceRef};
    use crate::statement::normalize::FieldNormalizer;

    fn record(date: &str, desc: &str, amount: &str, row: usize) -> TransactionRecord {
        let candidate = RawCandidate::new(date, desc, amount, SourceRef::line(1, row))
            .with_marker(Some(Side::Debit));
        FieldNormalizer::new(&StmtConfig::default())
            .normalize(candidate, BankId::Hdfc)
            .unwrap()
    }

    #[test]
    fn test_identical_records_collapse_to_first() {
        let out = dedup(vec![
            record("01/02/2025", "NETFLIX", "649.00", 0),
            record("01/02/2025", "NETFLIX", "649.0", 1),
        ]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].raw().source.row, 0);
        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].kept_index, 0);
        assert_eq!(out.duplicates[0].raw.source.row, 1);
    }

    #[test]
    fn test_records_differing_only_by_date_survive() {
        let out = dedup(vec![
            record("01/02/2025", "NETFLIX", "649.00", 0),
            record("01/03/2025", "NETFLIX", "649.00", 1),
        ]);
        assert_eq!(out.records.len(), 2);
        assert!(out.duplicates.is_empty());
    }

    #[test]
    fn test_long_common_prefix_is_not_a_duplicate() {
        let prefix = "RECURRING CARD PAYMENT TO STREAMING SERVICES INTERNATIONAL LIMITED ";
        let out = dedup(vec![
            record("01/02/2025", &format!("{}VIDEO PLAN", prefix), "649.00", 0),
            record("01/02/2025", &format!("{}MUSIC PLAN", prefix), "649.00", 1),
        ]);
        assert_eq!(out.records.len(), 2);
    }
}
