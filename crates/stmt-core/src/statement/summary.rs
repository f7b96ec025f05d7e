//! Totals over a record set.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::transaction::{Side, TransactionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub count: usize,
    pub debit_count: usize,
    pub credit_count: usize,
    /// Sum of debit magnitudes (non-negative).
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    /// Credits minus debits.
    pub net: Decimal,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub low_confidence: usize,
}

impl StatementSummary {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut summary = Self {
            count: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.txn_type() {
                Side::Debit => {
                    summary.debit_count += 1;
                    summary.total_debits = summary.total_debits.saturating_add(record.amount().abs());
                }
                Side::Credit => {
                    summary.credit_count += 1;
                    summary.total_credits = summary.total_credits.saturating_add(record.amount().abs());
                }
            }
            if record.is_low_confidence() {
                summary.low_confidence += 1;
            }

            let date = record.date();
            summary.earliest = Some(summary.earliest.map_or(date, |d| d.min(date)));
            summary.latest = Some(summary.latest.map_or(date, |d| d.max(date)));
        }

        summary.net = summary.total_credits.saturating_sub(summary.total_debits);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_totals_and_range() {
        let records: Vec<TransactionRecord> = serde_json::from_str(
            r#"[
            {"date": "2025-01-20", "description": "ATM", "amount": "-500.00", "type": "debit",
             "bank": "HDFC", "confidence": "normal",
             "raw": {"date": "20/01/2025", "description": "ATM", "amount": "500.00", "source": {"page": 1, "row": 0}}},
            {"date": "2025-01-05", "description": "SALARY", "amount": "2000.00", "type": "credit",
             "bank": "HDFC", "confidence": "low",
             "raw": {"date": "05/01/2025", "description": "SALARY", "amount": "2000.00", "source": {"page": 1, "row": 1}}}
        ]"#,
        )
        .unwrap();

        let summary = StatementSummary::from_records(&records);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.debit_count, 1);
        assert_eq!(summary.total_debits, Decimal::from_str("500.00").unwrap());
        assert_eq!(summary.net, Decimal::from_str("1500.00").unwrap());
        assert_eq!(summary.earliest, NaiveDate::from_ymd_opt(2025, 1, 5));
        assert_eq!(summary.latest, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(summary.low_confidence, 1);
    }
}
