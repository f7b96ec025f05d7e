//! Structural checks over the final record set.

use serde::{Deserialize, Serialize};

use super::period::StatementPeriod;
use super::rules::DateParser;
use crate::models::transaction::TransactionRecord;

/// Diagnostic report. Errors make the set invalid; warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub transaction_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub valid: bool,
}

/// Inspects records without altering them.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    dates: &'a DateParser,
    placeholder: &'a str,
    period: Option<StatementPeriod>,
}

impl<'a> Validator<'a> {
    pub fn new(dates: &'a DateParser, placeholder: &'a str) -> Self {
        Self {
            dates,
            placeholder,
            period: None,
        }
    }

    /// Warn about records outside this period.
    pub fn with_period(mut self, period: Option<StatementPeriod>) -> Self {
        self.period = period;
        self
    }

    pub fn validate(&self, records: &[TransactionRecord]) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if records.is_empty() {
            errors.push("No transactions found".to_string());
        }

        let mut low_confidence = 0;
        for (i, record) in records.iter().enumerate() {
            if !record.sign_matches_type() {
                errors.push(format!(
                    "Record #{}: amount {} disagrees with type {:?}",
                    i,
                    record.amount(),
                    record.txn_type()
                ));
            }

            if !self.dates.is_plausible(record.date()) {
                errors.push(format!("Record #{}: invalid date {}", i, record.date()));
            }

            if record.description().is_empty() {
                errors.push(format!("Record #{}: empty description", i));
            } else if record.description() == self.placeholder {
                warnings.push(format!(
                    "Record #{}: no description at {}",
                    i,
                    record.raw().source
                ));
            }

            if let Some(period) = &self.period {
                if !period.contains(record.date()) {
                    warnings.push(format!(
                        "Record #{}: date {} outside statement period",
                        i,
                        record.date()
                    ));
                }
            }

            if record.is_low_confidence() {
                low_confidence += 1;
            }
        }

        if low_confidence > 0 {
            warnings.push(format!(
                "{} of {} records have an inferred debit/credit side",
                low_confidence,
                records.len()
            ));
        }

        ValidationReport {
            transaction_count: records.len(),
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
