//! Field normalization: raw candidates to canonical records.

use rust_decimal::Decimal;
use tracing::trace;

use super::rules::{clean_description, parse_amount, split_marker, DateParser};
use crate::error::NormalizeError;
use crate::models::config::StmtConfig;
use crate::models::transaction::{
    BankId, Confidence, RawCandidate, Side, SideHint, TransactionRecord,
};

/// Resolves dates, amounts, descriptions and sides.
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    dates: DateParser,
    placeholder: String,
    unmarked_side: Side,
}

impl FieldNormalizer {
    pub fn new(config: &StmtConfig) -> Self {
        Self {
            dates: DateParser::from_config(&config.normalization),
            placeholder: config.normalization.description_placeholder.clone(),
            unmarked_side: config.extraction.unmarked_side,
        }
    }

    /// Promote a candidate to a record, or say why it cannot be.
    pub fn normalize(
        &self,
        candidate: RawCandidate,
        bank: BankId,
    ) -> Result<TransactionRecord, NormalizeError> {
        let date = self
            .dates
            .parse(&candidate.date)
            .ok_or_else(|| NormalizeError::UnparseableDate(candidate.date.clone()))?;

        let (amount_token, token_marker) = split_marker(&candidate.amount);
        let value = parse_amount(amount_token)
            .ok_or_else(|| NormalizeError::UnparseableAmount(candidate.amount.clone()))?;

        let hint = SideHint {
            marker: candidate.side.marker.or(token_marker),
            column: candidate.side.column,
        };
        let (side, mut confidence) = self.resolve_side(hint, value.is_sign_negative());
        if candidate.low_confidence || !bank.has_dedicated_strategy() {
            confidence = Confidence::Low;
        }

        let balance = candidate.balance.as_deref().and_then(parse_balance);

        let mut description = clean_description(&candidate.description);
        if description.is_empty() {
            description = self.placeholder.clone();
        }

        trace!(
            "Normalized {}: {} {} {:?} {:?}",
            candidate.source,
            date,
            value,
            side,
            confidence
        );

        Ok(TransactionRecord::new(
            date,
            description,
            value.abs(),
            side,
            balance,
            bank,
            confidence,
            candidate,
        ))
    }

    /// Pick a side: explicit marker, then column position, then the amount's
    /// own sign, then the configured default.
    pub fn resolve_side(&self, hint: SideHint, negative: bool) -> (Side, Confidence) {
        if let Some(marker) = hint.marker {
            let column_disagrees = hint.column.is_some_and(|c| c != marker);
            let sign_disagrees = negative && marker == Side::Credit;
            let confidence = if column_disagrees || sign_disagrees {
                Confidence::Low
            } else {
                Confidence::Normal
            };
            return (marker, confidence);
        }

        if let Some(column) = hint.column {
            let confidence = if negative && column == Side::Credit {
                Confidence::Low
            } else {
                Confidence::Normal
            };
            return (column, confidence);
        }

        if negative {
            return (Side::Debit, Confidence::Normal);
        }

        (self.unmarked_side, Confidence::Low)
    }

    /// Placeholder used for empty descriptions.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn dates(&self) -> &DateParser {
        &self.dates
    }
}

/// Running balance; unparseable tokens become `None`.
fn parse_balance(token: &str) -> Option<Decimal> {
    let (body, _) = split_marker(token);
    parse_amount(body)
}
