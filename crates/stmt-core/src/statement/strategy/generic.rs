//! Fallback for layouts without dedicated rules.

use tracing::trace;

use super::aubank::{join_cells, ColumnRoles};
use super::{Extraction, ExtractionStrategy};
use crate::error::{Diagnostic, DropReason};
use crate::models::document::IngestedDocument;
use crate::models::transaction::{RawCandidate, Side, SourceRef};
use crate::statement::rules::patterns::{DATE_LINE_PREFIX, GENERIC_LINE};
use crate::statement::rules::{parse_amount, split_marker, DateParser};

/// Relaxed `date ... amount [Dr/Cr] [balance]` matching over text lines,
/// plus a cell-classifying pass over table grids. Every candidate is
/// flagged low-confidence.
#[derive(Debug, Clone)]
pub struct GenericStrategy {
    dates: DateParser,
}

impl GenericStrategy {
    pub fn new(dates: DateParser) -> Self {
        Self { dates }
    }

    pub(super) fn extract_lines(&self, document: &IngestedDocument, out: &mut Extraction) {
        for page in &document.pages {
            for (row, line) in page.line_source().lines().enumerate() {
                let source = SourceRef::line(page.number, row);

                let Some(caps) = GENERIC_LINE.captures(line) else {
                    if DATE_LINE_PREFIX.is_match(line) {
                        out.diagnostics.push(Diagnostic::new(
                            source,
                            DropReason::MalformedRow(line.trim().to_string()),
                        ));
                    }
                    continue;
                };

                let marker = caps.name("marker").and_then(|m| Side::from_marker(m.as_str()));
                let balance = caps.name("balance").map(|m| m.as_str().to_string());
                out.candidates.push(
                    RawCandidate::new(&caps["date"], &caps["desc"], &caps["amount"], source)
                        .with_marker(marker)
                        .with_balance(balance)
                        .with_low_confidence(true),
                );
            }
        }
    }

    fn extract_tables(&self, document: &IngestedDocument, out: &mut Extraction) {
        // Column roles from the most recent header row; later pages of a
        // table usually repeat no header.
        let mut roles: Option<ColumnRoles> = None;

        for page in &document.pages {
            for (table_idx, table) in page.tables.iter().enumerate() {
                for (row_idx, row) in table.iter().enumerate() {
                    let source = SourceRef::table_row(page.number, table_idx, row_idx);

                    if let Some(learned) = roles.filter(|r| self.fits(row, r)) {
                        match self.row_by_roles(row, &learned, source) {
                            Some(candidate) => out.candidates.push(candidate),
                            None => out.diagnostics.push(Diagnostic::new(
                                source,
                                DropReason::MalformedRow(join_cells(row)),
                            )),
                        }
                        continue;
                    }

                    if let Some(candidate) = self.classify_row(row, source) {
                        out.candidates.push(candidate);
                    } else if let Some(learned) = ColumnRoles::from_header(row) {
                        trace!("Header row at {}: {:?}", source, learned);
                        roles = Some(learned);
                    }
                }
            }
        }
    }

    /// Whether the row has a date where the header put the date column.
    fn fits(&self, row: &[String], roles: &ColumnRoles) -> bool {
        row.get(roles.date).is_some_and(|c| self.dates.parse(c).is_some())
    }

    /// Read a dated row through learned header roles. `None` when no amount
    /// column holds an amount.
    fn row_by_roles(
        &self,
        row: &[String],
        roles: &ColumnRoles,
        source: SourceRef,
    ) -> Option<RawCandidate> {
        let date = row.get(roles.date)?.trim();

        let (amount, column) = roles.amount(row);
        if !is_amount_cell(amount) {
            return None;
        }

        let (amount, marker) = split_marker(amount);
        let description = row.get(roles.description).map_or("", |c| c.trim());
        Some(
            RawCandidate::new(date, description, amount, source)
                .with_marker(marker.or_else(|| roles.kind_marker(row)))
                .with_column(column)
                .with_balance(roles.balance(row))
                .with_low_confidence(true),
        )
    }

    /// Headerless rows: first date cell, first amount cell after it, a
    /// second amount cell after that as the balance, and the longest
    /// remaining text cell as the description. Rows without both a date and
    /// an amount are not transactions.
    fn classify_row(&self, row: &[String], source: SourceRef) -> Option<RawCandidate> {
        let date_idx = row.iter().position(|c| self.dates.parse(c).is_some())?;

        let mut amounts = row
            .iter()
            .enumerate()
            .skip(date_idx + 1)
            .filter(|(_, c)| is_amount_cell(c))
            .map(|(i, _)| i);
        let amount_idx = amounts.next()?;
        let balance = amounts.next().map(|i| split_marker(&row[i]).0.to_string());

        let description = row
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != date_idx && !is_amount_cell(c))
            .map(|(_, c)| c.trim())
            .max_by_key(|c| c.len())
            .unwrap_or("");

        let (amount, marker) = split_marker(&row[amount_idx]);
        Some(
            RawCandidate::new(row[date_idx].trim(), description, amount, source)
                .with_marker(marker)
                .with_balance(balance)
                .with_low_confidence(true),
        )
    }
}

fn is_amount_cell(cell: &str) -> bool {
    let (body, _) = split_marker(cell);
    parse_amount(body).is_some()
}

impl ExtractionStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, document: &IngestedDocument) -> Extraction {
        let mut out = Extraction::new();
        self.extract_tables(document, &mut out);
        self.extract_lines(document, &mut out);
        out.sort_by_source();
        out
    }
}
