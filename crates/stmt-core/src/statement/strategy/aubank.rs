//! AU Small Finance Bank statements: table grids, plus the compressed
//! "Transaction Summary" text block.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{Extraction, ExtractionStrategy, GenericStrategy};
use crate::error::{Diagnostic, DropReason};
use crate::models::document::IngestedDocument;
use crate::models::transaction::{RawCandidate, Side, SourceRef};
use crate::statement::rules::patterns::{
    SUMMARY_AMOUNT, SUMMARY_DATE, SUMMARY_HEADING, TOTALS_ROW, WHITESPACE_RUN,
};
use crate::statement::rules::{split_marker, DateParser};

/// Lines after a summary heading that may hold summary entries.
const SUMMARY_LOOKAHEAD: usize = 10;

/// Which cell holds which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ColumnRoles {
    pub(super) date: usize,
    pub(super) description: usize,
    amount: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    balance: Option<usize>,
    kind: Option<usize>,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            date: 0,
            description: 1,
            amount: Some(2),
            debit: None,
            credit: None,
            balance: Some(3),
            kind: Some(4),
        }
    }
}

impl ColumnRoles {
    /// Learn roles from a header row. Returns `None` unless the row names a
    /// date column and at least one other known column.
    pub(super) fn from_header(row: &[String]) -> Option<Self> {
        let mut date = None;
        let mut description = None;
        let mut amount = None;
        let mut debit = None;
        let mut credit = None;
        let mut balance = None;
        let mut kind = None;

        for (i, cell) in row.iter().enumerate() {
            let cell = cell.to_lowercase();
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            if date.is_none() && cell.contains("date") {
                date = Some(i);
            } else if balance.is_none() && cell.contains("balance") {
                balance = Some(i);
            } else if debit.is_none() && (cell.contains("debit") || cell.contains("withdrawal")) {
                debit = Some(i);
            } else if credit.is_none() && (cell.contains("credit") || cell.contains("deposit")) {
                credit = Some(i);
            } else if amount.is_none() && cell.contains("amount") {
                amount = Some(i);
            } else if kind.is_none() && (cell == "type" || cell.contains("dr/cr") || cell == "dr / cr") {
                kind = Some(i);
            } else if description.is_none()
                && ["description", "narration", "particulars", "details", "transaction"]
                    .iter()
                    .any(|k| cell.contains(k))
            {
                description = Some(i);
            }
        }

        let date = date?;
        let known = [description, amount, debit, credit, balance, kind]
            .iter()
            .filter(|r| r.is_some())
            .count();
        if known == 0 {
            return None;
        }

        // A lone debit or credit column is just an amount column
        let (amount, debit, credit) = match (amount, debit, credit) {
            (None, Some(d), None) => (Some(d), None, None),
            (None, None, Some(c)) => (Some(c), None, None),
            other => other,
        };

        Some(Self {
            date,
            description: description.unwrap_or(if date == 0 { 1 } else { 0 }),
            amount,
            debit,
            credit,
            balance,
            kind,
        })
    }

    /// The amount cell and, with split debit/credit columns, the side its
    /// column implies. Empty when no amount column holds a value.
    pub(super) fn amount<'a>(&self, row: &'a [String]) -> (&'a str, Option<Side>) {
        match (self.debit, self.credit) {
            (Some(_), Some(_)) => {
                let debit = cell(row, self.debit).trim();
                let credit = cell(row, self.credit).trim();
                if !debit.is_empty() && debit != "-" {
                    (debit, Some(Side::Debit))
                } else if !credit.is_empty() && credit != "-" {
                    (credit, Some(Side::Credit))
                } else {
                    ("", None)
                }
            }
            _ => (cell(row, self.amount).trim(), None),
        }
    }

    pub(super) fn balance(&self, row: &[String]) -> Option<String> {
        match cell(row, self.balance).trim() {
            "" => None,
            b => Some(split_marker(b).0.to_string()),
        }
    }

    /// Side named by a "Type" or "Dr/Cr" column.
    pub(super) fn kind_marker(&self, row: &[String]) -> Option<Side> {
        Side::from_marker(cell(row, self.kind))
    }
}

/// Table-oriented parser with continuation-row merging.
#[derive(Debug, Clone)]
pub struct AuBankStrategy {
    dates: DateParser,
    merge_continuation_rows: bool,
    parse_summary_lines: bool,
}

impl AuBankStrategy {
    pub fn new(dates: DateParser) -> Self {
        Self {
            dates,
            merge_continuation_rows: true,
            parse_summary_lines: true,
        }
    }

    pub fn with_continuation_merge(mut self, enabled: bool) -> Self {
        self.merge_continuation_rows = enabled;
        self
    }

    pub fn with_summary_lines(mut self, enabled: bool) -> Self {
        self.parse_summary_lines = enabled;
        self
    }

    fn extract_tables(&self, document: &IngestedDocument, out: &mut Extraction) {
        let mut roles = ColumnRoles::default();
        // Index of the candidate a dateless row continues, across page breaks
        let mut last: Option<usize> = None;

        for page in &document.pages {
            for (table_idx, table) in page.tables.iter().enumerate() {
                for (row_idx, row) in table.iter().enumerate() {
                    if row.iter().all(|c| c.trim().is_empty()) {
                        continue;
                    }
                    let source = SourceRef::table_row(page.number, table_idx, row_idx);

                    let date_cell = cell(row, Some(roles.date));
                    if self.dates.parse(date_cell).is_some() {
                        last = self.data_row(row, &roles, source, out);
                        continue;
                    }

                    // No date in the date column: header, totals or continuation
                    if let Some(learned) = ColumnRoles::from_header(row) {
                        trace!("Header row at {}: {:?}", source, learned);
                        roles = learned;
                        last = None;
                        continue;
                    }

                    let joined = join_cells(row);
                    if TOTALS_ROW.is_match(&joined) {
                        out.diagnostics
                            .push(Diagnostic::new(source, DropReason::SummaryRow(joined)));
                        last = None;
                        continue;
                    }

                    match last {
                        Some(idx) if self.merge_continuation_rows => {
                            let extra = match cell(row, Some(roles.description)) {
                                "" => joined,
                                text => text.trim().to_string(),
                            };
                            let candidate = &mut out.candidates[idx];
                            if !candidate.description.is_empty() {
                                candidate.description.push(' ');
                            }
                            candidate.description.push_str(&extra);
                        }
                        _ => {
                            out.diagnostics
                                .push(Diagnostic::new(source, DropReason::MalformedRow(joined)));
                        }
                    }
                }
            }
        }
    }

    /// Emit a candidate for a dated row; returns its index.
    fn data_row(
        &self,
        row: &[String],
        roles: &ColumnRoles,
        source: SourceRef,
        out: &mut Extraction,
    ) -> Option<usize> {
        let (amount, column) = roles.amount(row);

        if amount.is_empty() {
            out.diagnostics.push(Diagnostic::new(
                source,
                DropReason::MalformedRow(join_cells(row)),
            ));
            return None;
        }

        let (amount, marker) = split_marker(amount);
        let marker = marker.or_else(|| roles.kind_marker(row));
        let balance = roles.balance(row);

        out.candidates.push(
            RawCandidate::new(
                cell(row, Some(roles.date)).trim(),
                cell(row, Some(roles.description)),
                amount,
                source,
            )
            .with_marker(marker)
            .with_column(column)
            .with_balance(balance),
        );
        Some(out.candidates.len() - 1)
    }

    fn extract_summaries(&self, document: &IngestedDocument, out: &mut Extraction) {
        for page in &document.pages {
            let lines: Vec<&str> = page.line_source().lines().collect();

            for (i, line) in lines.iter().enumerate() {
                if !SUMMARY_HEADING.is_match(line) {
                    continue;
                }
                let end = (i + 1 + SUMMARY_LOOKAHEAD).min(lines.len());
                for (row, summary_line) in lines.iter().enumerate().take(end).skip(i + 1) {
                    if summary_line.chars().any(|c| c.is_ascii_digit()) {
                        let source = SourceRef::line(page.number, row);
                        self.parse_summary_line(summary_line, source, out);
                    }
                }
            }
        }
    }

    /// Split a line holding several `date description amount[Dr.|Cr.]`
    /// entries back to back.
    fn parse_summary_line(&self, line: &str, source: SourceRef, out: &mut Extraction) {
        let dates: Vec<_> = SUMMARY_DATE.find_iter(line).collect();

        for (i, date) in dates.iter().enumerate() {
            let segment_end = dates.get(i + 1).map_or(line.len(), |next| next.start());
            let segment = &line[date.end()..segment_end];

            let Some(caps) = SUMMARY_AMOUNT.captures(segment) else {
                continue;
            };
            let Some(amount) = caps.name("amount") else {
                continue;
            };
            let marker = caps.name("marker").and_then(|m| Side::from_marker(m.as_str()));

            let full = caps.get(0).map_or(amount.range(), |m| m.range());
            let mut description = String::with_capacity(segment.len());
            description.push_str(&segment[..full.start]);
            description.push(' ');
            description.push_str(&segment[full.end..]);

            let date_token = WHITESPACE_RUN.replace_all(date.as_str(), "");
            out.candidates.push(
                RawCandidate::new(date_token, description.trim(), amount.as_str(), source)
                    .with_marker(marker),
            );
        }
    }
}

impl ExtractionStrategy for AuBankStrategy {
    fn name(&self) -> &'static str {
        "aubank"
    }

    fn extract(&self, document: &IngestedDocument) -> Extraction {
        let mut out = Extraction::new();
        self.extract_tables(document, &mut out);
        let from_tables = out.candidates.len();

        let mut summary = Extraction::new();
        if self.parse_summary_lines {
            self.extract_summaries(document, &mut summary);
        }

        // Text-only ingestion has no grids to walk
        if document.pages.iter().all(|p| p.tables.is_empty()) {
            let mut lines = Extraction::new();
            GenericStrategy::new(self.dates.clone()).extract_lines(document, &mut lines);

            let summarized: HashSet<SourceRef> =
                summary.candidates.iter().map(|c| c.source).collect();
            out.candidates.extend(
                lines
                    .candidates
                    .into_iter()
                    .filter(|c| !summarized.contains(&c.source)),
            );
            out.diagnostics.extend(
                lines
                    .diagnostics
                    .into_iter()
                    .filter(|d| !summarized.contains(&d.source)),
            );
        }
        let from_lines = out.candidates.len() - from_tables;

        debug!(
            "AU Bank: {} table candidates, {} line candidates, {} summary candidates",
            from_tables,
            from_lines,
            summary.candidates.len()
        );
        out.candidates.extend(summary.candidates);
        out.diagnostics.extend(summary.diagnostics);
        out.sort_by_source();
        out
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map_or("", |s| s.as_str())
}

pub(super) fn join_cells(row: &[String]) -> String {
    row.iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{IngestedPage, TableGrid};

    fn grid(rows: &[&[&str]]) -> TableGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn extract_table(rows: &[&[&str]]) -> Extraction {
        let doc = IngestedDocument::new(vec![
            IngestedPage::from_text(1, "AU Small Finance Bank").with_table(grid(rows)),
        ]);
        AuBankStrategy::new(DateParser::new()).extract(&doc)
    }

    #[test]
    fn test_default_roles_and_header_by_missing_date() {
        let out = extract_table(&[
            &["Account Statement", "", "", "", ""],
            &["01/02/2025", "ATM WITHDRAWAL", "2,000.00", "8,000.00", "Dr"],
            &["03/02/2025", "SALARY", "50,000.00 Cr", "58,000.00", ""],
        ]);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].side.marker, Some(Side::Debit));
        assert_eq!(out.candidates[0].balance.as_deref(), Some("8,000.00"));
        assert_eq!(out.candidates[1].amount, "50,000.00");
        assert_eq!(out.candidates[1].side.marker, Some(Side::Credit));
        // The title row is not a header and has nothing to continue
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_continuation_row_merges_into_previous() {
        let out = extract_table(&[
            &["Date", "Description", "Amount", "Balance", "Type"],
            &["01/02/2025", "UPI/P2M/4021", "150.00", "9,850.00", "Dr"],
            &["", "SWIGGY BANGALORE", "", "", ""],
            &["02/02/2025", "NEFT CR", "1,000.00", "10,850.00", "Cr"],
        ]);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].description, "UPI/P2M/4021 SWIGGY BANGALORE");
        assert_eq!(out.candidates[1].description, "NEFT CR");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_learns_debit_credit_columns() {
        let out = extract_table(&[
            &["Txn Date", "Narration", "Withdrawal", "Deposit", "Balance"],
            &["01/02/2025", "RENT", "15,000.00", "", "35,000.00"],
            &["05/02/2025", "REFUND", "-", "499.00", "35,499.00"],
        ]);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].side.column, Some(Side::Debit));
        assert_eq!(out.candidates[0].amount, "15,000.00");
        assert_eq!(out.candidates[1].side.column, Some(Side::Credit));
        assert_eq!(out.candidates[1].amount, "499.00");
        assert_eq!(out.candidates[1].balance.as_deref(), Some("35,499.00"));
    }

    #[test]
    fn test_totals_rows_skipped() {
        let out = extract_table(&[
            &["Date", "Description", "Amount", "Balance", "Type"],
            &["", "Opening Balance", "", "10,000.00", ""],
            &["01/02/2025", "ATM", "500.00", "9,500.00", "Dr"],
            &["", "Total", "500.00", "", ""],
        ]);
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].description, "ATM");
        assert_eq!(out.diagnostics.len(), 2);
        assert!(matches!(out.diagnostics[0].reason, DropReason::SummaryRow(_)));
    }

    #[test]
    fn test_text_only_document_uses_line_fallback() {
        let doc = IngestedDocument::new(vec![IngestedPage::from_text(
            1,
            "AU Small Finance Bank\n01/02/2025 NEFT ACME 2,500.00 Cr 12,500.00\n",
        )]);
        let out = AuBankStrategy::new(DateParser::new())
            .with_summary_lines(false)
            .extract(&doc);
        assert_eq!(out.candidates.len(), 1);
        assert!(out.candidates[0].low_confidence);
        assert_eq!(out.candidates[0].side.marker, Some(Side::Credit));
    }

    #[test]
    fn test_continuation_row_merges_across_page_break() {
        let doc = IngestedDocument::new(vec![
            IngestedPage::from_text(1, "AU Small Finance Bank").with_table(grid(&[
                &["Date", "Description", "Amount", "Balance", "Type"],
                &["01/02/2025", "UPI/P2M/4021", "150.00", "9,850.00", "Dr"],
            ])),
            IngestedPage::from_text(2, "").with_table(grid(&[
                &["", "SWIGGY BANGALORE", "", "", ""],
                &["02/02/2025", "NEFT CR", "1,000.00", "10,850.00", "Cr"],
            ])),
        ]);
        let out = AuBankStrategy::new(DateParser::new()).extract(&doc);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].description, "UPI/P2M/4021 SWIGGY BANGALORE");
        assert_eq!(out.candidates[1].source, SourceRef::table_row(2, 0, 1));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_summary_candidates_keep_page_order() {
        let doc = IngestedDocument::new(vec![
            IngestedPage::from_text(1, "AU BANK\nTransaction Summary\n01/01/2025 OPENING FEE 10.00Dr.\n"),
            IngestedPage::from_text(2, "").with_table(grid(&[
                &["Date", "Description", "Amount", "Balance", "Type"],
                &["02/01/2025", "ATM", "500.00", "9,490.00", "Dr"],
            ])),
        ]);
        let out = AuBankStrategy::new(DateParser::new()).extract(&doc);
        let descriptions: Vec<&str> = out.candidates.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descriptions, vec!["OPENING FEE", "ATM"]);
    }

    #[test]
    fn test_summary_block() {
        let doc = IngestedDocument::new(vec![IngestedPage::from_text(
            1,
            "AU BANK\nTransaction Summary\n01/02/2025 ATM CASH 500.00Dr. 03/02/2025 SALARY ACME 25,000.00Cr.\n",
        )]);
        let out = AuBankStrategy::new(DateParser::new()).extract(&doc);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.candidates[0].date, "01/02/2025");
        assert_eq!(out.candidates[0].description, "ATM CASH");
        assert_eq!(out.candidates[0].amount, "500.00");
        assert_eq!(out.candidates[0].side.marker, Some(Side::Debit));
        assert_eq!(out.candidates[1].amount, "25,000.00");
        assert_eq!(out.candidates[1].side.marker, Some(Side::Credit));
    }
}
