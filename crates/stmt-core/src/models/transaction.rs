//! Transaction data models: bank identifiers, raw candidates and the
//! canonical records handed to the export collaborator.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of banks the detector can classify a statement into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankId {
    Hdfc,
    AuBank,
    Icici,
    Sbi,
    Axis,
    Generic,
}

impl BankId {
    /// Detection priority order. `Generic` is the fallback and never matched.
    pub const PRIORITY: [BankId; 5] = [
        BankId::Hdfc,
        BankId::AuBank,
        BankId::Icici,
        BankId::Sbi,
        BankId::Axis,
    ];

    /// Path-safe identifier. Downstream directory names must come from here
    /// rather than from document text.
    pub fn slug(&self) -> &'static str {
        match self {
            BankId::Hdfc => "hdfc",
            BankId::AuBank => "aubank",
            BankId::Icici => "icici",
            BankId::Sbi => "sbi",
            BankId::Axis => "axis",
            BankId::Generic => "generic",
        }
    }

    /// Human readable bank name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BankId::Hdfc => "HDFC Bank",
            BankId::AuBank => "AU Small Finance Bank",
            BankId::Icici => "ICICI Bank",
            BankId::Sbi => "State Bank of India",
            BankId::Axis => "Axis Bank",
            BankId::Generic => "Unknown bank",
        }
    }

    /// Whether this bank has its own extraction rules. Records from banks
    /// without them are always low-confidence.
    pub fn has_dedicated_strategy(&self) -> bool {
        matches!(self, BankId::Hdfc | BankId::AuBank)
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Debit or credit side of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Parse a Dr/Cr style marker ("Dr", "CR", "Dr.", "debit", ...).
    pub fn from_marker(s: &str) -> Option<Self> {
        let s = s.trim().trim_end_matches('.').to_lowercase();
        match s.as_str() {
            "dr" | "debit" | "d" => Some(Side::Debit),
            "cr" | "credit" | "c" => Some(Side::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Debit => "debit",
            Side::Credit => "credit",
        }
    }

    /// Short marker as printed on statements.
    pub fn marker(&self) -> &'static str {
        match self {
            Side::Debit => "Dr",
            Side::Credit => "Cr",
        }
    }

    /// Apply this side's sign to a magnitude. Zero stays unsigned.
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        match self {
            Side::Debit if !magnitude.is_zero() => -magnitude.abs(),
            Side::Debit => magnitude.abs(),
            Side::Credit => magnitude.abs(),
        }
    }
}

/// Side information found next to a candidate, by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideHint {
    /// Explicit Dr/Cr marker printed with the amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Side>,

    /// Side implied by the column the amount sat in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<Side>,
}

impl SideHint {
    pub fn is_empty(&self) -> bool {
        self.marker.is_none() && self.column.is_none()
    }
}

/// Whether a record's side was read from the source or inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Normal,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Normal => "normal",
            Confidence::Low => "low",
        }
    }
}

/// Where a candidate came from, for diagnostics.
///
/// Ordering is document order: page, then text lines before tables, then row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceRef {
    /// Page number (1-indexed).
    pub page: u32,

    /// Table index on the page, when the candidate came from a table grid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<usize>,

    /// Line index (text) or row index (table), 0-based.
    pub row: usize,
}

impl SourceRef {
    pub fn line(page: u32, row: usize) -> Self {
        Self { page, table: None, row }
    }

    pub fn table_row(page: u32, table: usize, row: usize) -> Self {
        Self {
            page,
            table: Some(table),
            row,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(t) => write!(f, "page {} table {} row {}", self.page, t, self.row),
            None => write!(f, "page {} line {}", self.page, self.row),
        }
    }
}

/// A transaction as found in the source, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Date token as printed.
    pub date: String,

    /// Description token, possibly spanning merged continuation rows.
    pub description: String,

    /// Amount token as printed.
    pub amount: String,

    /// Running balance token, if the layout has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,

    /// Debit/credit hints.
    #[serde(default, skip_serializing_if = "SideHint::is_empty")]
    pub side: SideHint,

    /// Set when the strategy knows the side will be inferred.
    #[serde(default)]
    pub low_confidence: bool,

    /// Source location.
    pub source: SourceRef,
}

impl RawCandidate {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        source: SourceRef,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
            balance: None,
            side: SideHint::default(),
            low_confidence: false,
            source,
        }
    }

    pub fn with_marker(mut self, marker: Option<Side>) -> Self {
        self.side.marker = marker;
        self
    }

    pub fn with_column(mut self, column: Option<Side>) -> Self {
        self.side.column = column;
        self
    }

    pub fn with_balance(mut self, balance: Option<String>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_low_confidence(mut self, low: bool) -> Self {
        self.low_confidence = low;
        self
    }

    /// Re-express a normalized record as a candidate. Normalizing the result
    /// yields the same record.
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            description: record.description.clone(),
            amount: record.amount.abs().to_string(),
            balance: record.balance.map(|b| b.to_string()),
            side: SideHint {
                marker: Some(record.txn_type),
                column: None,
            },
            low_confidence: record.confidence == Confidence::Low,
            source: record.raw.source,
        }
    }
}

/// Canonical transaction record. Immutable once built by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    date: NaiveDate,
    description: String,
    amount: Decimal,
    #[serde(rename = "type")]
    txn_type: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    balance: Option<Decimal>,
    bank: BankId,
    confidence: Confidence,
    raw: RawCandidate,
}

impl TransactionRecord {
    /// Build a record; the amount sign is derived from `txn_type`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        date: NaiveDate,
        description: String,
        magnitude: Decimal,
        txn_type: Side,
        balance: Option<Decimal>,
        bank: BankId,
        confidence: Confidence,
        raw: RawCandidate,
    ) -> Self {
        Self {
            date,
            description,
            amount: txn_type.signed(magnitude),
            txn_type,
            balance,
            bank,
            confidence,
            raw,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed amount; negative for debits.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn txn_type(&self) -> Side {
        self.txn_type
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    pub fn bank(&self) -> BankId {
        self.bank
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }

    /// The candidate this record was promoted from.
    pub fn raw(&self) -> &RawCandidate {
        &self.raw
    }

    /// Whether the amount sign agrees with the type. Zero agrees with both.
    pub fn sign_matches_type(&self) -> bool {
        match self.txn_type {
            Side::Debit => self.amount <= Decimal::ZERO,
            Side::Credit => self.amount >= Decimal::ZERO,
        }
    }

    /// Same record content compared without the audit payload.
    pub fn same_content(&self, other: &TransactionRecord) -> bool {
        self.date == other.date
            && self.description == other.description
            && self.amount == other.amount
            && self.txn_type == other.txn_type
            && self.balance == other.balance
            && self.bank == other.bank
            && self.confidence == other.confidence
    }
}
