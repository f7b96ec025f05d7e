//! Common regex patterns for statement extraction.
//!
//! Token patterns are anchored at both ends. Line patterns are anchored to
//! the physical line. The `regex` crate guarantees linear-time matching, so
//! none of these can backtrack catastrophically on hostile input.

use lazy_static::lazy_static;
use regex::Regex;

/// Date-like token, used inside line patterns.
pub const DATE_TOKEN: &str = concat!(
    r"(?:\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}",
    r"|\d{4}[/\-]\d{1,2}[/\-]\d{1,2}",
    r"|\d{1,2}[\s\-][A-Za-z]{3,9}\.?[\s\-,]+\d{2,4}",
    r"|[A-Za-z]{3,9}\.?\s+\d{1,2},?\s+\d{4})"
);

/// Amount-like token with optional sign, currency and parentheses.
pub const AMOUNT_TOKEN: &str =
    r"(?:[-+]?\(?(?:₹|\$|€|£|Rs\.?|INR)?\s?\d[\d,.]*[.,]\d{2}\)?)";

/// Dr/Cr marker.
pub const MARKER_TOKEN: &str = r"(?:Dr|Cr|DR|CR|dr|cr)\.?";

lazy_static! {
    // Date tokens
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"^(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})$"
    ).unwrap();

    pub static ref DATE_NAMED_DMY: Regex = Regex::new(
        r"(?i)^(\d{1,2})[\s\-]+([a-z]{3,9})\.?[\s\-,]+(\d{4}|\d{2})$"
    ).unwrap();

    pub static ref DATE_NAMED_MDY: Regex = Regex::new(
        r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$"
    ).unwrap();

    pub static ref TIME_SUFFIX: Regex = Regex::new(
        r"(?i)\s+\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]m)?$"
    ).unwrap();

    // Amount tokens
    pub static ref CURRENCY_MARKERS: Regex = Regex::new(
        r"(?i)₹|\$|€|£|\bINR\b|\bRs\b\.?"
    ).unwrap();

    pub static ref TRAILING_MARKER: Regex = Regex::new(
        r"(?i)^(.*?\d\)?)\s*(dr|cr)\.?$"
    ).unwrap();

    // HDFC: date [time] description amount [Dr/Cr]
    pub static ref HDFC_LINE: Regex = Regex::new(concat!(
        r"^\s*(?P<date>\d{1,2}/\d{1,2}/\d{4})",
        r"(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?\s+",
        r"(?P<desc>\S.*?)\s+",
        r"(?P<amount>-?[\d,]+\.\d{2})",
        r"(?:\s*(?P<marker>Cr|Dr|CR|DR)\.?)?\s*$"
    )).unwrap();

    pub static ref HDFC_DATE_PREFIX: Regex = Regex::new(
        r"^\s*\d{1,2}/\d{1,2}/\d{4}\b"
    ).unwrap();

    pub static ref HDFC_SECTION_START: Regex = Regex::new(
        r"(?i)^\s*(?:domestic|international)\s+transactions\b"
    ).unwrap();

    pub static ref HDFC_SECTION_END: Regex = Regex::new(
        r"(?i)^\s*(?:reward\s+points|cash\s+points|important\s+information|gst\s+summary)\b"
    ).unwrap();

    // AU Bank
    pub static ref AMOUNT_CELL: Regex = Regex::new(&format!(
        r"^\s*(?P<amount>{})\s*(?P<marker>{})?\s*$",
        AMOUNT_TOKEN, MARKER_TOKEN
    )).unwrap();

    pub static ref SUMMARY_HEADING: Regex = Regex::new(
        r"(?i)transaction\s+summary"
    ).unwrap();

    pub static ref SUMMARY_DATE: Regex = Regex::new(
        r"\b\d{1,2}\s*/\s*\d{1,2}\s*/\s*\d{2,4}\b"
    ).unwrap();

    pub static ref SUMMARY_AMOUNT: Regex = Regex::new(
        r"(?P<amount>\d[\d,]*\.\d{2})\s*(?P<marker>Dr|Cr)?\.?"
    ).unwrap();

    pub static ref TOTALS_ROW: Regex = Regex::new(
        r"(?i)^\s*(?:grand\s+total|total|opening\s+balance|closing\s+balance|balance\s+[bc]/?f)\b"
    ).unwrap();

    // Generic: date-like token + trailing numeric token(s)
    pub static ref GENERIC_LINE: Regex = Regex::new(&format!(
        concat!(
            r"^\s*(?P<date>{date})\s*(?P<desc>.*?)\s*",
            r"(?P<amount>{amt})\s*(?P<marker>{mk})?",
            r"(?:\s+(?P<balance>{amt})\s*(?:{mk})?)?\s*$"
        ),
        date = DATE_TOKEN,
        amt = AMOUNT_TOKEN,
        mk = MARKER_TOKEN
    )).unwrap();

    pub static ref DATE_LINE_PREFIX: Regex = Regex::new(&format!(
        r"^\s*{}(?:\s|$)",
        DATE_TOKEN
    )).unwrap();

    // Statement period
    pub static ref PERIOD_RANGE: Regex = Regex::new(&format!(
        r"(?i)(?:statement\s+period|period|from)\s*:?\s*(?P<start>{date})\s*(?:to|till|-|–)\s*(?P<end>{date})",
        date = DATE_TOKEN
    )).unwrap();

    pub static ref STATEMENT_DATE: Regex = Regex::new(&format!(
        r"(?i)statement\s+date\s*:?\s*(?P<date>{date})",
        date = DATE_TOKEN
    )).unwrap();

    // Description artifacts
    pub static ref PAGE_ARTIFACT: Regex = Regex::new(
        r"(?i)\bpage\s+\d+\s*(?:of|/)\s*\d+\b"
    ).unwrap();

    pub static ref CONTINUED_ARTIFACT: Regex = Regex::new(
        r"(?i)\(\s*(?:contd?\.?|continued)\s*\)"
    ).unwrap();

    pub static ref ELLIPSIS_RUN: Regex = Regex::new(
        r"\.{3,}"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
