//! Statement period detection from header text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rules::patterns::{PERIOD_RANGE, STATEMENT_DATE};
use super::rules::DateParser;

/// Period a statement covers, as printed in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    /// First day, when the header prints a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Last day, or the statement date.
    pub end: NaiveDate,
}

impl StatementPeriod {
    /// Find a period in document text. A printed range wins over a bare
    /// statement date; a range whose start is after its end is ignored.
    pub fn detect(text: &str, dates: &DateParser) -> Option<Self> {
        for caps in PERIOD_RANGE.captures_iter(text) {
            let start = dates.parse(&caps["start"]);
            let end = dates.parse(&caps["end"]);
            if let (Some(start), Some(end)) = (start, end) {
                if start <= end {
                    return Some(Self {
                        start: Some(start),
                        end,
                    });
                }
            }
        }

        STATEMENT_DATE
            .captures_iter(text)
            .find_map(|caps| dates.parse(&caps["date"]))
            .map(|end| Self { start: None, end })
    }

    /// Whether a date falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && date <= self.end
    }

    /// Month key ("YYYY-MM") of the period end.
    pub fn month_key(&self) -> String {
        self.end.format("%Y-%m").to_string()
    }
}
