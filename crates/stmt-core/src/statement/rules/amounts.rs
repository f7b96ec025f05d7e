//! Amount parsing for statement tokens.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{CURRENCY_MARKERS, TRAILING_MARKER};
use crate::models::transaction::Side;

/// Split a trailing Dr/Cr marker off an amount or balance token
/// ("1,000.00 Dr" -> ("1,000.00", Some(Debit))).
pub fn split_marker(token: &str) -> (&str, Option<Side>) {
    let trimmed = token.trim();
    match TRAILING_MARKER.captures(trimmed) {
        Some(caps) => {
            let (Some(body), Some(marker)) = (caps.get(1), caps.get(2)) else {
                return (trimmed, None);
            };
            (body.as_str(), Side::from_marker(marker.as_str()))
        }
        None => (trimmed, None),
    }
}

/// Parse a statement amount into a signed decimal.
///
/// Currency symbols and whitespace are stripped. A leading `-`/`+` or
/// surrounding parentheses carry the sign. Separators are resolved as:
/// - both `,` and `.` present: the right-most one is the decimal point;
/// - only `,`, several times: all are thousands separators;
/// - only `,`, once: thousands separator when exactly three digits follow,
///   otherwise the decimal point;
/// - more than one decimal point, or any other residue: rejected.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let stripped = CURRENCY_MARKERS.replace_all(token, "");
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    let (negative, body) = split_sign(&compact)?;

    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    if body.contains(",,") || body.contains(",.") || body.contains(".,") || body.contains("..") {
        return None;
    }

    let mut normalized = normalize_separators(body)?;
    if normalized.ends_with('.') {
        return None;
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Peel sign characters and parentheses off a compact token.
fn split_sign(s: &str) -> Option<(bool, &str)> {
    let mut negative = false;
    let mut body = s;

    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    if let Some(inner) = body.strip_prefix('(') {
        let inner = inner.strip_suffix(')')?;
        negative = !negative;
        body = inner;
    } else if body.ends_with(')') {
        return None;
    }

    // Some layouts print the minus after the number
    if let Some(rest) = body.strip_suffix('-') {
        if negative {
            return None;
        }
        negative = true;
        body = rest;
    }

    Some((negative, body))
}

fn normalize_separators(body: &str) -> Option<String> {
    let commas = body.matches(',').count();
    let dots = body.matches('.').count();

    match (commas, dots) {
        (0, 0) | (0, 1) => Some(body.to_string()),
        (0, _) => None,
        (1, 0) => {
            let pos = body.find(',')?;
            let digits_after = body.len() - pos - 1;
            if digits_after == 3 {
                Some(body.replace(',', ""))
            } else {
                Some(body.replace(',', "."))
            }
        }
        (_, 0) => Some(body.replace(',', "")),
        (_, _) => {
            let last_comma = body.rfind(',')?;
            let last_dot = body.rfind('.')?;
            if last_dot > last_comma {
                if dots > 1 {
                    return None;
                }
                Some(body.replace(',', ""))
            } else {
                if commas > 1 {
                    return None;
                }
                Some(body.replace('.', "").replace(',', "."))
            }
        }
    }
}

/// Format an amount with thousands separators and two decimals
/// (e.g. `-1234.5` -> `-1,234.50`).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_separator_resolution() {
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234,567"), Some(dec("1234567")));
        assert_eq!(parse_amount("1,23,456.78"), Some(dec("123456.78")));
        assert_eq!(parse_amount("12,50"), Some(dec("12.50")));
        assert_eq!(parse_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_amount("80.00"), Some(dec("80.00")));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse_amount("1..23"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("1,234.56.78"), None);
        assert_eq!(parse_amount("1.234,56,78"), None);
        assert_eq!(parse_amount("12a.00"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(",."), None);
        assert_eq!(parse_amount("100."), None);
        assert_eq!(parse_amount("(100.00"), None);
    }

    #[test]
    fn test_currency_and_sign() {
        assert_eq!(parse_amount("₹ 1,000.00"), Some(dec("1000.00")));
        assert_eq!(parse_amount("Rs. 250.75"), Some(dec("250.75")));
        assert_eq!(parse_amount("INR 99"), Some(dec("99")));
        assert_eq!(parse_amount("-$15.00"), Some(dec("-15.00")));
        assert_eq!(parse_amount("(15.00)"), Some(dec("-15.00")));
        assert_eq!(parse_amount("15.00-"), Some(dec("-15.00")));
        assert_eq!(parse_amount("+15.00"), Some(dec("15.00")));
    }

    #[test]
    fn test_split_marker() {
        assert_eq!(split_marker("1,000.00 Dr"), ("1,000.00", Some(Side::Debit)));
        assert_eq!(split_marker("1000.00Cr."), ("1000.00", Some(Side::Credit)));
        assert_eq!(split_marker("1000.00"), ("1000.00", None));
        assert_eq!(split_marker("Cr"), ("Cr", None));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.5")), "1,234.50");
        assert_eq!(format_amount(dec("-1234567.891")), "-1,234,567.89");
        assert_eq!(format_amount(dec("0")), "0.00");
    }
}
