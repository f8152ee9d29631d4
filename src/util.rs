// Parsing and formatting helpers.
//
// Raw cells from CSV exports go through here so the rest of the code can
// assume typed values, and every number shown to a reader is formatted here.
use crate::error::{BudgetError, Result};
use crate::types::Amount;
use num_format::{Locale, ToFormattedString};

/// Parse an amount cell, tolerating whitespace and thousands separators.
///
/// - Empty or missing cells are `None` (amount not yet available).
/// - Cells containing letters are rejected as `None`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Validate a `YYYY-YY` label and return the starting calendar year.
///
/// The suffix must be the two-digit year following the start year, so
/// "1999-00" is valid and "2018-20" is not.
pub fn parse_financial_year(label: &str) -> Result<i32> {
    let invalid = || BudgetError::InvalidFinancialYear(label.to_string());
    let (start, end) = label.split_once('-').ok_or_else(invalid)?;
    if start.len() != 4 || end.len() != 2 {
        return Err(invalid());
    }
    let start_year: i32 = start.parse().map_err(|_| invalid())?;
    let end_suffix: i32 = end.parse().map_err(|_| invalid())?;
    if (start_year + 1) % 100 != end_suffix {
        return Err(invalid());
    }
    Ok(start_year)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // fixed decimals plus `num-format` thousands separators on the integer part
    let s = format!("{:.*}", decimals, n.abs());
    // sign only when something non-zero survives rounding
    let neg = n < 0.0 && s.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let mut parts = s.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Format a nullable amount; `null` renders as "n/a" and non-numeric
/// amounts render as sent.
pub fn format_amount(n: Option<&Amount>) -> String {
    match n {
        Some(Amount::Number(v)) => format_number(*v, 2),
        Some(Amount::Other(serde_json::Value::String(s))) => s.clone(),
        Some(Amount::Other(other)) => other.to_string(),
        None => "n/a".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amount_cells() {
        assert_eq!(parse_f64_safe(Some(" 7,125,998,600 ")), Some(7_125_998_600.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("null")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn validates_financial_years() {
        assert_eq!(parse_financial_year("2018-19").unwrap(), 2018);
        assert_eq!(parse_financial_year("1999-00").unwrap(), 1999);
        assert!(parse_financial_year("2018-20").is_err());
        assert!(parse_financial_year("2018/19").is_err());
        assert!(parse_financial_year("18-19").is_err());
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 0), "-42");
        assert_eq!(format_amount(None), "n/a");
        assert_eq!(format_amount(Some(&Amount::Number(1500.0))), "1,500.00");
        let pending = Amount::Other(serde_json::Value::String("pending".to_string()));
        assert_eq!(format_amount(Some(&pending)), "pending");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn negative_values_rounding_to_zero_have_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-0.4, 0), "0");
        assert_eq!(format_number(-0.006, 2), "-0.01");
    }
}
