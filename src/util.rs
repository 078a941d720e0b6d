// Utility helpers for lenient parsing, identifier cleanup and formatting.
//
// Sheet exports carry currency symbols, thousands separators and stray
// whitespace; everything here turns those into plain values so the metric
// stages can assume clean, typed input.
use num_format::{Locale, ToFormattedString};

/// Parse a money or hours cell into `f64`.
///
/// - Trims whitespace and strips `,`, `¥`, `￥` and `$`.
/// - Rejects values containing alphabetic characters.
/// - Returns `None` for blanks and anything that cannot be parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | '$') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonical form of a project identifier: trimmed, inner whitespace removed,
/// ASCII uppercased. Returns `None` when nothing is left.
pub fn normalize_code(s: Option<&str>) -> Option<String> {
    let code: String = s?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Trimmed text cell; `None` when blank.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice so callers never see NaN.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Past i64 range there is nothing sensible to group; print it plain.
    let Ok(int_val) = int_part.parse::<i64>() else {
        return if neg { format!("-{s}") } else { s };
    };
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // "-0.00" reads badly in a report.
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
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
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_currency_and_separators() {
        assert_eq!(parse_f64_safe(Some(" ¥1,234.50 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("$ 20")), Some(20.0));
        assert_eq!(parse_f64_safe(Some("-15")), Some(-15.0));
    }

    #[test]
    fn rejects_blank_and_text() {
        assert_eq!(parse_f64_safe(None), None);
        assert_eq!(parse_f64_safe(Some("   ")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("12abc")), None);
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(normalize_code(Some("  gs-001 ")), Some("GS-001".to_string()));
        assert_eq!(normalize_code(Some("iss 12")), Some("ISS12".to_string()));
        assert_eq!(normalize_code(Some("  ")), None);
        assert_eq!(normalize_code(None), None);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-200.0, 2), "-200.00");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(12.4, 0), "12");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn huge_amounts_are_printed_plain() {
        assert_eq!(format_number(1.0e19, 0), "10000000000000000000");
        assert_eq!(format_number(-1.0e19, 1), "-10000000000000000000.0");
        assert_eq!(format_number(9.0e18, 0), "9,000,000,000,000,000,000");
    }
}
