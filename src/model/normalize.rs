//! Cell coercion shared by every table kind. None of these fail: bad input
//! degrades to zero, empty or absent.

use chrono::NaiveDate;

const LIST_DELIMITER: char = ',';
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
/// Larger counts are clamped so six-way totals and pool sums stay in range.
pub const COUNT_MAX: u64 = u32::MAX as u64;

pub fn split_list(cell: Option<&str>) -> Vec<String> {
    match cell {
        Some(text) if !text.is_empty() => {
            text.split(LIST_DELIMITER).map(String::from).collect()
        }
        _ => vec![],
    }
}

pub fn parse_count(cell: Option<&str>) -> u64 {
    let Some(text) = cell.map(str::trim) else {
        return 0;
    };
    if let Ok(count) = text.parse::<u64>() {
        return count.min(COUNT_MAX);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            value.trunc().min(COUNT_MAX as f64) as u64
        }
        _ => 0,
    }
}

pub fn parse_real(cell: Option<&str>) -> f64 {
    cell.and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

pub fn parse_score(cell: Option<&str>) -> f64 {
    parse_real(cell).clamp(SCORE_MIN, SCORE_MAX)
}

pub fn parse_date(cell: Option<&str>) -> Option<NaiveDate> {
    let text = cell?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

pub fn text(cell: Option<&str>) -> String {
    cell.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_split_on_comma_without_trimming() {
        assert_eq!(split_list(Some("Smoke, Regression")), vec!["Smoke", " Regression"]);
        assert_eq!(split_list(Some("Smoke")), vec!["Smoke"]);
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn counts_degrade_to_zero() {
        assert_eq!(parse_count(Some("7")), 7);
        assert_eq!(parse_count(Some(" 4 ")), 4);
        assert_eq!(parse_count(Some("3.0")), 3);
        assert_eq!(parse_count(Some("n/a")), 0);
        assert_eq!(parse_count(Some("-2")), 0);
        assert_eq!(parse_count(Some("NaN")), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn huge_counts_are_clamped() {
        assert_eq!(parse_count(Some("1e20")), COUNT_MAX);
        assert_eq!(parse_count(Some("18446744073709551615")), COUNT_MAX);
        assert_eq!(parse_count(Some("4294967295")), COUNT_MAX);
        assert_eq!(parse_count(Some("4294967294")), COUNT_MAX - 1);
    }

    #[test]
    fn scores_are_clamped() {
        assert_eq!(parse_score(Some("87.5")), 87.5);
        assert_eq!(parse_score(Some("140")), 100.0);
        assert_eq!(parse_score(Some("-1")), 0.0);
        assert_eq!(parse_score(Some("great")), 0.0);
        assert_eq!(parse_score(Some("inf")), 0.0);
    }

    #[test]
    fn dates_accept_several_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date(Some("2024-03-15")), expected);
        assert_eq!(parse_date(Some("2024/03/15")), expected);
        assert_eq!(parse_date(Some("15.03.2024")), expected);
        assert_eq!(parse_date(Some("last week")), None);
        assert_eq!(parse_date(None), None);
    }
}
