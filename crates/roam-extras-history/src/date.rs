//! Daily-note titles in the host's display format, e.g. "November 25th, 2024".

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Expected a title like \"November 25th, 2024\", got {0:?}")]
    Malformed(String),
    #[error("Unknown month {0:?}")]
    UnknownMonth(String),
    #[error("No such calendar date: {0:?}")]
    OutOfRange(String),
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (4..=20).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn format_roam_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        MONTHS[date.month0() as usize],
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

pub fn parse_roam_date(title: &str) -> Result<NaiveDate, DateError> {
    let malformed = || DateError::Malformed(title.to_string());

    let cleaned = title.replacen(',', "", 1);
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    let &[month, day, year] = parts.as_slice() else {
        return Err(malformed());
    };

    let month = MONTHS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(month))
        .ok_or_else(|| DateError::UnknownMonth(month.to_string()))?;
    let day = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| day.strip_suffix(suffix))
        .unwrap_or(day)
        .parse::<u32>()
        .map_err(|_| malformed())?;
    let year = year.parse::<i32>().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month as u32 + 1, day)
        .ok_or_else(|| DateError::OutOfRange(title.to_string()))
}

/// Same month and day `years` years earlier. Feb 29 rolls over to Mar 1
/// when the target year has no leap day.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    let year = date.year().checked_sub(i32::try_from(years).ok()?)?;
    NaiveDate::from_ymd_opt(year, date.month(), date.day()).or_else(|| {
        NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1)?.succ_opt()
    })
}

fn title_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)(?:{})\s+\d{{1,2}}(?:st|nd|rd|th)?,\s+\d{{4}}",
            MONTHS.join("|")
        ))
        .expect("Invalid date title regex")
    })
}

/// True when `text` contains something shaped like a daily-note title.
pub fn looks_like_roam_date(text: &str) -> bool {
    title_regex().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(1, "st")]
    #[case(2, "nd")]
    #[case(3, "rd")]
    #[case(4, "th")]
    #[case(11, "th")]
    #[case(12, "th")]
    #[case(13, "th")]
    #[case(20, "th")]
    #[case(21, "st")]
    #[case(22, "nd")]
    #[case(23, "rd")]
    #[case(30, "th")]
    #[case(31, "st")]
    fn test_ordinal_suffix(#[case] day: u32, #[case] expected: &str) {
        assert_eq!(ordinal_suffix(day), expected);
    }

    #[test]
    fn test_format_roam_date() {
        assert_eq!(format_roam_date(date(2024, 11, 25)), "November 25th, 2024");
        assert_eq!(format_roam_date(date(2023, 1, 1)), "January 1st, 2023");
        assert_eq!(format_roam_date(date(2022, 3, 22)), "March 22nd, 2022");
    }

    #[rstest]
    #[case("November 25th, 2024", date(2024, 11, 25))]
    #[case("January 1st, 2023", date(2023, 1, 1))]
    #[case("march 3rd, 2021", date(2021, 3, 3))]
    #[case("May 7, 2020", date(2020, 5, 7))]
    fn test_parse_roam_date(#[case] title: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_roam_date(title), Ok(expected));
    }

    #[test]
    fn test_parse_rejects_bad_titles() {
        assert_eq!(
            parse_roam_date("Smarch 1st, 2024"),
            Err(DateError::UnknownMonth("Smarch".to_string()))
        );
        assert!(matches!(parse_roam_date("November 2024"), Err(DateError::Malformed(_))));
        assert!(matches!(parse_roam_date("November xth, 2024"), Err(DateError::Malformed(_))));
        assert!(matches!(
            parse_roam_date("February 30th, 2024"),
            Err(DateError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_years_before() {
        assert_eq!(years_before(date(2024, 11, 25), 1), Some(date(2023, 11, 25)));
        assert_eq!(years_before(date(2024, 11, 25), 3), Some(date(2021, 11, 25)));
        // Leap day rolls forward in years without one.
        assert_eq!(years_before(date(2024, 2, 29), 1), Some(date(2023, 3, 1)));
        assert_eq!(years_before(date(2024, 2, 29), 4), Some(date(2020, 2, 29)));
    }

    #[rstest]
    #[case("November 25th, 2024", true)]
    #[case("november 25, 2024", true)]
    #[case("Notes from December 1st, 1999", true)]
    #[case("November 2024", false)]
    #[case("Project Plan", false)]
    fn test_looks_like_roam_date(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(looks_like_roam_date(text), expected);
    }
}
