use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};

use crate::error::{Result, TodoError};

/// Day-first formats are tried before anything ambiguous, so `12/11/2025`
/// reads as 12 November.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// The local calendar day; due dates are compared against this.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a user-supplied due date relative to `today`.
pub fn parse_due_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(TodoError::InvalidDate(input.to_string()));
    }

    match raw.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .ok_or_else(|| TodoError::InvalidDate(raw.to_string()));
        }
        _ => {}
    }

    for fmt in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(day);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(TodoError::InvalidDate(raw.to_string()))
}

/// True when the input asks to remove a due date rather than set one.
pub fn is_clear_keyword(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "clear" | "none"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2025, 6, 15)
    }

    #[test]
    fn accepts_common_formats() {
        let expected = day(2025, 11, 12);
        for input in [
            "2025-11-12",
            "12/11/2025",
            "12-11-2025",
            "Nov 12 2025",
            "November 12 2025",
            "12 Nov 2025",
            "12 November 2025",
            "  2025-11-12  ",
            "2025-11-12T09:30:00",
            "2025-11-12T09:30:00+02:00",
        ] {
            assert_eq!(parse_due_date(input, today()).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn relative_keywords() {
        assert_eq!(parse_due_date("today", today()).unwrap(), today());
        assert_eq!(parse_due_date("Tomorrow", today()).unwrap(), day(2025, 6, 16));
    }

    #[test]
    fn rejects_garbage_and_blank() {
        assert!(matches!(
            parse_due_date("next blursday", today()),
            Err(TodoError::InvalidDate(_))
        ));
        assert!(parse_due_date("   ", today()).is_err());
        assert!(parse_due_date("2025-02-30", today()).is_err());
    }

    #[test]
    fn clear_keyword_is_case_insensitive() {
        assert!(is_clear_keyword("CLEAR"));
        assert!(is_clear_keyword(" none "));
        assert!(!is_clear_keyword("2025-01-01"));
    }
}
