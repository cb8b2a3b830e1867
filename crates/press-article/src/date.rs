use chrono::{Local, NaiveDate};

/// `DD-MM-YYYY`, the only date format articles use.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Today's date in local time.
pub fn today() -> String {
    format_date(Local::now().date_naive())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date; `None` for anything not in `DD-MM-YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(format_date(date), "05-03-2025");
        assert_eq!(parse_date(" 05-03-2025 "), Some(date));
    }

    #[test]
    fn today_is_parseable() {
        assert!(parse_date(&today()).is_some());
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(parse_date("2025-03-05"), None);
        assert_eq!(parse_date("31-02-2025"), None);
        assert_eq!(parse_date(""), None);
    }
}
