use chrono::{NaiveDate, NaiveDateTime};

/// Today in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Current timestamp in UTC
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Format a date the way it is entered and stored: YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
