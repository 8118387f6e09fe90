//! Calendar-month helpers. Every monthly record is keyed by the first day of
//! its month.

use time::{macros::format_description, Date, Month};

/// First day of the month containing `date`.
pub fn month_start(date: Date) -> Date {
    date.replace_day(1).expect("day 1 exists in every month")
}

/// Last day of the month containing `date`.
pub fn month_end(date: Date) -> Date {
    let last = date.month().length(date.year());
    date.replace_day(last).expect("a month's length is a valid day")
}

/// First day of the month after the one containing `date`; `None` past the
/// last representable year.
pub fn next_month(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        m => (date.year(), m.next()),
    };
    Date::from_calendar_date(year, month, 1).ok()
}

/// Every month start from `first` to `last`, inclusive. Empty when `last`
/// precedes `first`.
pub fn months_between(first: Date, last: Date) -> Vec<Date> {
    let last = month_start(last);
    let mut current = Some(month_start(first));
    let mut months = Vec::new();
    while let Some(month) = current.filter(|m| *m <= last) {
        months.push(month);
        current = next_month(month);
    }
    months
}

/// Months since year 0; consecutive months differ by one.
pub fn month_index(date: Date) -> i32 {
    date.year() * 12 + i32::from(u8::from(date.month())) - 1
}

/// Parse a billing date.
///
/// Accepted forms:
/// - `YYYY-MM-DD`
/// - `YYYY-MM` (month-level bills; the first of the month)
/// - `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (time part ignored)
pub fn parse_date(raw: &str) -> Result<Date, String> {
    let s = raw.trim();
    if s.len() == 7 {
        return parse_year_month(s);
    }

    let day_part = match s.char_indices().nth(10) {
        Some((idx, ' ' | 'T')) => &s[..idx],
        _ => s,
    };
    Date::parse(day_part, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("invalid date '{raw}': {e}"))
}

fn parse_year_month(s: &str) -> Result<Date, String> {
    let invalid = || format!("invalid date '{s}': expected YYYY-MM or YYYY-MM-DD");
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, 1).map_err(|_| invalid())
}

/// `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Three-letter month label used on chart axes.
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
