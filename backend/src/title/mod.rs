//! Deal title parser.
//!
//! A deal title is free text such as
//! `"Ресторан ООО Ромашка 15.03.2024 13:30 обед на 10 персон."`. The parser
//! pulls out, in this order:
//!
//! 1. the venue marker word `ресторан` (anywhere, any case),
//! 2. the first `DD.MM.YYYY` or `DD.MM.YY` date,
//! 3. the first `H:MM` / `HH:MM` time *after* the date (`.` and `,` are
//!    accepted as separators),
//! 4. an optional `обед ...` phrase after the date, used as the order when
//!    the row has none.
//!
//! The first failing step decides the error.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{TitleFormatError, TitleResult};
use crate::models::{ParsedTitle, DEFAULT_ORDER};

const VENUE_MARKER: &str = "ресторан";

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{2})\.([0-9]{2})\.([0-9]{4}|[0-9]{2})\b").expect("Invalid date pattern")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,2})[.:,]([0-9]{2})\b").expect("Invalid time pattern")
});

static ORDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(обед[^.]*)[.\s]").expect("Invalid order pattern"));

/// Parse a deal title into its date, time and fallback order.
///
/// # Example
/// ```
/// use restoreport::parse_title;
///
/// let parsed = parse_title("Ресторан 01.02.25 9.05 обед на 4 персоны.").unwrap();
/// assert_eq!(parsed.date.format("%d.%m.%Y").to_string(), "01.02.2025");
/// assert_eq!(parsed.time, "09:05");
/// assert_eq!(parsed.fallback_order, "обед на 4 персоны");
/// ```
pub fn parse_title(title: &str) -> TitleResult<ParsedTitle> {
    if !title.to_lowercase().contains(VENUE_MARKER) {
        return Err(TitleFormatError::VenueMarkerMissing);
    }

    let date_caps = DATE_RE.captures(title).ok_or(TitleFormatError::DateNotFound)?;
    let date = to_date(&date_caps[1], &date_caps[2], &date_caps[3])?;

    // Time and order are only looked for after the date, so date digits are never read as a time.
    let date_end = date_caps.get(0).map_or(0, |m| m.end());
    let tail = &title[date_end..];

    let time_caps = TIME_RE.captures(tail).ok_or(TitleFormatError::TimeNotFound)?;
    let time = format!("{:0>2}:{}", &time_caps[1], &time_caps[2]);

    let fallback_order = ORDER_RE
        .captures(tail)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| DEFAULT_ORDER.to_string());

    Ok(ParsedTitle {
        date,
        time,
        fallback_order,
    })
}

/// Build a calendar date from matched digit groups; two-digit years mean `20YY`.
fn to_date(day: &str, month: &str, year: &str) -> TitleResult<NaiveDate> {
    let year = if year.len() == 2 {
        format!("20{}", year)
    } else {
        year.to_string()
    };
    let normalized = format!("{}.{}.{}", day, month, year);

    let parsed = match (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) {
        (Ok(d), Ok(m), Ok(y)) if y >= 1 => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };

    parsed.ok_or(TitleFormatError::InvalidDate(normalized))
}
