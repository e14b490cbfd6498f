//! Parsing and formatting of the wall-clock timestamps tasks are scheduled on.
//!
//! Timestamps carry no offset. "Today" is resolved against the local offset
//! when the platform exposes one and falls back to UTC otherwise.

use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const DISPLAY_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const ISO_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const TIME_OF_DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_OF_DAY_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

const DATETIME_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Parses user input such as `2024-01-01 08:00`, `2024-01-01T08:00:30` or a
/// bare `2024-01-01`, which means midnight.
pub fn parse_due_at(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("datetime is required"));
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, format) {
            return Ok(parsed);
        }
    }

    Date::parse(trimmed, DATE_FORMAT)
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
        .map_err(|_| AppError::validation(format!("invalid datetime '{trimmed}'")))
}

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("date is required"));
    }

    Date::parse(trimmed, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("invalid date '{trimmed}', expected YYYY-MM-DD")))
}

/// Minute resolution for display; seconds appear only when non-zero.
pub fn format_due_at(value: PrimitiveDateTime) -> String {
    let format = if value.second() == 0 {
        DISPLAY_FORMAT
    } else {
        DISPLAY_SECONDS_FORMAT
    };
    value.format(format).unwrap_or_else(|_| value.to_string())
}

/// Full precision, the same layout the store uses.
pub fn format_due_at_iso(value: PrimitiveDateTime) -> String {
    value
        .format(ISO_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

pub fn format_time_of_day(value: PrimitiveDateTime) -> String {
    let format = if value.second() == 0 {
        TIME_OF_DAY_FORMAT
    } else {
        TIME_OF_DAY_SECONDS_FORMAT
    };
    value
        .format(format)
        .unwrap_or_else(|_| value.time().to_string())
}

pub fn format_date(value: Date) -> String {
    value.format(DATE_FORMAT).unwrap_or_else(|_| value.to_string())
}

pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}
