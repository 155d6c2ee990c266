use super::models::EventStart;
use crate::error::{google_calendar_error, BotResult};
use chrono::{DateTime, Datelike, NaiveDate};

/// Calendar date an event starts on.
///
/// All-day events keep their written date. Timed events use the date in the
/// offset carried by the timestamp itself.
pub fn event_start_date(start: &EventStart) -> BotResult<Option<NaiveDate>> {
    if let Some(date) = start.date.as_deref().filter(|d| !d.is_empty()) {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        Ok(Some(date))
    } else if let Some(date_time) = start.date_time.as_deref().filter(|d| !d.is_empty()) {
        let dt = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e)))?;
        Ok(Some(dt.date_naive()))
    } else {
        Ok(None)
    }
}

/// Zero-padded `MM/DD`
pub fn format_birthday_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.month(), date.day())
}
