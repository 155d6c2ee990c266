use super::client::{CalendarClient, TimeWindow};
use super::models::{BirthdayNotice, CalendarEvent};
use super::time::{event_start_date, format_birthday_date};
use super::token::Credential;
use crate::error::BotResult;
use crate::utils::time::next_24_hours;
use chrono::{DateTime, Utc};
use tracing::debug;

const BIRTHDAY_MARKER: &str = "birthday";

fn mentions_birthday(text: Option<&str>) -> bool {
    text.map(|t| t.to_lowercase().contains(BIRTHDAY_MARKER))
        .unwrap_or(false)
}

/// Whether the summary, description or private `type` property marks a birthday
pub fn is_birthday(event: &CalendarEvent) -> bool {
    mentions_birthday(event.summary.as_deref())
        || mentions_birthday(event.description.as_deref())
        || event
            .extended_properties
            .as_ref()
            .and_then(|props| props.private.get("type"))
            .map(|kind| kind == BIRTHDAY_MARKER)
            .unwrap_or(false)
}

/// Turn a matched event into a notice, if it has a start date and a summary
pub fn to_notice(event: &CalendarEvent) -> Option<BirthdayNotice> {
    let summary = event.summary.as_deref().filter(|s| !s.trim().is_empty())?;

    let date = match event.start.as_ref().map(event_start_date) {
        Some(Ok(Some(date))) => date,
        Some(Err(e)) => {
            debug!("Skipping '{}': {}", summary, e);
            return None;
        }
        _ => {
            debug!("Skipping '{}': no start date", summary);
            return None;
        }
    };

    Some(BirthdayNotice {
        date: format_birthday_date(date),
        summary: summary.to_string(),
    })
}

/// Notices for every birthday event, in the order given
pub fn birthday_notices(events: &[CalendarEvent]) -> Vec<BirthdayNotice> {
    events
        .iter()
        .filter(|event| is_birthday(event))
        .filter_map(to_notice)
        .collect()
}

/// Birthdays in the 24 hours following `now`
pub async fn fetch_todays_birthdays(
    calendar: &dyn CalendarClient,
    credential: &Credential,
    calendar_id: &str,
    now: DateTime<Utc>,
) -> BotResult<Vec<BirthdayNotice>> {
    let (start, end) = next_24_hours(now);
    let events = calendar
        .list_events(credential, calendar_id, TimeWindow::new(start, end))
        .await?;

    Ok(birthday_notices(&events))
}
