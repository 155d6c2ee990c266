use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Calendar event as returned by the events.list call
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<EventStart>,
    #[serde(default)]
    pub extended_properties: Option<ExtendedProperties>,
}

/// Start of an event, either an all-day date or a timestamp
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// `YYYY-MM-DD` for all-day events
    #[serde(default)]
    pub date: Option<String>,
    /// RFC 3339 timestamp for timed events
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// Key/value metadata attached to an event
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
    #[serde(default)]
    pub shared: HashMap<String, String>,
}

/// Body of an events.list response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
}

/// One matched birthday, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayNotice {
    /// Zero-padded `MM/DD`
    pub date: String,
    pub summary: String,
}

impl fmt::Display for BirthdayNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.date, self.summary)
    }
}
