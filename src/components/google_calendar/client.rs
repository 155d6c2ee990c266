use super::models::{CalendarEvent, EventListResponse};
use super::token::Credential;
use crate::config::Config;
use crate::error::{google_calendar_error, BotResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Half-open `[start, end)` query window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Fetches events of one calendar for a time window
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn list_events(
        &self,
        credential: &Credential,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BotResult<Vec<CalendarEvent>>;
}

/// Google Calendar v3 REST client
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.endpoints.google_calendar_base)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the events.list URL with query parameters
    pub fn events_url(&self, calendar_id: &str, window: TimeWindow) -> BotResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar base URL cannot have a path"))?
            .pop_if_empty()
            .extend(&["calendars", calendar_id, "events"]);

        url.query_pairs_mut()
            .append_pair("timeMin", &window.start.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("timeMax", &window.end.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    #[instrument(skip(self, credential), level = "debug")]
    async fn list_events(
        &self,
        credential: &Credential,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BotResult<Vec<CalendarEvent>> {
        let url = self.events_url(calendar_id, window)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: EventListResponse = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse events response: {}", e))
        })?;

        debug!("Fetched {} events from {}", body.items.len(), calendar_id);
        Ok(body.items)
    }
}
