//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use birthday_reminder::components::google_calendar::models::{CalendarEvent, EventStart};
use birthday_reminder::components::google_calendar::{
    AuthProvider, CalendarClient, Credential, TimeWindow,
};
use birthday_reminder::components::Notifier;
use birthday_reminder::config::Config;
use birthday_reminder::error::{auth_error, google_calendar_error, BotResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn credential() -> Credential {
    Credential {
        access_token: "test-access".to_string(),
        refresh_token: Some("test-refresh".to_string()),
        expiry_date: None,
        scope: None,
        token_type: Some("Bearer".to_string()),
        id_token: None,
    }
}

pub fn all_day_event(summary: &str, date: &str) -> CalendarEvent {
    CalendarEvent {
        summary: Some(summary.to_string()),
        start: Some(EventStart {
            date: Some(date.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Config built from explicit pairs with the client credentials filled in
pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    map.insert("CLIENT_ID".to_string(), "test-client".to_string());
    map.insert("CLIENT_SECRET".to_string(), "test-secret".to_string());
    for (k, v) in pairs {
        map.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| map.get(key).cloned()).unwrap()
}

/// Auth provider that either hands out a fixed credential or fails
pub struct MockAuth {
    failure: Option<String>,
}

impl MockAuth {
    pub fn ok() -> Self {
        Self { failure: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn acquire_credential(&self) -> BotResult<Credential> {
        match &self.failure {
            Some(message) => Err(auth_error(message)),
            None => Ok(credential()),
        }
    }
}

/// Calendar that returns canned events and records the queried windows
#[derive(Default)]
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    failure: Option<String>,
    delay: Option<Duration>,
    pub queries: Mutex<Vec<(String, TimeWindow)>>,
}

impl MockCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// Answer only after `delay`
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CalendarClient for MockCalendar {
    async fn list_events(
        &self,
        _credential: &Credential,
        calendar_id: &str,
        window: TimeWindow,
    ) -> BotResult<Vec<CalendarEvent>> {
        self.queries
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), window));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(google_calendar_error(message)),
            None => Ok(self.events.clone()),
        }
    }
}

/// Notifier that keeps every message in memory
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: String) {
        self.messages.lock().unwrap().push(text);
    }
}

/// Convenience holder so tests can inspect the mocks after a run
pub struct Harness {
    pub calendar: Arc<MockCalendar>,
    pub notifier: Arc<RecordingNotifier>,
    pub services: birthday_reminder::components::birthday_reminder::ReminderServices,
}

pub fn harness(auth: MockAuth, calendar: MockCalendar) -> Harness {
    let calendar = Arc::new(calendar);
    let notifier = Arc::new(RecordingNotifier::default());
    let services = birthday_reminder::components::birthday_reminder::ReminderServices {
        auth: Arc::new(auth),
        calendar: calendar.clone(),
        notifier: notifier.clone(),
    };
    Harness {
        calendar,
        notifier,
        services,
    }
}
